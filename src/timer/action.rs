//! Parsing free-form time expressions into timer actions
//!
//! A query is a verb prefix, a whole number and a unit suffix, all optional
//! except the number: `20`, `20m`, `add 1 hour`, `+1h`, `minus 5 min`, `s20m`.
//! Whitespace is dropped and case is ignored before matching.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::duration::{TimeUnit, TimerDelta, TimerDuration};

/// A parsed user intent: replace the countdown target or shift it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "lowercase")]
pub enum TimerAction {
    Set(TimerDuration),
    /// May be negative when the query used a subtract verb
    Add(TimerDelta),
}

/// Reasons a query could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected a whole number, found '{0}'")]
    InvalidNumber(String),
    #[error("unrecognized unit '{0}'")]
    UnrecognizedSuffix(String),
    #[error("unrecognized keyword '{0}'")]
    UnrecognizedPrefix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Add,
    Subtract,
    Set,
}

/// Verb prefixes, tried in order; the first match wins. Set verbs come last so
/// they only apply when no add or subtract verb matched.
const VERBS: &[(&str, Verb)] = &[
    ("adding", Verb::Add),
    ("adds", Verb::Add),
    ("add", Verb::Add),
    ("plus", Verb::Add),
    ("a", Verb::Add),
    ("+", Verb::Add),
    ("subtracting", Verb::Subtract),
    ("subtracts", Verb::Subtract),
    ("subtract", Verb::Subtract),
    ("minus", Verb::Subtract),
    ("-", Verb::Subtract),
    ("set", Verb::Set),
    ("s", Verb::Set),
];

/// Unit suffixes, tried in order against the end of the query
const UNITS: &[(&str, TimeUnit)] = &[
    ("hours", TimeUnit::Hours),
    ("hour", TimeUnit::Hours),
    ("h", TimeUnit::Hours),
    ("minutes", TimeUnit::Minutes),
    ("minute", TimeUnit::Minutes),
    ("min", TimeUnit::Minutes),
    ("m", TimeUnit::Minutes),
    ("seconds", TimeUnit::Seconds),
    ("second", TimeUnit::Seconds),
    ("sec", TimeUnit::Seconds),
    ("s", TimeUnit::Seconds),
];

/// Unit assumed for a bare number
const DEFAULT_UNIT: TimeUnit = TimeUnit::Minutes;

/// Drop all whitespace and lowercase
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

impl TimerAction {
    /// Parse a raw query. Every character must belong to the verb, the
    /// number or the unit; anything left over is an error.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let query = normalize(raw);

        let verb = VERBS.iter().find(|(token, _)| query.starts_with(token));
        let unit = UNITS.iter().find(|(token, _)| query.ends_with(token));

        let prefix_len = verb.map_or(0, |(token, _)| token.len());
        let suffix_len = unit.map_or(0, |(token, _)| token.len());

        // Prefix and suffix can overlap on very short input such as "s"
        let body = query
            .get(prefix_len..query.len().saturating_sub(suffix_len))
            .unwrap_or("");

        let Some(digits_start) = body.find(|c: char| c.is_ascii_digit()) else {
            return Err(ParseError::InvalidNumber(body.to_string()));
        };
        let digits_end = body[digits_start..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(body.len(), |offset| digits_start + offset);

        if digits_end < body.len() {
            let rest = &query[prefix_len + digits_end..];
            return Err(ParseError::UnrecognizedSuffix(rest.to_string()));
        }
        if digits_start > 0 {
            let head = &query[..prefix_len + digits_start];
            return Err(ParseError::UnrecognizedPrefix(head.to_string()));
        }

        let digits = &body[digits_start..digits_end];
        let count: u64 = digits
            .parse()
            .map_err(|_| ParseError::InvalidNumber(digits.to_string()))?;

        let unit = unit.map_or(DEFAULT_UNIT, |(_, unit)| *unit);
        let seconds = unit
            .to_seconds(count)
            .and_then(|seconds| i64::try_from(seconds).ok())
            .ok_or_else(|| ParseError::InvalidNumber(digits.to_string()))?;

        let action = match verb.map(|(_, verb)| *verb) {
            Some(Verb::Add) => TimerAction::Add(TimerDelta::from_secs(seconds)),
            Some(Verb::Subtract) => TimerAction::Add(TimerDelta::from_secs(-seconds)),
            Some(Verb::Set) | None => TimerAction::Set(TimerDuration::from_secs(seconds.unsigned_abs())),
        };
        Ok(action)
    }
}

impl FromStr for TimerAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
