//! Routing raw text queries to control commands or timer actions

use super::action::{ParseError, TimerAction};

const START_KEYWORDS: &[&str] = &["s", "start", "begin"];
const STOP_KEYWORDS: &[&str] = &["q", "e", "s", "quit", "end", "stop"];

/// What a text query asks the timer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Start,
    Stop,
    Action(TimerAction),
}

impl Query {
    /// Classify a query against the current running state.
    ///
    /// Control keywords only apply when they would change the state: `start`
    /// while idle, `stop` while running. `s` toggles. Everything else goes
    /// through the duration grammar. Keywords are matched after trimming the
    /// ends only, so inner whitespace never forms one.
    pub fn classify(raw: &str, is_running: bool) -> Result<Self, ParseError> {
        let keyword = raw.trim().to_lowercase();

        if !is_running && START_KEYWORDS.contains(&keyword.as_str()) {
            return Ok(Query::Start);
        }
        if is_running && STOP_KEYWORDS.contains(&keyword.as_str()) {
            return Ok(Query::Stop);
        }

        TimerAction::parse(raw).map(Query::Action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TimerDelta, TimerDuration};

    #[test]
    fn test_start_keywords_when_idle() {
        for raw in ["s", "start", "Begin", " START "] {
            assert_eq!(Query::classify(raw, false), Ok(Query::Start), "Failed for input: {:?}", raw);
        }
    }

    #[test]
    fn test_stop_keywords_when_running() {
        for raw in ["q", "e", "s", "quit", "End", "stop"] {
            assert_eq!(Query::classify(raw, true), Ok(Query::Stop), "Failed for input: {:?}", raw);
        }
    }

    #[test]
    fn test_keywords_out_of_state_fall_through_to_parser() {
        assert!(Query::classify("start", true).is_err());
        assert!(Query::classify("stop", false).is_err());
        assert!(Query::classify("q", false).is_err());
    }

    #[test]
    fn test_split_keywords_are_not_keywords() {
        assert!(Query::classify("st art", false).is_err());
        assert!(Query::classify("s top", true).is_err());
        assert!(Query::classify("q uit", true).is_err());
        assert_eq!(Query::classify("\tStop\n", true), Ok(Query::Stop));
    }

    #[test]
    fn test_durations_become_actions() {
        assert_eq!(
            Query::classify("20", true),
            Ok(Query::Action(TimerAction::Set(TimerDuration::minutes(20))))
        );
        assert_eq!(
            Query::classify("-5m", false),
            Ok(Query::Action(TimerAction::Add(TimerDelta::minutes(-5))))
        );
    }
}
