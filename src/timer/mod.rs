//! Timer expression grammar
//!
//! Durations, the actions parsed from free-form text, and the routing of
//! text queries to control commands.

pub mod action;
pub mod duration;
pub mod query;

pub use action::{ParseError, TimerAction};
pub use duration::{TimeUnit, TimerDelta, TimerDuration};
pub use query::Query;
