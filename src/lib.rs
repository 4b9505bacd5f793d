//! Simple Timer - A countdown timer driven by plain-text time expressions
//!
//! This library parses queries such as `20`, `+1h` or `minus 5 min` into
//! timer actions, and runs a countdown session that ticks, completes and
//! sounds a repeating alarm until dismissed.

pub mod config;
pub mod timer;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use timer::{ParseError, TimerAction, TimerDelta, TimerDuration};
pub use state::{AppState, TimerSession};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
