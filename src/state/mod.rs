//! State management module
//!
//! The timer session state machine, its alarm episodes, the snapshots it
//! publishes, and the shared application state that owns it.

pub mod alarm;
pub mod app_state;
pub mod session;
pub mod snapshot;

// Re-export main types
pub use alarm::{AlarmHandle, AlarmLoop};
pub use app_state::{AppState, QueryOutcome, StateError};
pub use session::{Phase, TickOutcome, TimerSession};
pub use snapshot::TimerSnapshot;
