//! Background tasks module
//!
//! The periodic drivers that keep the timer session moving: the countdown
//! tick and the alarm alternation. Also the writer that persists settings
//! off the request path.

pub mod alarm;
pub mod settings_writer;
pub mod ticker;

// Re-export main functions
pub use alarm::alarm_task;
pub use settings_writer::settings_writer_task;
pub use ticker::ticker_task;
