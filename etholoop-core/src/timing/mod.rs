//! Timing primitives
//!
//! All timing is done in wrapping 32-bit milliseconds read from a
//! [`MonotonicClock`](etholoop_hal::MonotonicClock).

pub mod deadline;
pub mod period;
pub mod stopwatch;

pub use deadline::Deadline;
pub use period::{TrialPeriod, MAX_PERIOD_NAME};
pub use stopwatch::Stopwatch;
