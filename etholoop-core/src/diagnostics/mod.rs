//! Loop diagnostics

pub mod loop_rate;

pub use loop_rate::{LoopMonitor, DEFAULT_WINDOW};
