//! Board-agnostic runtime for behavioral-task polling loops
//!
//! Every component here is advanced by one call per pass of the host's main
//! loop and returns immediately:
//!
//! - Deadline timer with wraparound-safe millisecond arithmetic
//! - Scheduled output channels (digital level, PWM duty, tone, cue)
//! - Multi-pin pulse bank and bare-pin timers
//! - Debounced digital input bank and injected-value tracker
//! - Loop-rate monitor, stopwatch and trial period bookkeeping
//! - Pin registry and rig configuration types

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod diagnostics;
pub mod input;
pub mod output;
pub mod timing;

pub use etholoop_hal::{MonotonicClock, CLOCK_MAX};
