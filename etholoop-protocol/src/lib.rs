//! Host link protocol
//!
//! A behavioral rig talks to the experimenter's PC over a plain text serial
//! line. Commands come in one per line:
//!
//! ```text
//! 5:trainingMode\n   → code 5, payload "trainingMode"
//! A\n                → code 65 (single character), empty payload
//! no-colon-text\n    → code 0, payload "no-colon-text"
//! ```
//!
//! Data goes out as records: fields joined by a separator (tab by default),
//! one record per line.
//!
//! The crate also frames text for the 9-line character strobe bus used to
//! stamp events into external recording systems.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod line;
pub mod record;
pub mod strobe;

pub use command::{decode_line, decode_raw, parse_leading_int, Command};
pub use line::{DecodeMode, LineAssembler, LineError, DEFAULT_EOL, MAX_LINE_LEN};
pub use record::{Record, RecordError, DEFAULT_SEPARATOR, MAX_RECORD_LEN, RECORD_TERMINATOR};
pub use strobe::{StrobeFrames, StrobeStep, StrobeWidth, MICROS_LIMIT_US};
