//! Hardware-facing drivers
//!
//! This crate provides the pieces of a rig that talk to something outside the
//! polling components in etholoop-core:
//!
//! - Serial link to the experimenter's PC (commands in, records out)
//! - Character strobe bus emitter
//! - Pause switch gate
//! - Adapters from `embedded-hal` 1.0 pins and PWM to the etholoop HAL traits

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod adapter;
pub mod pause;
pub mod serial;
pub mod strobe;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{EhInput, EhOutput, EhPwm};
pub use pause::PauseGate;
pub use serial::{LinkError, SerialLink};
pub use strobe::StrobeEmitter;
