//! etholoop Hardware Abstraction Layer
//!
//! This crate defines the hardware traits that the polling-loop components
//! are written against. Chip-specific HALs (RP2040, ...) implement them, and
//! the `mock` feature provides host implementations for tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Task sketch (etholoop-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  etholoop-core / etholoop-drivers       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  etholoop-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ etholoop-hal- │       │  mock (host   │
//! │    rp2040     │       │    tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`clock::MonotonicClock`] - Wrapping 32-bit millisecond counter
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O owned by one component
//! - [`port::DigitalPort`], [`port::AnalogPort`] - Pin-number addressed writes
//! - [`pwm::PwmOutput`], [`pwm::ToneOutput`] - Analog duty and tone actuators
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial link to the host computer

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod port;
pub mod pwm;
pub mod uart;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use clock::{MonotonicClock, CLOCK_MAX};
pub use gpio::{InputPin, OutputPin};
pub use port::{AnalogPort, DigitalPort};
pub use pwm::{PwmOutput, ToneOutput};
pub use uart::{UartRx, UartTx};
