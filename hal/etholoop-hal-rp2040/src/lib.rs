//! RP2040 implementation of the etholoop HAL
//!
//! - Millisecond clock on the embassy time driver
//! - GPIO wrappers and a pin-number addressed output port
//! - Dynamic pin allocation for config-driven rig setup
//! - PWM duty and tone outputs
//! - UART link over any `embedded-io` byte stream

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod pins;
pub mod pwm;
pub mod serial;

pub use clock::RpClock;
pub use gpio::{RpInput, RpOutput, RpPort};
pub use pins::{PinBank, PinBankPeripherals, RemainingPeripherals, DIMMER_PIN, TONE_PIN, UART_PINS};
pub use pwm::{PwmDuty, PwmTone};
pub use serial::IoSerial;
