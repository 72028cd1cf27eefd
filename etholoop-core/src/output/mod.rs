//! Scheduled outputs
//!
//! Outputs are asserted immediately and deasserted by a later poll once
//! their deadline falls due. Three shapes exist:
//!
//! - [`ScheduledOutput`] owns one actuator and its deadline
//! - [`PulseBank`] owns several digital pins, each with its own deadline
//! - [`PinTimer`] owns no pin; each scheduled write names the pin it targets

pub mod actuator;
pub mod bank;
pub mod channel;
pub mod timer;

pub use actuator::{
    Actuator, AnalogActuator, Cue, DigitalActuator, ToneActuator, DEFAULT_TONE_HZ,
};
pub use bank::{Expiry, PulseBank, MAX_BANK_OUTPUTS};
pub use channel::{AnalogOutput, CueOutput, DigitalOutput, ScheduledOutput, ToneChannel};
pub use timer::{AnalogTimer, DigitalTimer, PinTimer, PortWrite};
