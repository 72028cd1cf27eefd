//! GPIO wrappers

use embassy_rp::gpio::{Input, Output};

use etholoop_core::config::BOARD_PIN_COUNT;
use etholoop_hal::{DigitalPort, InputPin, OutputPin};

/// Push-pull output
pub struct RpOutput(pub Output<'static>);

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Input, normally with the pull-up enabled
pub struct RpInput(pub Input<'static>);

impl InputPin for RpInput {
    fn is_high(&mut self) -> bool {
        self.0.is_high()
    }
}

/// Outputs addressed by GPIO number
///
/// Used by bare-pin timers that move between pins. Writes to pins that were
/// never attached are dropped.
pub struct RpPort {
    outputs: [Option<Output<'static>>; BOARD_PIN_COUNT as usize],
}

impl Default for RpPort {
    fn default() -> Self {
        Self::new()
    }
}

impl RpPort {
    pub fn new() -> Self {
        Self {
            outputs: [const { None }; BOARD_PIN_COUNT as usize],
        }
    }

    /// Attach an output under its GPIO number
    pub fn attach(&mut self, pin: u8, output: Output<'static>) {
        if let Some(slot) = self.outputs.get_mut(pin as usize) {
            *slot = Some(output);
        }
    }
}

impl DigitalPort for RpPort {
    fn write_level(&mut self, pin: u8, high: bool) {
        match self.outputs.get_mut(pin as usize) {
            Some(Some(output)) => output.set_level(high.into()),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Write to unattached GPIO{}", pin);
            }
        }
    }
}
