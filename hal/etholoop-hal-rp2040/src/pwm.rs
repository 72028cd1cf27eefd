//! PWM duty and tone outputs
//!
//! Both use channel A of a dedicated PWM slice. A tone retunes the slice's
//! wrap value, so a tone output and a duty output never share a slice.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::types::U12F4;

use etholoop_hal::{PwmOutput, ToneOutput};

/// System clock feeding the PWM slices
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Clock divider for tone slices
pub const TONE_DIVIDER: u32 = 64;

/// Counter wrap for duty slices; duty 255 is above it and reads as always on
pub const DUTY_TOP: u16 = 254;

/// Counter wrap that makes a slice divided by [`TONE_DIVIDER`] oscillate at
/// `freq_hz`
///
/// Frequencies too low for a 16-bit counter clamp to the slowest tone.
pub fn tone_top(freq_hz: u16) -> u16 {
    let counter_hz = SYS_CLK_HZ / TONE_DIVIDER;
    let ticks = counter_hz / u32::from(freq_hz.max(1));
    ticks.saturating_sub(1).min(u32::from(u16::MAX)) as u16
}

/// 8-bit duty output
pub struct PwmDuty {
    pwm: Pwm<'static>,
    config: PwmConfig,
    duty: u8,
}

impl PwmDuty {
    /// Take a slice, starting at 0% duty
    pub fn new(mut pwm: Pwm<'static>) -> Self {
        let mut config = PwmConfig::default();
        config.top = DUTY_TOP;
        config.compare_a = 0;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            duty: 0,
        }
    }
}

impl PwmOutput for PwmDuty {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        self.config.compare_a = u16::from(duty);
        self.pwm.set_config(&self.config);
    }

    fn duty(&self) -> u8 {
        self.duty
    }
}

/// Square-wave tone output at 50% duty
pub struct PwmTone {
    pwm: Pwm<'static>,
    config: PwmConfig,
    sounding: Option<u16>,
}

impl PwmTone {
    /// Take a slice, silent
    pub fn new(mut pwm: Pwm<'static>) -> Self {
        let mut config = PwmConfig::default();
        config.divider = U12F4::from_num(TONE_DIVIDER);
        config.compare_a = 0;
        config.enable = false;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            sounding: None,
        }
    }
}

impl ToneOutput for PwmTone {
    fn start_tone(&mut self, freq_hz: u16) {
        let top = tone_top(freq_hz);
        self.config.top = top;
        self.config.compare_a = top / 2;
        self.config.enable = true;
        self.pwm.set_config(&self.config);
        self.sounding = Some(freq_hz);
    }

    fn stop_tone(&mut self) {
        self.config.compare_a = 0;
        self.config.enable = false;
        self.pwm.set_config(&self.config);
        self.sounding = None;
    }

    fn sounding(&self) -> Option<u16> {
        self.sounding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_top() {
        // 125 MHz / 64 = 1.953125 MHz counter
        assert_eq!(tone_top(440), 4437);
        assert_eq!(tone_top(4_000), 487);
        assert_eq!(tone_top(1), u16::MAX);
        assert_eq!(tone_top(0), u16::MAX);
    }
}
