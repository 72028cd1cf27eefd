//! `embedded-hal` 1.0 adapters
//!
//! The etholoop components use infallible pin traits; a rig cannot do
//! anything useful with a GPIO error in the middle of a trial. These adapters
//! wrap fallible `embedded-hal` pins and degrade errors: outputs keep their
//! cached level, inputs read as released (high, the pull-up level).

use embedded_hal::digital;
use embedded_hal::pwm::SetDutyCycle;

use etholoop_hal::{InputPin, OutputPin, PwmOutput};

/// Output pin adapter caching the last requested level
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin> EhOutput<P> {
    /// Wrap `pin`, driving it low
    pub fn new(pin: P) -> Self {
        let mut output = Self { pin, high: true };
        OutputPin::set_low(&mut output);
        output
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        self.high = true;
        if self.pin.set_high().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("GPIO write failed");
        }
    }

    fn set_low(&mut self) {
        self.high = false;
        if self.pin.set_low().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("GPIO write failed");
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Input pin adapter
pub struct EhInput<P> {
    pin: P,
}

impl<P: digital::InputPin> EhInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::InputPin> InputPin for EhInput<P> {
    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or(true)
    }
}

/// PWM channel adapter mapping 0..=255 duty onto the channel's range
pub struct EhPwm<P> {
    pwm: P,
    duty: u8,
}

impl<P: SetDutyCycle> EhPwm<P> {
    /// Wrap `pwm`, starting fully off
    pub fn new(pwm: P) -> Self {
        let mut output = Self { pwm, duty: u8::MAX };
        output.set_duty(0);
        output
    }
}

impl<P: SetDutyCycle> PwmOutput for EhPwm<P> {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        if self
            .pwm
            .set_duty_cycle_fraction(u16::from(duty), u16::from(u8::MAX))
            .is_err()
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("PWM duty write failed");
        }
    }

    fn duty(&self) -> u8 {
        self.duty
    }
}
