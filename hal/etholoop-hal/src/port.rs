//! Pin-number addressed output ports
//!
//! Bare-pin timers do not own a pin: each scheduled write names the pin it
//! targets. A port is the board-level handle that can drive any output pin
//! by number, and is lent to the timer on every poll.

/// Writes digital levels to pins addressed by number
pub trait DigitalPort {
    /// Drive `pin` high or low
    fn write_level(&mut self, pin: u8, high: bool);
}

/// Writes PWM duty to pins addressed by number
pub trait AnalogPort {
    /// Drive `pin` with `duty` in the range 0..=255
    fn write_duty(&mut self, pin: u8, duty: u8);
}

impl<T: DigitalPort + ?Sized> DigitalPort for &mut T {
    fn write_level(&mut self, pin: u8, high: bool) {
        (**self).write_level(pin, high);
    }
}

impl<T: AnalogPort + ?Sized> AnalogPort for &mut T {
    fn write_duty(&mut self, pin: u8, duty: u8) {
        (**self).write_duty(pin, duty);
    }
}
