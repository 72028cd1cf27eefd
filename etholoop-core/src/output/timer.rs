//! Bare-pin timers
//!
//! A timer owns no pin. Each [`PinTimer::set`] names a pin, a delay and a
//! value; the value is written to that pin through a board port once the
//! delay has elapsed. One timer can be reused across many pins one after the
//! other, but only holds one pending write at a time.

use etholoop_hal::{AnalogPort, DigitalPort, MonotonicClock};

use crate::timing::Deadline;

/// A port that can apply values of type `V` to numbered pins
pub trait PortWrite<V> {
    fn write_pin(&mut self, pin: u8, value: V);
}

impl<T: DigitalPort + ?Sized> PortWrite<bool> for T {
    fn write_pin(&mut self, pin: u8, value: bool) {
        self.write_level(pin, value);
    }
}

impl<T: AnalogPort + ?Sized> PortWrite<u8> for T {
    fn write_pin(&mut self, pin: u8, value: u8) {
        self.write_duty(pin, value);
    }
}

/// Delayed write of one value to one numbered pin
#[derive(Debug)]
pub struct PinTimer<C, V> {
    clock: C,
    pin: u8,
    value: V,
    deadline: Deadline,
}

/// Delayed digital level write
pub type DigitalTimer<C> = PinTimer<C, bool>;
/// Delayed PWM duty write
pub type AnalogTimer<C> = PinTimer<C, u8>;

impl<C: MonotonicClock, V: Copy + Default> PinTimer<C, V> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            pin: 0,
            value: V::default(),
            deadline: Deadline::idle(),
        }
    }

    /// Schedule `value` to be written to `pin` after `delay_ms`
    ///
    /// Replaces any write still pending, even one for a different pin.
    pub fn set(&mut self, pin: u8, delay_ms: u32, value: V) {
        self.pin = pin;
        self.value = value;
        self.deadline.arm(self.clock.now_ms(), delay_ms);
    }

    /// Apply the pending write if it is due
    ///
    /// Returns the overshoot of the write, or `None` when nothing was written.
    pub fn poll<P: PortWrite<V> + ?Sized>(&mut self, port: &mut P) -> Option<u32> {
        let overshoot = self.deadline.expire(self.clock.now_ms())?;
        port.write_pin(self.pin, self.value);
        Some(overshoot)
    }

    /// Drop the pending write
    pub fn cancel(&mut self) {
        self.deadline.disarm();
    }

    /// Pin with a pending write, if any
    pub fn scheduled_pin(&self) -> Option<u8> {
        self.deadline.is_armed().then_some(self.pin)
    }

    /// Absolute time of the pending write, [`CLOCK_MAX`](etholoop_hal::CLOCK_MAX) when idle
    pub fn until(&self) -> u32 {
        self.deadline.until()
    }

    /// Time left before the pending write, `None` when idle
    pub fn remaining(&self) -> Option<u32> {
        self.deadline.remaining(self.clock.now_ms())
    }
}
