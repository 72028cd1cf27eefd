//! Test doubles shared by the driver tests

use etholoop_hal::mock::MockClock;

/// Delay that advances a mock clock instead of sleeping
pub struct ClockDelay<'a> {
    clock: &'a MockClock,
    carry_ns: u64,
}

impl<'a> ClockDelay<'a> {
    pub fn new(clock: &'a MockClock) -> Self {
        Self {
            clock,
            carry_ns: 0,
        }
    }
}

impl embedded_hal::delay::DelayNs for ClockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.carry_ns += u64::from(ns);
        let whole_ms = self.carry_ns / 1_000_000;
        self.carry_ns %= 1_000_000;
        self.clock.advance(whole_ms as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;
    use etholoop_hal::MonotonicClock;

    #[test]
    fn test_sub_millisecond_delays_carry() {
        let clock = MockClock::new(0);
        let mut delay = ClockDelay::new(&clock);
        delay.delay_us(600);
        assert_eq!(clock.now_ms(), 0);
        delay.delay_us(600);
        assert_eq!(clock.now_ms(), 1);
        delay.delay_ms(3);
        assert_eq!(clock.now_ms(), 4);
    }
}
