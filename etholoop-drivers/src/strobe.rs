//! Character strobe bus emitter
//!
//! Drives the 8 + 1 line bus framed by [`StrobeFrames`]. Emitting blocks
//! for two widths per character, so it belongs between trials, not inside
//! time-critical parts of the loop.

use embedded_hal::delay::DelayNs;

use etholoop_hal::{MonotonicClock, OutputPin};
use etholoop_protocol::{StrobeFrames, StrobeStep, StrobeWidth};

/// Eight data pins (bit 0 first) and a strobe pin
pub struct StrobeEmitter<P, S, D, C> {
    data: [P; 8],
    strobe: S,
    delay: D,
    clock: C,
    width: StrobeWidth,
    terminator: bool,
}

impl<P: OutputPin, S: OutputPin, D: DelayNs, C: MonotonicClock> StrobeEmitter<P, S, D, C> {
    /// Take the bus pins and drive them all low
    pub fn new(
        data: [P; 8],
        strobe: S,
        delay: D,
        clock: C,
        width_us: u32,
        terminator: bool,
    ) -> Self {
        let mut emitter = Self {
            data,
            strobe,
            delay,
            clock,
            width: StrobeWidth::from_us(width_us),
            terminator,
        };
        emitter.apply(StrobeStep {
            data: 0,
            strobe: false,
            wait: false,
        });
        emitter
    }

    pub fn width(&self) -> StrobeWidth {
        self.width
    }

    /// Put `text` out on the bus
    ///
    /// Returns the milliseconds spent.
    pub fn emit(&mut self, text: &[u8]) -> u32 {
        let started = self.clock.now_ms();
        for step in StrobeFrames::new(text, self.terminator) {
            self.apply(step);
        }
        self.clock.elapsed_since(started)
    }

    fn apply(&mut self, step: StrobeStep) {
        for (bit, pin) in self.data.iter_mut().enumerate().rev() {
            pin.set_state(step.data & (1 << bit) != 0);
        }
        self.strobe.set_state(step.strobe);
        if step.wait {
            self.wait();
        }
    }

    fn wait(&mut self) {
        match self.width {
            StrobeWidth::Micros(us) => self.delay.delay_us(us),
            StrobeWidth::Millis(ms) => self.delay.delay_ms(ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ClockDelay;
    use core::cell::Cell;
    use etholoop_hal::mock::{MockClock, MockOutputPin};
    use std::vec::Vec;

    struct Bus {
        data: [Cell<bool>; 8],
        strobe: Cell<bool>,
    }

    impl Bus {
        fn new() -> Self {
            Self {
                data: core::array::from_fn(|_| Cell::new(true)),
                strobe: Cell::new(true),
            }
        }

        fn byte(&self) -> u8 {
            self.data
                .iter()
                .enumerate()
                .fold(0, |acc, (bit, level)| acc | (u8::from(level.get()) << bit))
        }
    }

    /// Output pin that logs the bus every time the strobe line is written
    struct Probe<'a> {
        bus: &'a Bus,
        log: &'a core::cell::RefCell<Vec<(u8, bool)>>,
    }

    impl OutputPin for Probe<'_> {
        fn set_high(&mut self) {
            self.bus.strobe.set(true);
            self.log.borrow_mut().push((self.bus.byte(), true));
        }

        fn set_low(&mut self) {
            self.bus.strobe.set(false);
            self.log.borrow_mut().push((self.bus.byte(), false));
        }

        fn is_set_high(&self) -> bool {
            self.bus.strobe.get()
        }
    }

    #[test]
    fn test_bus_sequence() {
        let clock = MockClock::new(0);
        let bus = Bus::new();
        let log = core::cell::RefCell::new(Vec::new());
        let data = core::array::from_fn(|bit| MockOutputPin::new(&bus.data[bit]));
        let probe = Probe { bus: &bus, log: &log };

        let mut emitter = StrobeEmitter::new(data, probe, ClockDelay::new(&clock), &clock, 5, true);
        assert_eq!(bus.byte(), 0);
        log.borrow_mut().clear();

        emitter.emit(b"Hi");
        assert_eq!(
            *log.borrow(),
            [
                (b'H', true),
                (b'H', false),
                (b'i', true),
                (b'i', false),
                (0, false),
                (0, true),
                (0, false),
            ]
        );
        assert!(!bus.strobe.get());
    }

    #[test]
    fn test_millisecond_width_reports_time() {
        let clock = MockClock::new(100);
        let bus = Bus::new();
        let log = core::cell::RefCell::new(Vec::new());
        let data = core::array::from_fn(|bit| MockOutputPin::new(&bus.data[bit]));
        let probe = Probe { bus: &bus, log: &log };

        let mut emitter =
            StrobeEmitter::new(data, probe, ClockDelay::new(&clock), &clock, 3_000, false);
        assert_eq!(emitter.width(), StrobeWidth::Millis(3));

        // Two widths per character
        assert_eq!(emitter.emit(b"abc"), 18);
    }

    #[test]
    fn test_microsecond_width() {
        let clock = MockClock::new(0);
        let bus = Bus::new();
        let log = core::cell::RefCell::new(Vec::new());
        let data = core::array::from_fn(|bit| MockOutputPin::new(&bus.data[bit]));
        let probe = Probe { bus: &bus, log: &log };

        let mut emitter = StrobeEmitter::new(data, probe, ClockDelay::new(&clock), &clock, 500, true);
        // 100 characters * 2 + terminator = 201 widths of 0.5 ms
        let text = [b'x'; 100];
        assert_eq!(emitter.emit(&text), 100);
    }
}
