//! Pause switch
//!
//! Holds the task while an experimenter-operated switch is in the pause
//! position. This is the one component that blocks: call
//! [`PauseGate::check`] between trials, never in the middle of one.

use embedded_hal::delay::DelayNs;

use etholoop_hal::{InputPin, MonotonicClock};

pub struct PauseGate<P, D, C> {
    pin: P,
    delay: D,
    clock: C,
    pause_when_active: bool,
    cycle_ms: u32,
}

impl<P: InputPin, D: DelayNs, C: MonotonicClock> PauseGate<P, D, C> {
    /// Gate on a pulled-up `pin`
    ///
    /// With `pause_when_active` the task pauses while the pin is grounded,
    /// otherwise while it floats high. The pin is re-read every `cycle_ms`.
    pub fn new(pin: P, delay: D, clock: C, pause_when_active: bool, cycle_ms: u16) -> Self {
        Self {
            pin,
            delay,
            clock,
            pause_when_active,
            cycle_ms: u32::from(cycle_ms),
        }
    }

    /// Whether the switch is in the pause position right now
    pub fn is_paused(&mut self) -> bool {
        self.pin.is_low() == self.pause_when_active
    }

    /// Block while paused
    ///
    /// Returns the milliseconds spent paused, 0 when the switch was released.
    pub fn check(&mut self) -> u32 {
        let started = self.clock.now_ms();
        if !self.is_paused() {
            return 0;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Task paused");

        while self.is_paused() {
            self.delay.delay_ms(self.cycle_ms);
        }

        let paused_ms = self.clock.elapsed_since(started);
        #[cfg(feature = "defmt")]
        defmt::info!("Task resumed after {} ms", paused_ms);
        paused_ms
    }
}
