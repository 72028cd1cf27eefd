//! Debounced bank of pulled-up digital inputs
//!
//! Lever switches and lick sensors are wired to ground with the internal
//! pull-up enabled, so an electrically low pin is an active input. The bank
//! converts to positive logic (`true` = active) when sampling.

use heapless::Vec;

use etholoop_hal::{InputPin, MonotonicClock, OutputPin};

use super::debounce::{DebounceState, Transition};

/// Maximum number of inputs held by one bank
pub const MAX_INPUTS: usize = 10;

/// Default silence after a transition
pub const DEFAULT_DEBOUNCE_MS: u32 = 2;

/// Relay placeholder for inputs that mirror nowhere
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRelay;

impl OutputPin for NoRelay {
    fn set_high(&mut self) {}

    fn set_low(&mut self) {}

    fn is_set_high(&self) -> bool {
        false
    }
}

#[derive(Debug)]
struct Channel<P, R> {
    pin: P,
    relay: Option<R>,
    state: DebounceState,
}

impl<P: InputPin, R: OutputPin> Channel<P, R> {
    fn new(mut pin: P, mut relay: Option<R>) -> Self {
        let active = pin.is_low();
        if let Some(relay) = relay.as_mut() {
            relay.set_state(active);
        }
        Self {
            pin,
            relay,
            state: DebounceState::new(active),
        }
    }
}

/// Debounced digital inputs with optional relay outputs
#[derive(Debug)]
pub struct DigitalInputs<C, P, R = NoRelay> {
    clock: C,
    channels: Vec<Channel<P, R>, MAX_INPUTS>,
    debounce_ms: u32,
    last_poll_ms: u32,
}

impl<C: MonotonicClock, P: InputPin> DigitalInputs<C, P, NoRelay> {
    /// Sample the initial level of up to [`MAX_INPUTS`] pins
    ///
    /// Pins beyond the capacity are dropped.
    pub fn new(clock: C, pins: impl IntoIterator<Item = P>, debounce_ms: u32) -> Self {
        Self::build(
            clock,
            pins.into_iter().map(|pin| (pin, None)),
            debounce_ms,
        )
    }
}

impl<C: MonotonicClock, P: InputPin, R: OutputPin> DigitalInputs<C, P, R> {
    /// Like [`DigitalInputs::new`], pairing every input with a relay pin
    ///
    /// Each relay is driven to its input's positive-logic value right away
    /// and again on every accepted transition.
    pub fn with_relays(
        clock: C,
        pairs: impl IntoIterator<Item = (P, R)>,
        debounce_ms: u32,
    ) -> Self {
        Self::build(
            clock,
            pairs.into_iter().map(|(pin, relay)| (pin, Some(relay))),
            debounce_ms,
        )
    }

    /// Like [`DigitalInputs::with_relays`] where only some inputs have a relay
    pub fn from_channels(
        clock: C,
        channels: impl IntoIterator<Item = (P, Option<R>)>,
        debounce_ms: u32,
    ) -> Self {
        Self::build(clock, channels.into_iter(), debounce_ms)
    }

    fn build(
        clock: C,
        pairs: impl Iterator<Item = (P, Option<R>)>,
        debounce_ms: u32,
    ) -> Self {
        let mut channels = Vec::new();
        for (pin, relay) in pairs.take(MAX_INPUTS) {
            let _ = channels.push(Channel::new(pin, relay));
        }
        let last_poll_ms = clock.now_ms();
        Self {
            clock,
            channels,
            debounce_ms,
            last_poll_ms,
        }
    }

    /// Sample every input once
    ///
    /// Returns the milliseconds elapsed since the previous poll.
    pub fn poll(&mut self) -> u32 {
        let now = self.clock.now_ms();
        let elapsed = now.wrapping_sub(self.last_poll_ms);
        self.last_poll_ms = now;

        let width = self.debounce_ms;
        for channel in self.channels.iter_mut() {
            let pin = &mut channel.pin;
            let accepted = channel.state.step(elapsed, width, || pin.is_low());
            if let (Some(active), Some(relay)) = (accepted, channel.relay.as_mut()) {
                relay.set_state(active);
            }
        }

        elapsed
    }

    /// Number of inputs in the bank
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    fn state(&self, index: usize) -> DebounceState {
        debug_assert!(index < self.channels.len(), "input index out of range");
        self.channels
            .get(index)
            .map(|channel| channel.state)
            .unwrap_or_default()
    }

    /// Input `index` is active
    pub fn on(&self, index: usize) -> bool {
        self.state(index).on()
    }

    pub fn off(&self, index: usize) -> bool {
        self.state(index).off()
    }

    /// Input `index` became active on the last poll
    pub fn turned_on(&self, index: usize) -> bool {
        self.state(index).turned_on()
    }

    /// Input `index` became inactive on the last poll
    pub fn turned_off(&self, index: usize) -> bool {
        self.state(index).turned_off()
    }

    pub fn changed(&self, index: usize) -> bool {
        self.state(index).changed()
    }

    pub fn unchanged(&self, index: usize) -> bool {
        self.state(index).unchanged()
    }

    pub fn transition(&self, index: usize) -> Transition {
        self.state(index).transition()
    }

    /// Any input became active on the last poll
    pub fn any_turned_on(&self) -> bool {
        self.channels.iter().any(|channel| channel.state.turned_on())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use etholoop_hal::mock::{MockClock, MockInputPin, MockOutputPin};

    // Electrical level: true = high = released
    fn released() -> Cell<bool> {
        Cell::new(true)
    }

    #[test]
    fn test_negative_logic() {
        let clock = MockClock::new(0);
        let lever = released();
        let lick = Cell::new(false);
        let inputs = DigitalInputs::new(
            &clock,
            [MockInputPin::new(&lever), MockInputPin::new(&lick)],
            DEFAULT_DEBOUNCE_MS,
        );

        assert_eq!(inputs.len(), 2);
        assert!(inputs.off(0));
        assert!(inputs.on(1));
        assert!(inputs.unchanged(0));
        assert!(inputs.unchanged(1));
    }

    #[test]
    fn test_press_and_release() {
        let clock = MockClock::new(100);
        let lever = released();
        let mut inputs = DigitalInputs::new(&clock, [MockInputPin::new(&lever)], 5);

        clock.advance(1);
        lever.set(false);
        assert_eq!(inputs.poll(), 1);
        assert!(inputs.turned_on(0));
        assert!(inputs.any_turned_on());

        clock.advance(1);
        inputs.poll();
        assert!(inputs.on(0));
        assert!(!inputs.turned_on(0));
        assert!(!inputs.any_turned_on());

        clock.advance(10);
        lever.set(true);
        inputs.poll();
        assert!(inputs.turned_off(0));
        assert_eq!(inputs.transition(0), Transition::Falling);
    }

    #[test]
    fn test_bounce_suppressed_per_input() {
        let clock = MockClock::new(0);
        let noisy = released();
        let quiet = released();
        let mut inputs = DigitalInputs::new(
            &clock,
            [MockInputPin::new(&noisy), MockInputPin::new(&quiet)],
            10,
        );

        // Noisy input goes active and starts bouncing
        clock.advance(1);
        noisy.set(false);
        inputs.poll();
        assert!(inputs.turned_on(0));

        clock.advance(2);
        noisy.set(true);
        quiet.set(false);
        inputs.poll();
        assert!(inputs.on(0));
        assert!(inputs.unchanged(0));
        // Sibling is not held back by the noisy one
        assert!(inputs.turned_on(1));

        clock.advance(2);
        noisy.set(false);
        inputs.poll();
        clock.advance(2);
        noisy.set(true);
        inputs.poll();
        assert!(inputs.on(0));

        // Window (10 ms) ends; the raw level is released so the edge lands now
        clock.advance(4);
        inputs.poll();
        assert!(inputs.turned_off(0));
    }

    #[test]
    fn test_relay_mirrors_accepted_value() {
        let clock = MockClock::new(0);
        let lever = Cell::new(false);
        let relay = Cell::new(false);
        let mut inputs = DigitalInputs::with_relays(
            &clock,
            [(MockInputPin::new(&lever), MockOutputPin::new(&relay))],
            3,
        );

        // Driven on construction
        assert!(relay.get());

        clock.advance(1);
        lever.set(true);
        inputs.poll();
        assert!(inputs.turned_off(0));
        assert!(!relay.get());

        // Bounce within the window does not reach the relay
        clock.advance(1);
        lever.set(false);
        inputs.poll();
        assert!(!relay.get());

        clock.advance(2);
        inputs.poll();
        assert!(inputs.turned_on(0));
        assert!(relay.get());
    }

    #[test]
    fn test_partial_relays() {
        let clock = MockClock::new(0);
        let lever = Cell::new(false);
        let lick = Cell::new(false);
        let relay = Cell::new(false);
        let mut inputs = DigitalInputs::from_channels(
            &clock,
            [
                (MockInputPin::new(&lever), Some(MockOutputPin::new(&relay))),
                (MockInputPin::new(&lick), None),
            ],
            0,
        );
        assert!(relay.get());

        clock.advance(1);
        lick.set(true);
        inputs.poll();
        assert!(inputs.turned_off(1));
        assert!(relay.get());
    }

    #[test]
    fn test_capacity() {
        let clock = MockClock::new(0);
        let cells: [Cell<bool>; MAX_INPUTS + 2] = core::array::from_fn(|_| released());
        let inputs = DigitalInputs::new(&clock, cells.iter().map(MockInputPin::new), 2);
        assert_eq!(inputs.len(), MAX_INPUTS);
    }

    #[test]
    fn test_poll_across_wrap() {
        let clock = MockClock::new(u32::MAX - 1);
        let lever = released();
        let mut inputs = DigitalInputs::new(&clock, [MockInputPin::new(&lever)], 2);
        clock.advance(4);
        assert_eq!(inputs.poll(), 4);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "input index out of range")]
    fn test_index_out_of_range() {
        let clock = MockClock::new(0);
        let lever = released();
        let inputs = DigitalInputs::new(&clock, [MockInputPin::new(&lever)], 2);
        inputs.on(1);
    }
}
