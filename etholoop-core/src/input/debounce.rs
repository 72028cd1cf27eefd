//! Per-input debounce state
//!
//! Each poll the caller supplies the time elapsed since the previous poll:
//!
//! 1. `previous` takes the old `current`, so an edge is visible for exactly
//!    one poll.
//! 2. While the remaining silence exceeds the elapsed time, the silence is
//!    reduced and the input is not resampled.
//! 3. Otherwise the silence is cleared and the input is resampled. A value
//!    different from `previous` re-arms the silence window.
//!
//! ```text
//! raw     ─┐ ┌┐ ┌──────────────┐┌┐ ┌────
//!          └─┘└─┘              └┘└─┘
//! current ─┐                   ┌─────────
//!          └───────────────────┘
//!          │◄─ width ─►│       │◄─ width ─►│
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Change between the previous and current poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Transition {
    /// Turned on since the previous poll
    Rising,
    /// Turned off since the previous poll
    Falling,
    /// No change
    Steady,
}

/// Current/previous value pair with a silence countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebounceState {
    current: bool,
    previous: bool,
    silence_ms: u32,
}

impl DebounceState {
    /// Start steady at `initial` with no silence pending
    pub const fn new(initial: bool) -> Self {
        Self {
            current: initial,
            previous: initial,
            silence_ms: 0,
        }
    }

    /// Advance by `elapsed_ms` and resample through `sample` unless silenced
    ///
    /// Returns the new value when a transition was accepted by this step.
    pub fn step(
        &mut self,
        elapsed_ms: u32,
        width_ms: u32,
        sample: impl FnOnce() -> bool,
    ) -> Option<bool> {
        self.previous = self.current;

        if self.silence_ms > elapsed_ms {
            self.silence_ms -= elapsed_ms;
            return None;
        }

        self.silence_ms = 0;
        self.current = sample();

        if self.current != self.previous {
            self.silence_ms = width_ms;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn on(&self) -> bool {
        self.current
    }

    pub fn off(&self) -> bool {
        !self.current
    }

    pub fn turned_on(&self) -> bool {
        self.current && !self.previous
    }

    pub fn turned_off(&self) -> bool {
        !self.current && self.previous
    }

    pub fn changed(&self) -> bool {
        self.current != self.previous
    }

    pub fn unchanged(&self) -> bool {
        self.current == self.previous
    }

    pub fn transition(&self) -> Transition {
        match (self.previous, self.current) {
            (false, true) => Transition::Rising,
            (true, false) => Transition::Falling,
            _ => Transition::Steady,
        }
    }

    /// Silence left before the input is sampled again
    pub fn silence_ms(&self) -> u32 {
        self.silence_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edge_visible_for_one_step() {
        let mut state = DebounceState::new(false);

        assert_eq!(state.step(1, 5, || true), Some(true));
        assert!(state.turned_on());
        assert_eq!(state.transition(), Transition::Rising);

        assert_eq!(state.step(1, 5, || true), None);
        assert!(state.on());
        assert!(state.unchanged());
        assert!(!state.turned_on());
    }

    #[test]
    fn test_silence_freezes_value() {
        let mut state = DebounceState::new(false);
        state.step(0, 10, || true);
        assert_eq!(state.silence_ms(), 10);

        // Bounce back to false inside the window is ignored
        for _ in 0..3 {
            assert_eq!(state.step(3, 10, || false), None);
            assert!(state.on());
            assert!(state.unchanged());
        }
        assert_eq!(state.silence_ms(), 1);

        // Window over, raw value still false: accepted
        assert_eq!(state.step(3, 10, || false), Some(false));
        assert!(state.turned_off());
        assert_eq!(state.transition(), Transition::Falling);
    }

    #[test]
    fn test_silence_equal_to_elapsed_resamples() {
        let mut state = DebounceState::new(false);
        state.step(0, 4, || true);
        assert_eq!(state.step(4, 4, || false), Some(false));
    }

    #[test]
    fn test_zero_width_never_silences() {
        let mut state = DebounceState::new(false);
        state.step(1, 0, || true);
        assert_eq!(state.step(0, 0, || false), Some(false));
    }

    #[test]
    fn test_no_sample_while_silenced() {
        let mut state = DebounceState::new(true);
        state.step(0, 100, || false);
        state.step(1, 100, || panic!("sampled during silence"));
    }

    proptest! {
        #[test]
        fn prop_constant_input_never_edges(
            value in any::<bool>(),
            width in 0u32..50,
            gaps in proptest::collection::vec(0u32..20, 1..100),
        ) {
            let mut state = DebounceState::new(value);
            for gap in gaps {
                prop_assert_eq!(state.step(gap, width, || value), None);
                prop_assert!(!state.turned_on());
                prop_assert!(!state.turned_off());
                prop_assert_eq!(state.silence_ms(), 0);
            }
        }
    }
}
