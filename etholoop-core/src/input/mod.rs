//! Debounced inputs
//!
//! Inputs are sampled once per loop. After a sampled value changes, that
//! input is frozen for a silence window so that contact bounce cannot
//! register as extra edges. Silence is tracked per input: one noisy switch
//! never delays detection on its neighbors.

pub mod debounce;
pub mod digital;
pub mod tracker;

pub use debounce::{DebounceState, Transition};
pub use digital::{DigitalInputs, NoRelay, DEFAULT_DEBOUNCE_MS, MAX_INPUTS};
pub use tracker::BoolTracker;
