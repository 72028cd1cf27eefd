//! Rig configuration
//!
//! Pin assignments and timing parameters for one behavioral rig. The values
//! are plain constructor arguments for the components in this crate; nothing
//! here is persisted.

pub mod registry;
pub mod types;

pub use registry::{PinError, PinRegistry, BOARD_PIN_COUNT};
pub use types::*;
