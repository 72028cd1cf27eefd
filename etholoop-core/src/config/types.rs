//! Configuration type definitions
//!
//! A [`RigConfig`] describes one behavioral rig: which pins are sensors,
//! which are actuators, how the host link is framed. Firmware builds one from
//! constants generated at compile time and calls [`RigConfig::validate`]
//! before handing pins to any component.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::registry::{PinError, PinRegistry};
use crate::input::{DEFAULT_DEBOUNCE_MS, MAX_INPUTS};
use crate::output::MAX_BANK_OUTPUTS;

/// Longest accepted debounce window
pub const MAX_DEBOUNCE_MS: u32 = 255;

/// Default strobe phase width in microseconds
pub const DEFAULT_STROBE_WIDTH_US: u32 = 5;

/// Default pause-gate polling cycle
pub const DEFAULT_PAUSE_CYCLE_MS: u16 = 100;

/// Configuration validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin used by more than one component
    PinConflict(u8),
    /// Pin number outside the board's range
    InvalidPin(u8),
    /// More than [`MAX_INPUTS`] inputs
    TooManyInputs,
    /// More than [`MAX_BANK_OUTPUTS`] outputs
    TooManyOutputs,
    /// Relay list present but not one relay per input
    RelayMismatch,
    /// Debounce window above [`MAX_DEBOUNCE_MS`]
    InvalidDebounce,
}

impl ConfigError {
    /// Map a failed pin claim to the config error naming that pin
    pub fn from_pin(pin: u8, err: PinError) -> Self {
        match err {
            PinError::AlreadyTaken => Self::PinConflict(pin),
            PinError::InvalidPin | PinError::Full => Self::InvalidPin(pin),
        }
    }
}

/// Debounced input bank configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputBankConfig {
    /// Pulled-up input pins, grounded = active
    pub pins: Vec<u8, MAX_INPUTS>,
    /// Relay output per input; empty for none
    pub relays: Vec<u8, MAX_INPUTS>,
    /// Silence after a transition in milliseconds
    pub debounce_ms: u32,
}

impl Default for InputBankConfig {
    fn default() -> Self {
        Self {
            pins: Vec::new(),
            relays: Vec::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl InputBankConfig {
    pub fn new(pins: &[u8], relays: &[u8], debounce_ms: u32) -> Result<Self, ConfigError> {
        let config = Self {
            pins: Vec::from_slice(pins).map_err(|_| ConfigError::TooManyInputs)?,
            relays: Vec::from_slice(relays).map_err(|_| ConfigError::TooManyInputs)?,
            debounce_ms,
        };
        if !config.relays.is_empty() && config.relays.len() != config.pins.len() {
            return Err(ConfigError::RelayMismatch);
        }
        if debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::InvalidDebounce);
        }
        Ok(config)
    }

    pub fn has_relays(&self) -> bool {
        !self.relays.is_empty()
    }
}

/// Pulse bank configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputBankConfig {
    pub pins: Vec<u8, MAX_BANK_OUTPUTS>,
}

impl OutputBankConfig {
    pub fn new(pins: &[u8]) -> Result<Self, ConfigError> {
        Ok(Self {
            pins: Vec::from_slice(pins).map_err(|_| ConfigError::TooManyOutputs)?,
        })
    }
}

/// Host serial link framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    pub baudrate: u32,
    /// Byte ending an incoming command line
    pub eol: u8,
    /// Byte placed between outgoing record fields
    pub separator: u8,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            eol: b'\n',
            separator: b'\t',
        }
    }
}

/// Character strobe bus: 8 data pins from `first_pin`, strobe right after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrobeConfig {
    pub first_pin: u8,
    pub width_us: u32,
    /// Send an all-zero strobe after the text
    pub terminator: bool,
}

impl StrobeConfig {
    pub fn new(first_pin: u8) -> Self {
        Self {
            first_pin,
            width_us: DEFAULT_STROBE_WIDTH_US,
            terminator: false,
        }
    }

    /// Data pins, bit 0 first, followed by the strobe pin
    pub fn pins(&self) -> [u8; 9] {
        core::array::from_fn(|i| self.first_pin.wrapping_add(i as u8))
    }
}

/// Pause switch configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PauseConfig {
    pub pin: u8,
    /// Active (grounded) level pauses the task when true
    pub pause_when_active: bool,
    pub cycle_ms: u16,
}

impl PauseConfig {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            pause_when_active: true,
            cycle_ms: DEFAULT_PAUSE_CYCLE_MS,
        }
    }
}

/// Loop-rate reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    pub enabled: bool,
    /// How often the loop statistics are logged
    pub report_interval_ms: u32,
    /// Warn when the moving average gap exceeds this
    pub warn_gap_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            report_interval_ms: 10_000,
            warn_gap_ms: 2,
        }
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigConfig {
    pub inputs: InputBankConfig,
    pub outputs: OutputBankConfig,
    /// Tone speaker pin
    pub tone_pin: Option<u8>,
    pub strobe: Option<StrobeConfig>,
    pub pause: Option<PauseConfig>,
    pub serial: SerialConfig,
    pub monitor: MonitorConfig,
}

impl RigConfig {
    /// Check counts, debounce range and pin uniqueness
    ///
    /// Returns the registry holding every configured pin, so callers can keep
    /// claiming pins for components set up outside the config.
    pub fn validate(&self) -> Result<PinRegistry, ConfigError> {
        self.validate_with(PinRegistry::default())
    }

    /// Like [`validate`](Self::validate) against a caller-prepared registry
    /// (pins reserved for the UART, flash, ...)
    pub fn validate_with(&self, mut registry: PinRegistry) -> Result<PinRegistry, ConfigError> {
        if self.inputs.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::InvalidDebounce);
        }
        if self.inputs.has_relays() && self.inputs.relays.len() != self.inputs.pins.len() {
            return Err(ConfigError::RelayMismatch);
        }

        let strobe_pins = self.strobe.map(|strobe| strobe.pins());
        let singles = [self.tone_pin, self.pause.map(|pause| pause.pin)];

        let pins = self
            .inputs
            .pins
            .iter()
            .chain(self.inputs.relays.iter())
            .chain(self.outputs.pins.iter())
            .chain(strobe_pins.iter().flatten())
            .chain(singles.iter().flatten());

        for &pin in pins {
            registry
                .claim(pin)
                .map_err(|err| ConfigError::from_pin(pin, err))?;
        }

        Ok(registry)
    }
}
