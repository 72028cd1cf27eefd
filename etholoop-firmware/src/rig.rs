//! Rig wiring compiled in from rig.toml
//!
//! build.rs has already rejected malformed files; [`load`] re-checks the
//! result against the pin registry so the firmware and the host-side
//! validation can never disagree about pin ownership.

use etholoop_core::config::{
    ConfigError, InputBankConfig, MonitorConfig, OutputBankConfig, PauseConfig, PinRegistry,
    RigConfig, SerialConfig, StrobeConfig,
};
use etholoop_hal_rp2040::pins;

/// Lever task timing
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskTiming {
    /// Tone cue length (ms)
    pub cue_ms: u32,
    pub cue_hz: u16,
    /// Response window after the cue (ms)
    pub response_ms: u32,
    /// Reward valve opening (ms)
    pub reward_ms: u32,
    /// Inter-trial interval (ms)
    pub iti_ms: u32,
    /// Dimmer duty during the inter-trial interval
    pub iti_dim: u8,
}

include!(concat!(env!("OUT_DIR"), "/rig_config.rs"));

/// Build the rig configuration and claim every pin it uses
///
/// The returned registry also holds the host UART pins, the dimmer and the
/// event markers.
pub fn load() -> Result<(RigConfig, PinRegistry), ConfigError> {
    let config = RigConfig {
        inputs: InputBankConfig::new(INPUT_PINS, RELAY_PINS, DEBOUNCE_MS)?,
        outputs: OutputBankConfig::new(OUTPUT_PINS)?,
        tone_pin: TONE_PIN,
        strobe: STROBE,
        pause: PAUSE,
        serial: SERIAL,
        monitor: MONITOR,
    };

    let mut registry = PinRegistry::default();
    registry
        .claim_all(&pins::UART_PINS)
        .map_err(|(pin, err)| ConfigError::from_pin(pin, err))?;
    if let Some(pin) = DIMMER_PIN {
        registry
            .claim(pin)
            .map_err(|err| ConfigError::from_pin(pin, err))?;
    }

    let mut registry = config.validate_with(registry)?;
    registry
        .claim_all(MARKER_PINS)
        .map_err(|(pin, err)| ConfigError::from_pin(pin, err))?;

    Ok((config, registry))
}
