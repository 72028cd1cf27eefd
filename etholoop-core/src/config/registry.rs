//! Pin ownership bookkeeping
//!
//! Every component exclusively owns the pins it is built with. The registry
//! catches two components being configured with the same pin before any of
//! them touches hardware.

use heapless::FnvIndexSet;

/// GPIO count on the reference board (RP2040)
pub const BOARD_PIN_COUNT: u8 = 30;

/// Error when claiming a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number outside the board's range
    InvalidPin,
    /// Pin already claimed by another component
    AlreadyTaken,
    /// Registry capacity exhausted
    Full,
}

/// Set of claimed pin numbers
#[derive(Debug)]
pub struct PinRegistry {
    pin_count: u8,
    claimed: FnvIndexSet<u8, 64>,
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new(BOARD_PIN_COUNT)
    }
}

impl PinRegistry {
    /// Registry for pins `0..pin_count`
    pub fn new(pin_count: u8) -> Self {
        Self {
            pin_count,
            claimed: FnvIndexSet::new(),
        }
    }

    /// Claim a pin
    pub fn claim(&mut self, pin: u8) -> Result<(), PinError> {
        if pin >= self.pin_count {
            return Err(PinError::InvalidPin);
        }
        match self.claimed.insert(pin) {
            Ok(true) => Ok(()),
            Ok(false) => Err(PinError::AlreadyTaken),
            Err(_) => Err(PinError::Full),
        }
    }

    /// Claim several pins, stopping at the first failure
    ///
    /// Pins claimed before the failure stay claimed.
    pub fn claim_all(&mut self, pins: &[u8]) -> Result<(), (u8, PinError)> {
        for &pin in pins {
            self.claim(pin).map_err(|err| (pin, err))?;
        }
        Ok(())
    }

    /// Release a pin
    pub fn release(&mut self, pin: u8) {
        self.claimed.remove(&pin);
    }

    pub fn is_claimed(&self, pin: u8) -> bool {
        self.claimed.contains(&pin)
    }

    /// Number of claimed pins
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }
}
