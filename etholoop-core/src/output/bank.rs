//! Multi-pin pulse bank
//!
//! Several digital outputs (reward valves, house lights, event lines) that
//! are each pulsed high for a caller-chosen time. Every pin has its own
//! deadline; a single [`PulseBank::poll`] advances all of them.

use heapless::Vec;

use etholoop_hal::{MonotonicClock, OutputPin};

use crate::timing::Deadline;

/// Maximum number of pins held by one bank
pub const MAX_BANK_OUTPUTS: usize = 10;

/// A pin that was lowered by [`PulseBank::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Expiry {
    /// Index of the pin within the bank
    pub index: u8,
    /// Milliseconds between the intended and actual lowering
    pub overshoot_ms: u32,
}

#[derive(Debug)]
struct Slot<P> {
    pin: P,
    deadline: Deadline,
}

/// Independently timed digital outputs
#[derive(Debug)]
pub struct PulseBank<C, P> {
    clock: C,
    slots: Vec<Slot<P>, MAX_BANK_OUTPUTS>,
}

impl<C: MonotonicClock, P: OutputPin> PulseBank<C, P> {
    /// Take ownership of up to [`MAX_BANK_OUTPUTS`] pins, driving them low
    ///
    /// Pins beyond the capacity are dropped.
    pub fn new(clock: C, pins: impl IntoIterator<Item = P>) -> Self {
        let mut slots = Vec::new();
        for mut pin in pins.into_iter().take(MAX_BANK_OUTPUTS) {
            pin.set_low();
            let _ = slots.push(Slot {
                pin,
                deadline: Deadline::idle(),
            });
        }
        Self { clock, slots }
    }

    /// Number of pins in the bank
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drive pin `index` high now and lower it `duration_ms` from now
    ///
    /// Re-firing a pin that is already high replaces its deadline.
    pub fn fire(&mut self, index: usize, duration_ms: u32) {
        debug_assert!(index < self.slots.len(), "output index out of range");
        let now = self.clock.now_ms();
        if let Some(slot) = self.slots.get_mut(index) {
            slot.pin.set_high();
            slot.deadline.arm(now, duration_ms);
        }
    }

    /// Lower every pin whose deadline is due
    ///
    /// Returns the pins lowered by this call with their overshoot; empty when
    /// nothing was due.
    pub fn poll(&mut self) -> Vec<Expiry, MAX_BANK_OUTPUTS> {
        let now = self.clock.now_ms();
        let mut expired = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(overshoot_ms) = slot.deadline.expire(now) {
                slot.pin.set_low();
                let _ = expired.push(Expiry {
                    index: index as u8,
                    overshoot_ms,
                });
            }
        }

        expired
    }

    /// Lower pin `index` immediately and drop its deadline
    pub fn stop(&mut self, index: usize) {
        debug_assert!(index < self.slots.len(), "output index out of range");
        if let Some(slot) = self.slots.get_mut(index) {
            slot.deadline.disarm();
            slot.pin.set_low();
        }
    }

    /// Whether pin `index` is currently high
    pub fn is_high(&self, index: usize) -> bool {
        debug_assert!(index < self.slots.len(), "output index out of range");
        self.slots
            .get(index)
            .map(|slot| slot.pin.is_set_high())
            .unwrap_or(false)
    }

    /// Whether pin `index` has a pending deadline
    pub fn is_armed(&self, index: usize) -> bool {
        debug_assert!(index < self.slots.len(), "output index out of range");
        self.slots
            .get(index)
            .map(|slot| slot.deadline.is_armed())
            .unwrap_or(false)
    }
}
