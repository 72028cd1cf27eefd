//! Deadline timer
//!
//! The atomic building block of every scheduled action. A deadline is kept
//! as the instant it was armed plus a duration, and is due once the wrapping
//! difference `now - armed_at` reaches the duration. Comparing elapsed time
//! rather than absolute instants keeps the test correct when the interval
//! straddles the clock wrap.
//!
//! ```text
//!   armed_at                 armed_at + duration
//!      │◄──────── duration ────────►│
//! ─────┼────────────────────────────┼──────────► now
//!      │      is_due() == false     │ is_due() == true (inclusive)
//! ```
//!
//! A deadline that is left unpolled for longer than `2^32 - duration` ms
//! after it fell due will read as pending again. At one poll per few
//! milliseconds this cannot happen in practice.

use etholoop_hal::CLOCK_MAX;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single pending action, or nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deadline {
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Pending {
    armed_at: u32,
    duration_ms: u32,
}

impl Deadline {
    /// A deadline with nothing pending
    pub const fn idle() -> Self {
        Self { pending: None }
    }

    /// Arm the deadline `duration_ms` after `now`
    ///
    /// Re-arming replaces any pending deadline. A duration of [`CLOCK_MAX`]
    /// is armed but never falls due.
    pub fn arm(&mut self, now: u32, duration_ms: u32) {
        self.pending = Some(Pending {
            armed_at: now,
            duration_ms,
        });
    }

    /// Drop the pending deadline, if any
    pub fn disarm(&mut self) {
        self.pending = None;
    }

    /// Whether an action is pending
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `now` has reached or passed the deadline
    pub fn is_due(&self, now: u32) -> bool {
        self.overshoot(now).is_some()
    }

    /// How late `now` is relative to the deadline, if it is due
    pub fn overshoot(&self, now: u32) -> Option<u32> {
        let pending = self.pending?;
        if pending.duration_ms == CLOCK_MAX {
            return None;
        }
        now.wrapping_sub(pending.armed_at)
            .checked_sub(pending.duration_ms)
    }

    /// Disarm and report the overshoot if the deadline is due at `now`
    ///
    /// This is the poll-side primitive: it returns `Some` exactly once per
    /// arming.
    pub fn expire(&mut self, now: u32) -> Option<u32> {
        let overshoot = self.overshoot(now)?;
        self.pending = None;
        Some(overshoot)
    }

    /// Milliseconds left before the deadline falls due
    ///
    /// `None` when idle, `Some(0)` once due and `Some(CLOCK_MAX)` for a
    /// deadline that never falls due.
    pub fn remaining(&self, now: u32) -> Option<u32> {
        let pending = self.pending?;
        if pending.duration_ms == CLOCK_MAX {
            return Some(CLOCK_MAX);
        }
        let elapsed = now.wrapping_sub(pending.armed_at);
        Some(pending.duration_ms.saturating_sub(elapsed))
    }

    /// Absolute clock value at which the deadline falls due
    ///
    /// Returns [`CLOCK_MAX`] when idle or unlimited.
    pub fn until(&self) -> u32 {
        match self.pending {
            Some(p) if p.duration_ms != CLOCK_MAX => p.armed_at.wrapping_add(p.duration_ms),
            _ => CLOCK_MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_idle_is_never_due() {
        let deadline = Deadline::idle();
        assert!(!deadline.is_armed());
        assert!(!deadline.is_due(0));
        assert!(!deadline.is_due(CLOCK_MAX));
        assert_eq!(deadline.until(), CLOCK_MAX);
        assert_eq!(deadline.remaining(5), None);
    }

    #[test]
    fn test_inclusive_boundary() {
        let mut deadline = Deadline::idle();
        deadline.arm(100, 50);

        assert!(!deadline.is_due(149));
        assert_eq!(deadline.remaining(149), Some(1));
        assert!(deadline.is_due(150));
        assert_eq!(deadline.overshoot(150), Some(0));
        assert_eq!(deadline.overshoot(157), Some(7));
    }

    #[test]
    fn test_zero_duration_due_immediately() {
        let mut deadline = Deadline::idle();
        deadline.arm(42, 0);
        assert_eq!(deadline.expire(42), Some(0));
        assert!(!deadline.is_armed());
    }

    #[test]
    fn test_expire_fires_once() {
        let mut deadline = Deadline::idle();
        deadline.arm(0, 10);
        assert_eq!(deadline.expire(5), None);
        assert_eq!(deadline.expire(12), Some(2));
        assert_eq!(deadline.expire(13), None);
    }

    #[test]
    fn test_rearm_replaces() {
        let mut deadline = Deadline::idle();
        deadline.arm(0, 10);
        deadline.arm(5, 100);
        assert!(!deadline.is_due(10));
        assert!(!deadline.is_due(104));
        assert!(deadline.is_due(105));
    }

    #[test]
    fn test_wraparound_crossing() {
        let mut deadline = Deadline::idle();
        let start = CLOCK_MAX - 5;
        deadline.arm(start, 20);

        assert!(!deadline.is_due(start));
        assert!(!deadline.is_due(CLOCK_MAX));
        assert!(!deadline.is_due(13));
        assert!(deadline.is_due(14));
        assert_eq!(deadline.until(), 14);
    }

    #[test]
    fn test_unlimited_never_due() {
        let mut deadline = Deadline::idle();
        deadline.arm(1_000, CLOCK_MAX);
        assert!(deadline.is_armed());
        assert!(!deadline.is_due(999));
        assert!(!deadline.is_due(1_000u32.wrapping_add(CLOCK_MAX)));
        assert_eq!(deadline.until(), CLOCK_MAX);
        assert_eq!(deadline.remaining(2_000), Some(CLOCK_MAX));
    }

    proptest! {
        #[test]
        fn prop_due_exactly_from_duration(
            start in any::<u32>(),
            duration in 0u32..1_000_000,
            probe in 0u32..2_000_000,
        ) {
            let mut deadline = Deadline::idle();
            deadline.arm(start, duration);
            let now = start.wrapping_add(probe);
            prop_assert_eq!(deadline.is_due(now), probe >= duration);
            if probe >= duration {
                prop_assert_eq!(deadline.overshoot(now), Some(probe - duration));
            }
        }
    }
}
