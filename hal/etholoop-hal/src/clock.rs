//! Monotonic millisecond clock
//!
//! Every component in the polling loop reads time through this trait. The
//! counter is 32 bits wide and wraps to zero after roughly 49.7 days, so all
//! arithmetic on its values must use wrapping subtraction.

/// Largest representable clock value; also the "nothing pending" sentinel
pub const CLOCK_MAX: u32 = u32::MAX;

/// Wrapping millisecond counter since an arbitrary epoch (usually boot)
pub trait MonotonicClock {
    /// Current time in milliseconds
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `earlier`, correct across one wrap
    fn elapsed_since(&self, earlier: u32) -> u32 {
        self.now_ms().wrapping_sub(earlier)
    }
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
