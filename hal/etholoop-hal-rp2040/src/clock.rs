//! Millisecond clock
//!
//! The embassy time driver counts in 64-bit ticks; components only see the
//! low 32 bits of the millisecond count, which wrap after about 49.7 days
//! exactly like the counter the deadline arithmetic is written for.

use embassy_time::Instant;

use etholoop_hal::MonotonicClock;

#[derive(Debug, Clone, Copy, Default)]
pub struct RpClock;

impl MonotonicClock for RpClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
