//! Loop-rate monitor
//!
//! Records the gap between consecutive polls so the host can check that its
//! loop runs fast enough for the debounce and timer resolution it relies on.
//! Two averages are kept: the running mean since [`LoopMonitor::start`] and a
//! moving average over the last `N` gaps.

use heapless::HistoryBuffer;

use etholoop_hal::MonotonicClock;

/// Default moving-average window
pub const DEFAULT_WINDOW: usize = 10;

#[derive(Debug)]
pub struct LoopMonitor<C, const N: usize = DEFAULT_WINDOW> {
    clock: C,
    origin_ms: u32,
    last_ms: u32,
    count: u32,
    max_gap: Option<u32>,
    min_gap: Option<u32>,
    recent: HistoryBuffer<u32, N>,
}

impl<C: MonotonicClock, const N: usize> LoopMonitor<C, N> {
    /// Create a monitor whose origin is now
    pub fn new(clock: C) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            origin_ms: now,
            last_ms: now,
            count: 0,
            max_gap: None,
            min_gap: None,
            recent: HistoryBuffer::new(),
        }
    }

    /// Reset the origin, count, extrema and window
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        self.origin_ms = now;
        self.last_ms = now;
        self.count = 0;
        self.max_gap = None;
        self.min_gap = None;
        self.recent.clear();
    }

    /// Record one pass of the loop
    ///
    /// Returns the mean gap in milliseconds since [`start`](Self::start).
    pub fn poll(&mut self) -> f32 {
        let now = self.clock.now_ms();
        let gap = now.wrapping_sub(self.last_ms);
        self.last_ms = now;
        self.count = self.count.saturating_add(1);

        self.max_gap = Some(self.max_gap.map_or(gap, |max| max.max(gap)));
        self.min_gap = Some(self.min_gap.map_or(gap, |min| min.min(gap)));
        self.recent.write(gap);

        self.mean()
    }

    /// Mean gap since [`start`](Self::start), zero before the first poll
    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.last_ms.wrapping_sub(self.origin_ms) as f32 / self.count as f32
    }

    /// Mean of the last `N` gaps
    pub fn moving_average(&self) -> Option<f32> {
        if self.recent.is_empty() {
            return None;
        }
        let total: u64 = self.recent.as_slice().iter().map(|&gap| u64::from(gap)).sum();
        Some(total as f32 / self.recent.len() as f32)
    }

    /// Longest gap since [`start`](Self::start)
    pub fn max(&self) -> Option<u32> {
        self.max_gap
    }

    /// Shortest gap since [`start`](Self::start)
    pub fn min(&self) -> Option<u32> {
        self.min_gap
    }

    /// Polls since [`start`](Self::start)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Most recent gap
    pub fn last_gap(&self) -> Option<u32> {
        self.recent.recent().copied()
    }
}
