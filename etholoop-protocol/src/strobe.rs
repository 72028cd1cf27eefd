//! Character strobe bus framing
//!
//! Eight data lines carry a byte while a ninth line strobes. Each byte takes
//! two phases of one width each:
//!
//! ```text
//! data    ══╤═══ 'H' ═══╤═══ 'i' ═══╤═ 0x00 ══
//! strobe  __│‾‾‾‾‾│_____│‾‾‾‾‾│_____│_________
//!           │width│width│
//! ```
//!
//! After the last byte the data lines drop to zero. An optional terminator
//! pulses the strobe once more with all-zero data.

/// Widths above this many microseconds are waited in whole milliseconds
pub const MICROS_LIMIT_US: u32 = 2_000;

/// Length of one strobe phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrobeWidth {
    Micros(u32),
    Millis(u32),
}

impl StrobeWidth {
    pub const fn from_us(width_us: u32) -> Self {
        if width_us > MICROS_LIMIT_US {
            Self::Millis(width_us / 1_000)
        } else {
            Self::Micros(width_us)
        }
    }

    pub const fn as_us(&self) -> u32 {
        match *self {
            Self::Micros(us) => us,
            Self::Millis(ms) => ms.saturating_mul(1_000),
        }
    }
}

/// One bus state to apply, optionally held for one width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StrobeStep {
    pub data: u8,
    pub strobe: bool,
    pub wait: bool,
}

impl StrobeStep {
    const fn new(data: u8, strobe: bool, wait: bool) -> Self {
        Self { data, strobe, wait }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Byte { index: usize, strobe: bool },
    Clear,
    TerminatorHigh,
    TerminatorLow,
    Done,
}

/// Bus steps for one text
#[derive(Debug, Clone)]
pub struct StrobeFrames<'a> {
    bytes: &'a [u8],
    terminator: bool,
    phase: Phase,
}

impl<'a> StrobeFrames<'a> {
    pub fn new(bytes: &'a [u8], terminator: bool) -> Self {
        Self {
            bytes,
            terminator,
            phase: Phase::Byte {
                index: 0,
                strobe: true,
            },
        }
    }

    /// Number of width-long waits the text takes
    pub fn wait_count(&self) -> usize {
        self.bytes.len() * 2 + usize::from(self.terminator)
    }
}

impl Iterator for StrobeFrames<'_> {
    type Item = StrobeStep;

    fn next(&mut self) -> Option<StrobeStep> {
        let (step, next) = match self.phase {
            Phase::Byte { index, strobe } => match self.bytes.get(index) {
                Some(&byte) if strobe => (
                    StrobeStep::new(byte, true, true),
                    Phase::Byte {
                        index,
                        strobe: false,
                    },
                ),
                Some(&byte) => (
                    StrobeStep::new(byte, false, true),
                    Phase::Byte {
                        index: index + 1,
                        strobe: true,
                    },
                ),
                None => {
                    self.phase = Phase::Clear;
                    return self.next();
                }
            },
            Phase::Clear => {
                let next = if self.terminator {
                    Phase::TerminatorHigh
                } else {
                    Phase::Done
                };
                (StrobeStep::new(0, false, false), next)
            }
            Phase::TerminatorHigh => (StrobeStep::new(0, true, true), Phase::TerminatorLow),
            Phase::TerminatorLow => (StrobeStep::new(0, false, false), Phase::Done),
            Phase::Done => return None,
        };
        self.phase = next;
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn steps(text: &[u8], terminator: bool) -> Vec<(u8, bool, bool)> {
        StrobeFrames::new(text, terminator)
            .map(|step| (step.data, step.strobe, step.wait))
            .collect()
    }

    #[test]
    fn test_two_phases_per_byte() {
        assert_eq!(
            steps(b"Hi", false),
            [
                (b'H', true, true),
                (b'H', false, true),
                (b'i', true, true),
                (b'i', false, true),
                (0, false, false),
            ]
        );
    }

    #[test]
    fn test_terminator() {
        assert_eq!(
            steps(b"A", true),
            [
                (b'A', true, true),
                (b'A', false, true),
                (0, false, false),
                (0, true, true),
                (0, false, false),
            ]
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(steps(b"", false), [(0, false, false)]);
        assert_eq!(StrobeFrames::new(b"", true).count(), 3);
    }

    #[test]
    fn test_wait_count_matches_steps() {
        for (text, terminator) in [(&b"trial 12"[..], true), (&b"x"[..], false)] {
            let frames = StrobeFrames::new(text, terminator);
            let waits = frames.clone().filter(|step| step.wait).count();
            assert_eq!(frames.wait_count(), waits);
        }
    }

    #[test]
    fn test_width_units() {
        assert_eq!(StrobeWidth::from_us(5), StrobeWidth::Micros(5));
        assert_eq!(StrobeWidth::from_us(2_000), StrobeWidth::Micros(2_000));
        assert_eq!(StrobeWidth::from_us(2_500), StrobeWidth::Millis(2));
        assert_eq!(StrobeWidth::from_us(10_000).as_us(), 10_000);
    }
}
