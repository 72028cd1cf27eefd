//! Host-side mock hardware
//!
//! Mock pins observe or drive their level through a borrowed [`Cell`], so a
//! test keeps a handle on the signal after the pin itself has been moved into
//! the component under test.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::clock::MonotonicClock;
use crate::gpio::{InputPin, OutputPin};
use crate::port::{AnalogPort, DigitalPort};
use crate::pwm::{PwmOutput, ToneOutput};
use crate::uart::{UartRx, UartTx};

/// Manually advanced clock
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<u32>,
}

impl MockClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now.set(now_ms);
    }

    /// Advance time, wrapping like the hardware counter
    pub fn advance(&self, delta_ms: u32) {
        self.now.set(self.now.get().wrapping_add(delta_ms));
    }
}

impl MonotonicClock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Output pin writing into a shared cell
#[derive(Debug)]
pub struct MockOutputPin<'a> {
    level: &'a Cell<bool>,
}

impl<'a> MockOutputPin<'a> {
    pub fn new(level: &'a Cell<bool>) -> Self {
        Self { level }
    }
}

impl OutputPin for MockOutputPin<'_> {
    fn set_high(&mut self) {
        self.level.set(true);
    }

    fn set_low(&mut self) {
        self.level.set(false);
    }

    fn is_set_high(&self) -> bool {
        self.level.get()
    }
}

/// Input pin reading from a shared cell (true = electrically high)
#[derive(Debug)]
pub struct MockInputPin<'a> {
    level: &'a Cell<bool>,
}

impl<'a> MockInputPin<'a> {
    pub fn new(level: &'a Cell<bool>) -> Self {
        Self { level }
    }
}

impl InputPin for MockInputPin<'_> {
    fn is_high(&mut self) -> bool {
        self.level.get()
    }
}

/// PWM output writing its duty into a shared cell
#[derive(Debug)]
pub struct MockPwm<'a> {
    duty: &'a Cell<u8>,
}

impl<'a> MockPwm<'a> {
    pub fn new(duty: &'a Cell<u8>) -> Self {
        Self { duty }
    }
}

impl PwmOutput for MockPwm<'_> {
    fn set_duty(&mut self, duty: u8) {
        self.duty.set(duty);
    }

    fn duty(&self) -> u8 {
        self.duty.get()
    }
}

/// Tone output recording the sounding frequency in a shared cell
#[derive(Debug)]
pub struct MockTone<'a> {
    freq: &'a Cell<Option<u16>>,
}

impl<'a> MockTone<'a> {
    pub fn new(freq: &'a Cell<Option<u16>>) -> Self {
        Self { freq }
    }
}

impl ToneOutput for MockTone<'_> {
    fn start_tone(&mut self, freq_hz: u16) {
        self.freq.set(Some(freq_hz));
    }

    fn stop_tone(&mut self) {
        self.freq.set(None);
    }

    fn sounding(&self) -> Option<u16> {
        self.freq.get()
    }
}

/// Board port with `N` addressable pins
///
/// Writes to pin numbers outside `0..N` are ignored.
#[derive(Debug, Clone)]
pub struct MockPort<const N: usize> {
    pub levels: [bool; N],
    pub duties: [u8; N],
    pub writes: u32,
}

impl<const N: usize> Default for MockPort<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MockPort<N> {
    pub fn new() -> Self {
        Self {
            levels: [false; N],
            duties: [0; N],
            writes: 0,
        }
    }
}

impl<const N: usize> DigitalPort for MockPort<N> {
    fn write_level(&mut self, pin: u8, high: bool) {
        if let Some(level) = self.levels.get_mut(pin as usize) {
            *level = high;
            self.writes += 1;
        }
    }
}

impl<const N: usize> AnalogPort for MockPort<N> {
    fn write_duty(&mut self, pin: u8, duty: u8) {
        if let Some(slot) = self.duties.get_mut(pin as usize) {
            *slot = duty;
            self.writes += 1;
        }
    }
}

/// Mock UART error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockUartError {
    /// Transmit capture buffer is full
    TxFull,
}

/// Loopback-free UART with a scripted receive queue and a transmit capture
#[derive(Debug, Default)]
pub struct MockUart<const N: usize> {
    rx: Deque<u8, N>,
    tx: Vec<u8, N>,
}

impl<const N: usize> MockUart<N> {
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
        }
    }

    /// Queue bytes as if the host had sent them; excess bytes are dropped
    pub fn receive(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let _ = self.rx.push_back(byte);
        }
    }

    /// Bytes written by the device so far
    pub fn sent(&self) -> &[u8] {
        &self.tx
    }

    pub fn clear_sent(&mut self) {
        self.tx.clear();
    }
}

impl<const N: usize> UartTx for MockUart<N> {
    type Error = MockUartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx
            .extend_from_slice(data)
            .map_err(|_| MockUartError::TxFull)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<const N: usize> UartRx for MockUart<N> {
    type Error = MockUartError;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        Ok(self.rx.pop_front())
    }
}
