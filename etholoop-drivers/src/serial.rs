//! Serial link to the host computer
//!
//! Wraps a UART with a [`LineAssembler`] for incoming commands and a
//! [`Record`] for outgoing data. [`SerialLink::poll`] never waits: it reads
//! only the bytes already received and stops at the first completed line, so
//! a burst of several commands is handed out one per loop.

use core::fmt;

use etholoop_hal::{UartRx, UartTx};
use etholoop_protocol::{
    Command, DecodeMode, LineAssembler, LineError, Record, RecordError, MAX_LINE_LEN,
    MAX_RECORD_LEN, RECORD_TERMINATOR,
};

/// Serial link error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// UART failure
    Uart(E),
    /// Incoming line discarded
    Line(LineError),
    /// Outgoing field did not fit
    Record(RecordError),
}

impl<E> From<LineError> for LinkError<E> {
    fn from(err: LineError) -> Self {
        Self::Line(err)
    }
}

impl<E> From<RecordError> for LinkError<E> {
    fn from(err: RecordError) -> Self {
        Self::Record(err)
    }
}

/// Command/record link over a UART
pub struct SerialLink<U, const N: usize = MAX_LINE_LEN, const M: usize = MAX_RECORD_LEN> {
    uart: U,
    assembler: LineAssembler<N>,
    command: Command<N>,
    record: Record<M>,
}

impl<U, const N: usize, const M: usize> SerialLink<U, N, M> {
    pub fn new(uart: U, eol: u8, separator: u8) -> Self {
        Self {
            uart,
            assembler: LineAssembler::new(eol),
            command: Command::none(),
            record: Record::new(separator),
        }
    }

    /// Choose between split (code:payload) and raw decoding
    pub fn set_mode(&mut self, mode: DecodeMode) {
        self.assembler.set_mode(mode);
    }

    /// Command decoded by the last poll
    pub fn command(&self) -> &Command<N> {
        &self.command
    }

    /// Code of the last poll's command, 0 when none arrived
    pub fn code(&self) -> i32 {
        self.command.code
    }

    /// Payload of the last poll's command, empty when none arrived
    pub fn payload(&self) -> &str {
        &self.command.payload
    }

    /// Append a text field to the outgoing record
    pub fn append(&mut self, field: &str) -> Result<(), RecordError> {
        self.record.append(field)
    }

    /// Append a displayable value to the outgoing record
    pub fn append_value<T: fmt::Display + ?Sized>(&mut self, value: &T) -> Result<(), RecordError> {
        self.record.append_value(value)
    }

    /// Outgoing record accumulated so far
    pub fn record(&self) -> &str {
        self.record.line()
    }

    /// Drop the outgoing record without sending it
    pub fn clear(&mut self) {
        self.record.clear();
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }
}

impl<U: UartRx, const N: usize, const M: usize> SerialLink<U, N, M> {
    /// Read what has arrived and decode at most one line
    ///
    /// The previous command is reset on every call, so a poll without a
    /// complete line yields code 0 and an empty payload.
    pub fn poll(&mut self) -> Result<&Command<N>, LinkError<U::Error>> {
        self.command = Command::none();

        while let Some(byte) = self.uart.try_read_byte().map_err(LinkError::Uart)? {
            match self.assembler.feed(byte) {
                Ok(None) => {}
                Ok(Some(command)) => {
                    self.command = command;
                    break;
                }
                Err(err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Discarded host line: {}", err);
                    return Err(err.into());
                }
            }
        }

        Ok(&self.command)
    }
}

impl<U: UartTx, const N: usize, const M: usize> SerialLink<U, N, M> {
    /// Send the record as one line and clear it
    ///
    /// The record is cleared even when the UART fails.
    pub fn flush(&mut self) -> Result<(), LinkError<U::Error>> {
        let result = self
            .uart
            .write_blocking(self.record.line().as_bytes())
            .and_then(|()| self.uart.write_blocking(RECORD_TERMINATOR))
            .and_then(|()| self.uart.flush())
            .map_err(LinkError::Uart);
        self.record.clear();
        result
    }

    /// Append every field and send the record
    pub fn send(&mut self, fields: &[&str]) -> Result<(), LinkError<U::Error>> {
        for field in fields {
            self.record.append(field)?;
        }
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etholoop_hal::mock::{MockUart, MockUartError};

    type Link = SerialLink<MockUart<128>>;

    fn link() -> Link {
        SerialLink::new(MockUart::new(), b'\n', b'\t')
    }

    #[test]
    fn test_nothing_received() {
        let mut link = link();
        assert!(link.poll().unwrap().is_none());
        assert_eq!(link.code(), 0);
        assert_eq!(link.payload(), "");
    }

    #[test]
    fn test_one_line_per_poll() {
        let mut link = link();
        link.uart_mut().receive(b"5:trainingMode\nA\n");

        assert_eq!(link.poll().unwrap().code, 5);
        assert_eq!(link.payload(), "trainingMode");

        assert_eq!(link.poll().unwrap().code, 65);
        assert_eq!(link.payload(), "");

        // Reset on the next poll
        link.poll().unwrap();
        assert_eq!(link.code(), 0);
    }

    #[test]
    fn test_partial_line_completes_later() {
        let mut link = link();
        link.uart_mut().receive(b"2:15");
        assert!(link.poll().unwrap().is_none());

        link.uart_mut().receive(b"00\r\n");
        let command = link.poll().unwrap();
        assert_eq!((command.code, command.payload.as_str()), (2, "1500"));
    }

    #[test]
    fn test_overflow_reported() {
        let mut link: SerialLink<MockUart<128>, 8> = SerialLink::new(MockUart::new(), b'\n', b'\t');
        link.uart_mut().receive(b"1:this-line-is-long\n3:ok\n");
        assert_eq!(link.poll(), Err(LinkError::Line(LineError::Overflow)));
        assert_eq!(link.poll().unwrap().code, 3);
    }

    #[test]
    fn test_raw_mode() {
        let mut link = link();
        link.set_mode(DecodeMode::Raw);
        link.uart_mut().receive(b"5:x\n");
        assert_eq!(link.poll().unwrap().payload, "5:x");
        assert_eq!(link.code(), 0);
    }

    #[test]
    fn test_flush_record() {
        let mut link = link();
        link.append("trial").unwrap();
        link.append_value(&3).unwrap();
        link.append_value(&true).unwrap();
        assert_eq!(link.record(), "trial\t3\ttrue");

        link.flush().unwrap();
        assert_eq!(link.uart().sent(), b"trial\t3\ttrue\r\n");
        assert_eq!(link.record(), "");

        link.send(&["a", "b"]).unwrap();
        assert_eq!(link.uart().sent(), b"trial\t3\ttrue\r\na\tb\r\n");
    }

    #[test]
    fn test_clear_discards_record() {
        let mut link = link();
        link.append("stale").unwrap();
        link.clear();
        link.flush().unwrap();
        assert_eq!(link.uart().sent(), b"\r\n");
    }

    #[test]
    fn test_uart_failure_clears_record() {
        let mut link: SerialLink<MockUart<4>> = SerialLink::new(MockUart::new(), b'\n', b'\t');
        link.append("too long for the uart").unwrap();
        assert_eq!(link.flush(), Err(LinkError::Uart(MockUartError::TxFull)));
        assert_eq!(link.record(), "");
    }
}
