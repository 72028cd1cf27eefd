//! Byte-at-a-time line assembly
//!
//! Bytes from the UART are fed one by one. Once the end-of-line byte arrives
//! the buffered line is decoded into a [`Command`]. A line that outgrows the
//! buffer is dropped up to its end-of-line byte and reported once.

use heapless::Vec;

use crate::command::{decode_line, decode_raw, Command};

/// Default line capacity in bytes
pub const MAX_LINE_LEN: usize = 64;

/// Default end-of-line byte
pub const DEFAULT_EOL: u8 = b'\n';

/// Errors while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line longer than the buffer; it was discarded
    Overflow,
    /// Line is not valid UTF-8; it was discarded
    InvalidUtf8,
}

/// How completed lines are turned into commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeMode {
    /// Split into code and payload
    #[default]
    Split,
    /// Keep the whole line as payload
    Raw,
}

/// Accumulates bytes into lines
#[derive(Debug, Clone)]
pub struct LineAssembler<const N: usize = MAX_LINE_LEN> {
    buffer: Vec<u8, N>,
    eol: u8,
    mode: DecodeMode,
    discarding: bool,
}

impl<const N: usize> Default for LineAssembler<N> {
    fn default() -> Self {
        Self::new(DEFAULT_EOL)
    }
}

impl<const N: usize> LineAssembler<N> {
    pub fn new(eol: u8) -> Self {
        Self {
            buffer: Vec::new(),
            eol,
            mode: DecodeMode::Split,
            discarding: false,
        }
    }

    pub fn with_mode(eol: u8, mode: DecodeMode) -> Self {
        Self {
            mode,
            ..Self::new(eol)
        }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DecodeMode) {
        self.mode = mode;
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(command))` when the byte completed a line,
    /// `Ok(None)` when more bytes are needed, or `Err` when the completed line
    /// had to be discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command<N>>, LineError> {
        if byte == self.eol {
            let overflowed = core::mem::replace(&mut self.discarding, false);
            let result = if overflowed {
                Err(LineError::Overflow)
            } else {
                self.decode()
            };
            self.buffer.clear();
            return result;
        }

        if !self.discarding && self.buffer.push(byte).is_err() {
            self.discarding = true;
            self.buffer.clear();
        }
        Ok(None)
    }

    /// Feed bytes until a line completes
    ///
    /// Returns the first line found and how many bytes were consumed.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> (usize, Result<Option<Command<N>>, LineError>) {
        for (index, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => continue,
                result => return (index + 1, result),
            }
        }
        (bytes.len(), Ok(None))
    }

    fn decode(&self) -> Result<Option<Command<N>>, LineError> {
        let line = core::str::from_utf8(&self.buffer).map_err(|_| LineError::InvalidUtf8)?;
        let command = match self.mode {
            DecodeMode::Split => decode_line(line),
            DecodeMode::Raw => decode_raw(line),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all<const N: usize>(
        assembler: &mut LineAssembler<N>,
        bytes: &[u8],
    ) -> std::vec::Vec<Result<Option<Command<N>>, LineError>> {
        bytes
            .iter()
            .map(|&byte| assembler.feed(byte))
            .filter(|result| !matches!(result, Ok(None)))
            .collect()
    }

    #[test]
    fn test_lines() {
        let mut assembler: LineAssembler = LineAssembler::default();
        let results = feed_all(&mut assembler, b"5:trainingMode\nA\r\n");

        assert_eq!(results.len(), 2);
        let first = results[0].clone().unwrap().unwrap();
        assert_eq!((first.code, first.payload.as_str()), (5, "trainingMode"));
        let second = results[1].clone().unwrap().unwrap();
        assert_eq!((second.code, second.payload.as_str()), (65, ""));
    }

    #[test]
    fn test_partial_line_waits() {
        let mut assembler: LineAssembler = LineAssembler::default();
        assert!(feed_all(&mut assembler, b"7:30").is_empty());
        assert_eq!(assembler.pending(), 4);

        let results = feed_all(&mut assembler, b"00\n");
        assert_eq!(results[0].clone().unwrap().unwrap().payload, "3000");
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_custom_eol() {
        let mut assembler: LineAssembler = LineAssembler::new(b';');
        let results = feed_all(&mut assembler, b"2:on;3:off;");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_overflow_discards_whole_line() {
        let mut assembler: LineAssembler<8> = LineAssembler::default();
        let results = feed_all(&mut assembler, b"1:way-too-long-line\n2:ok\n");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Err(LineError::Overflow));
        let ok = results[1].clone().unwrap().unwrap();
        assert_eq!((ok.code, ok.payload.as_str()), (2, "ok"));
    }

    #[test]
    fn test_exactly_full_line_fits() {
        let mut assembler: LineAssembler<4> = LineAssembler::default();
        let results = feed_all(&mut assembler, b"1:ab\n");
        assert_eq!(results[0].clone().unwrap().unwrap().payload, "ab");
    }

    #[test]
    fn test_invalid_utf8() {
        let mut assembler: LineAssembler = LineAssembler::default();
        let results = feed_all(&mut assembler, b"1:\xff\xfe\n3:x\n");
        assert_eq!(results[0], Err(LineError::InvalidUtf8));
        assert_eq!(results[1].clone().unwrap().unwrap().code, 3);
    }

    #[test]
    fn test_raw_mode() {
        let mut assembler: LineAssembler = LineAssembler::with_mode(b'\n', DecodeMode::Raw);
        let results = feed_all(&mut assembler, b"5:x\n");
        let cmd = results[0].clone().unwrap().unwrap();
        assert_eq!((cmd.code, cmd.payload.as_str()), (0, "5:x"));
    }

    #[test]
    fn test_empty_line_is_none() {
        let mut assembler: LineAssembler = LineAssembler::default();
        let results = feed_all(&mut assembler, b"\r\n");
        assert!(results[0].clone().unwrap().unwrap().is_none());
    }

    #[test]
    fn test_feed_bytes_stops_after_line() {
        let mut assembler: LineAssembler = LineAssembler::default();
        let (used, result) = assembler.feed_bytes(b"4:a\n5:b\n");
        assert_eq!(used, 4);
        assert_eq!(result.unwrap().unwrap().code, 4);
    }
}
