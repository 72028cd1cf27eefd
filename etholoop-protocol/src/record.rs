//! Outgoing data records
//!
//! Fields are appended one at a time during a trial and sent as a single
//! line: `field(sep field)*` followed by [`RECORD_TERMINATOR`].

use core::fmt::{self, Write};

use heapless::String;

/// Default record capacity in bytes
pub const MAX_RECORD_LEN: usize = 128;

/// Default field separator
pub const DEFAULT_SEPARATOR: u8 = b'\t';

/// Line ending written after every record
pub const RECORD_TERMINATOR: &[u8] = b"\r\n";

/// Errors while building a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Field does not fit; the record is left as it was
    Overflow,
}

/// Separator-joined fields awaiting transmission
#[derive(Debug, Clone)]
pub struct Record<const N: usize = MAX_RECORD_LEN> {
    line: String<N>,
    separator: char,
    fields: u16,
}

impl<const N: usize> Default for Record<N> {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl<const N: usize> Record<N> {
    /// Empty record joining fields with the ASCII byte `separator`
    ///
    /// A non-ASCII byte would go out as two UTF-8 bytes, so it is rejected in
    /// debug builds and replaced by [`DEFAULT_SEPARATOR`] otherwise.
    pub fn new(separator: u8) -> Self {
        debug_assert!(separator.is_ascii(), "record separator must be ASCII");
        let separator = if separator.is_ascii() {
            separator
        } else {
            DEFAULT_SEPARATOR
        };
        Self {
            line: String::new(),
            separator: char::from(separator),
            fields: 0,
        }
    }

    /// Append a text field
    pub fn append(&mut self, field: &str) -> Result<(), RecordError> {
        self.append_value(field)
    }

    /// Append any displayable value as a field
    ///
    /// Either the whole field (with its separator) is added or nothing is.
    pub fn append_value<T: fmt::Display + ?Sized>(&mut self, value: &T) -> Result<(), RecordError> {
        let mark = self.line.len();
        let written = if self.fields > 0 {
            write!(self.line, "{}{}", self.separator, value)
        } else {
            write!(self.line, "{}", value)
        };

        match written {
            Ok(()) => {
                self.fields = self.fields.saturating_add(1);
                Ok(())
            }
            Err(_) => {
                self.line.truncate(mark);
                Err(RecordError::Overflow)
            }
        }
    }

    /// Record text without terminator
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn field_count(&self) -> u16 {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    pub fn clear(&mut self) {
        self.line.clear();
        self.fields = 0;
    }
}
