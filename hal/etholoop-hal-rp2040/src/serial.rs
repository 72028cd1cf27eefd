//! UART link over an `embedded-io` byte stream
//!
//! Wraps the interrupt-driven buffered UART (or anything else implementing
//! the blocking `embedded-io` traits). Reads check `read_ready` first, so a
//! poll never waits for the host.

use embedded_io::{Read, ReadReady, Write};

use etholoop_hal::{UartRx, UartTx};

pub struct IoSerial<T> {
    io: T,
}

impl<T> IoSerial<T> {
    pub fn new(io: T) -> Self {
        Self { io }
    }

    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: Read + ReadReady> UartRx for IoSerial<T> {
    type Error = T::Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.io.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.io.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl<T: Write> UartTx for IoSerial<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.io.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.io.flush()
    }
}
