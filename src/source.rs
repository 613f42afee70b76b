use crate::error::{Error, Result};
use core::fmt::Debug;
use embedded_hal::serial::Read;
use std::time::{Duration, Instant};

///
/// Blocking byte stream the frame decoder consumes
///
pub trait ByteSource {
    type Error: Debug;

    ///
    /// Fills the whole buffer. Fails with [`Error::ReadTimeout`] when any single byte
    /// does not arrive in time, never returns a partially filled buffer as success.
    ///
    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    type Error = T::Error;

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_exact(buffer)
    }
}

///
/// Turns a non-blocking embedded hal serial reader into a [`ByteSource`] with a per-byte deadline
///
pub struct SerialSource<Serial> {
    serial: Serial,
    timeout: Duration,
}

impl<Serial> SerialSource<Serial>
where
    Serial: Read<u8>,
    Serial::Error: Debug,
{
    pub fn new(serial: Serial, timeout: Duration) -> Self {
        Self { serial, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn get_mut(&mut self) -> &mut Serial {
        &mut self.serial
    }

    pub fn into_inner(self) -> Serial {
        self.serial
    }

    fn read_byte(&mut self) -> Result<u8, Serial::Error> {
        // timeouts too long to represent never expire
        let deadline = Instant::now().checked_add(self.timeout);

        loop {
            match self.serial.read() {
                Ok(byte) => return Ok(byte),
                Err(nb::Error::WouldBlock) => {
                    if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
                        return Err(Error::ReadTimeout);
                    }
                    std::thread::yield_now();
                }
                Err(nb::Error::Other(e)) => return Err(Error::Serial(e)),
            }
        }
    }
}

impl<Serial> ByteSource for SerialSource<Serial>
where
    Serial: Read<u8>,
    Serial::Error: Debug,
{
    type Error = Serial::Error;

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }
}
