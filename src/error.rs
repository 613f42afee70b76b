use core::fmt::Debug;

/// Errors produced while reading frames from the sensor.
///
/// `E` is the error type of the underlying serial driver.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error<E: Debug> {
    /// No byte arrived before the read deadline expired
    #[error("read timeout")]
    ReadTimeout,

    /// Declared length cannot be split into 16-bit fields
    #[error("malformed frame: odd payload length {length}")]
    MalformedFrame { length: u16 },

    /// Payload holds fewer fields than a reading needs
    #[error("short frame: {fields} fields, at least 6 required")]
    ShortFrame { fields: usize },

    /// Declared length is above the configured bound
    #[error("frame too large ({length} bytes, max {max})")]
    FrameTooLarge { length: u16, max: u16 },

    #[error("checksum error: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// Scan guard exhausted without finding the start of a frame
    #[error("start of frame not found after {scanned} bytes")]
    MagicNotFound { scanned: usize },

    #[error("serial error: {0:?}")]
    Serial(E),
}

impl<E: Debug> Error<E> {
    /// Returns `true` if the caller can resynchronize and poll again.
    ///
    /// Only transport errors are left to the caller to judge.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Serial(_))
    }
}

pub type Result<T, E> = core::result::Result<T, Error<E>>;
