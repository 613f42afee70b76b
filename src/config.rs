use std::time::Duration;

/// Start-of-frame marker sent by Plantower sensors ("BM").
pub const MAGIC: [u8; 2] = [0x42, 0x4D];

/// Default per-byte read deadline.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest payload length accepted by default. Real sensors send 20 or 28.
pub const DEFAULT_MAX_FRAME_LENGTH: u16 = 256;

/// Line speed used by every Plantower PMS model.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

///
/// Protocol settings used by [`crate::PmSensor`]
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub magic: &'static [u8],
    pub read_timeout: Duration,
    pub max_frame_length: u16,
    /// Noise bytes to discard before giving up on a frame, `None` scans forever
    pub max_scan: Option<usize>,
    pub verify_checksum: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            magic: &MAGIC,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            max_scan: None,
            verify_checksum: false,
        }
    }
}

impl Config {
    pub fn with_magic(mut self, magic: &'static [u8]) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_max_frame_length(mut self, max: u16) -> Self {
        self.max_frame_length = max;
        self
    }

    pub fn with_max_scan(mut self, max_scan: Option<usize>) -> Self {
        self.max_scan = max_scan;
        self
    }

    ///
    /// Check the trailing checksum word of every frame. Only enable when the sensor
    /// model sends one (PMS5003, PMS7003 and friends do).
    ///
    pub fn with_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }
}
