//! Decoder for the UART output of Plantower particulate matter sensors.
//!
//! The sensor streams frames of the form `0x42 0x4D | LENGTH (BE u16) | PAYLOAD`, where the payload
//! is a sequence of big endian `u16` fields. The first six fields are PM1.0, PM2.5 and PM10
//! concentrations, first under standard particle conditions and then in the atmospheric
//! environment.
//!
//! ```
//! use pms_uart::{encode_frame, ByteSource, Config, Error, PmSensor, MAGIC};
//!
//! struct Replay(Vec<u8>);
//!
//! impl ByteSource for Replay {
//!     type Error = ();
//!
//!     fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Error<()>> {
//!         if buffer.len() > self.0.len() {
//!             return Err(Error::ReadTimeout);
//!         }
//!         let rest = self.0.split_off(buffer.len());
//!         buffer.copy_from_slice(&self.0);
//!         self.0 = rest;
//!         Ok(())
//!     }
//! }
//!
//! let mut sensor = PmSensor::new(Replay(encode_frame(&MAGIC, &[1, 2, 3, 4, 5, 6])), Config::default());
//! let reading = sensor.read().unwrap();
//! assert_eq!(2, reading.pm2_5_std);
//! assert_eq!(Err(Error::ReadTimeout), sensor.read());
//! ```

use embedded_hal::serial::Read;
use log::debug;

mod config;
mod error;
mod frame;
mod reading;
mod reset;
mod source;
mod sync;

pub use config::{Config, DEFAULT_BAUD_RATE, DEFAULT_MAX_FRAME_LENGTH, DEFAULT_READ_TIMEOUT, MAGIC};
pub use error::{Error, Result};
pub use frame::{checksum, encode_frame, FrameDecoder};
pub use reading::{Reading, READING_FIELDS};
pub use reset::{PinReset, Reset, RESET_SETTLE_MS};
pub use source::{ByteSource, SerialSource};
pub use sync::sync;

pub struct PmSensor<Source>
where
    Source: ByteSource,
{
    source: Source,
    config: Config,
    decoder: FrameDecoder,
}

impl<Source> PmSensor<Source>
where
    Source: ByteSource,
{
    ///
    /// Creates a new sensor instance reading from any byte source
    ///
    pub fn new(source: Source, config: Config) -> Self {
        Self {
            decoder: FrameDecoder::from(&config),
            source,
            config,
        }
    }

    ///
    /// Reads a single sample. Blocks until a frame arrives or a read times out.
    ///
    /// Any error invalidates the frame in progress, the next call starts over by searching for
    /// the start of a frame.
    ///
    pub fn read(&mut self) -> Result<Reading, Source::Error> {
        let fields = self.read_frame()?;
        Reading::from_fields(&fields)
    }

    ///
    /// Reads one frame and returns all of its payload fields
    ///
    pub fn read_frame(&mut self) -> Result<Vec<u16>, Source::Error> {
        let discarded = sync(&mut self.source, self.config.magic, self.config.max_scan)?;
        if discarded > 0 {
            debug!("discarded {} bytes before start of frame", discarded);
        }

        self.decoder.decode_frame(&mut self.source, self.config.magic)
    }

    ///
    /// Power-cycles the sensor through `reset`, the next read resynchronizes on the new stream
    ///
    pub fn reset_with<R: Reset>(&mut self, reset: &mut R) -> core::result::Result<(), R::Error> {
        debug!("resetting sensor");
        reset.reset()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_mut(&mut self) -> &mut Source {
        &mut self.source
    }

    pub fn into_inner(self) -> Source {
        self.source
    }
}

impl<Serial> PmSensor<SerialSource<Serial>>
where
    Serial: Read<u8>,
    Serial::Error: core::fmt::Debug,
{
    ///
    /// Creates a new sensor instance using a single object implementing embedded hal serial traits
    ///
    pub fn from_serial(serial: Serial, config: Config) -> Self {
        Self::new(SerialSource::new(serial, config.read_timeout), config)
    }
}
