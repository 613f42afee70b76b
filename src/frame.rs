use crate::config::{Config, DEFAULT_MAX_FRAME_LENGTH};
use crate::error::{Error, Result};
use crate::source::ByteSource;
use log::{trace, warn};
use scroll::{Pread, Pwrite, BE};

const LENGTH_FIELD_SIZE: usize = 2;

/// Frame layout after the magic sequence:
///
/// ```text
/// +--------------+-----------------------------------+
/// | LENGTH (2B)  | PAYLOAD (LENGTH bytes)            |
/// | big endian   | big endian u16 fields             |
/// +--------------+-----------------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDecoder {
    max_frame_length: u16,
    verify_checksum: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            verify_checksum: false,
        }
    }
}

impl From<&Config> for FrameDecoder {
    fn from(config: &Config) -> Self {
        Self {
            max_frame_length: config.max_frame_length,
            verify_checksum: config.verify_checksum,
        }
    }
}

impl FrameDecoder {
    pub fn max_frame_length(&self) -> u16 {
        self.max_frame_length
    }

    ///
    /// Reads the declared payload length
    ///
    pub fn decode_length<S: ByteSource>(&self, source: &mut S) -> Result<u16, S::Error> {
        let mut buffer = [0_u8; LENGTH_FIELD_SIZE];
        source.read_exact(&mut buffer)?;

        let length = u16::from_be_bytes(buffer);
        self.check_bounds::<S::Error>(length)?;
        Ok(length)
    }

    ///
    /// Reads `length` bytes and splits them into big endian fields.
    ///
    /// Odd or oversize lengths are rejected before anything is read.
    ///
    pub fn decode_payload<S: ByteSource>(
        &self,
        source: &mut S,
        length: u16,
    ) -> Result<Vec<u16>, S::Error> {
        if length % 2 != 0 {
            return Err(Error::MalformedFrame { length });
        }
        self.check_bounds::<S::Error>(length)?;

        let mut buffer = vec![0_u8; length as usize];
        source.read_exact(&mut buffer)?;
        trace!("payload: {}", hex_dump(&buffer));

        let mut fields = Vec::with_capacity(buffer.len() / 2);
        let mut offset = 0usize;
        while offset < buffer.len() {
            let field = buffer
                .gread_with::<u16>(&mut offset, BE)
                .map_err(|_| Error::MalformedFrame { length })?;
            fields.push(field);
        }

        Ok(fields)
    }

    ///
    /// Reads one frame, the stream must be positioned right after the magic sequence
    ///
    pub fn decode_frame<S: ByteSource>(
        &self,
        source: &mut S,
        magic: &[u8],
    ) -> Result<Vec<u16>, S::Error> {
        let length = self.decode_length(source)?;
        let fields = self.decode_payload(source, length)?;

        if self.verify_checksum {
            verify_checksum::<S::Error>(magic, length, &fields)?;
        }

        Ok(fields)
    }

    fn check_bounds<E: core::fmt::Debug>(&self, length: u16) -> Result<(), E> {
        if length > self.max_frame_length {
            return Err(Error::FrameTooLarge {
                length,
                max: self.max_frame_length,
            });
        }
        Ok(())
    }
}

///
/// Wrapping sum of every frame byte in front of the trailing check word
///
pub fn checksum(magic: &[u8], length: u16, fields: &[u16]) -> u16 {
    let summed = fields.len().saturating_sub(1);

    let header = magic
        .iter()
        .chain(length.to_be_bytes().iter())
        .fold(0u16, |sum, byte| sum.wrapping_add(*byte as u16));

    fields[..summed].iter().fold(header, |sum, field| {
        let [high, low] = field.to_be_bytes();
        sum.wrapping_add(high as u16).wrapping_add(low as u16)
    })
}

fn verify_checksum<E: core::fmt::Debug>(
    magic: &[u8],
    length: u16,
    fields: &[u16],
) -> Result<(), E> {
    let actual = match fields.last() {
        Some(check) => *check,
        None => return Err(Error::ShortFrame { fields: 0 }),
    };
    let expected = checksum(magic, length, fields);

    if expected != actual {
        warn!("checksum mismatch: expected {:#06x}, got {:#06x}", expected, actual);
        return Err(Error::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

///
/// Builds a complete wire frame carrying `fields`, at most `u16::MAX / 2` of them
///
pub fn encode_frame(magic: &[u8], fields: &[u16]) -> Vec<u8> {
    let length = fields.len() * 2;
    let mut buffer = vec![0_u8; magic.len() + LENGTH_FIELD_SIZE + length];
    buffer[..magic.len()].copy_from_slice(magic);

    let mut offset = magic.len();
    // buffer is sized for the header and every field
    buffer
        .gwrite_with::<u16>(length as u16, &mut offset, BE)
        .unwrap();
    for field in fields {
        buffer.gwrite_with::<u16>(*field, &mut offset, BE).unwrap();
    }

    buffer
}

pub(crate) fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAGIC;
    use std::collections::VecDeque;

    struct Bytes(VecDeque<u8>);

    impl Bytes {
        fn new(bytes: &[u8]) -> Self {
            Bytes(bytes.iter().copied().collect())
        }
    }

    impl ByteSource for Bytes {
        type Error = ();

        fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), ()> {
            if buffer.len() > self.0.len() {
                return Err(Error::ReadTimeout);
            }
            for byte in buffer.iter_mut() {
                *byte = self.0.pop_front().unwrap();
            }
            Ok(())
        }
    }

    // Real PMS7003 output frame, magic and length included
    const PMS7003_FRAME: [u8; 32] = [
        0x42, 0x4d, 0x0, 0x1c, 0x0, 0x5, 0x0, 0x7, 0x0, 0x7, 0x0, 0x5, 0x0, 0x7, 0x0, 0x7, 0x0,
        0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x97, 0x0, 0x1, 0x68,
    ];

    #[test]
    fn length_is_big_endian() {
        let mut bytes = Bytes::new(&[0x00, 0x1C]);

        assert_eq!(Ok(28), FrameDecoder::default().decode_length(&mut bytes));
    }

    #[test]
    fn length_above_bound_is_rejected() {
        let mut bytes = Bytes::new(&[0x01, 0x02]);

        assert_eq!(
            Err(Error::FrameTooLarge {
                length: 258,
                max: 256
            }),
            FrameDecoder::default().decode_length(&mut bytes)
        );
    }

    #[test]
    fn length_at_bound_is_accepted() {
        let mut bytes = Bytes::new(&[0x01, 0x00]);

        assert_eq!(Ok(256), FrameDecoder::default().decode_length(&mut bytes));
    }

    #[test]
    fn payload_is_split_into_big_endian_fields() {
        let mut bytes = Bytes::new(&[0x00, 0x01, 0x01, 0x00, 0xFF, 0xFF]);

        assert_eq!(
            Ok(vec![0x0001, 0x0100, 0xFFFF]),
            FrameDecoder::default().decode_payload(&mut bytes, 6)
        );
        assert!(bytes.0.is_empty());
    }

    #[test]
    fn odd_payload_length_is_malformed_whatever_the_content() {
        for fill in [0x00_u8, 0x42, 0xFF].iter() {
            let mut bytes = Bytes::new(&[*fill; 13]);

            assert_eq!(
                Err(Error::MalformedFrame { length: 13 }),
                FrameDecoder::default().decode_payload(&mut bytes, 13)
            );
        }
    }

    #[test]
    fn oversize_payload_is_rejected_before_reading() {
        let decoder = FrameDecoder::default();
        let mut bytes = Bytes::new(&[0x00; 4]);

        assert_eq!(
            Err(Error::FrameTooLarge {
                length: 1024,
                max: 256
            }),
            decoder.decode_payload(&mut bytes, 1024)
        );
        assert_eq!(4, bytes.0.len());
    }

    #[test]
    fn truncated_payload_times_out() {
        let mut bytes = Bytes::new(&[0x00, 0x01, 0x00]);

        assert_eq!(
            Err(Error::ReadTimeout),
            FrameDecoder::default().decode_payload(&mut bytes, 12)
        );
    }

    #[test]
    fn checksum_matches_real_sensor_frame() {
        let mut bytes = Bytes::new(&PMS7003_FRAME[2..]);
        let decoder = FrameDecoder {
            verify_checksum: true,
            ..FrameDecoder::default()
        };

        let fields = decoder.decode_frame(&mut bytes, &MAGIC).unwrap();

        assert_eq!(14, fields.len());
        assert_eq!(0x0168, checksum(&MAGIC, 28, &fields));
    }

    #[test]
    fn corrupted_frame_fails_checksum() {
        let mut frame = PMS7003_FRAME;
        frame[5] = 0x6;
        let mut bytes = Bytes::new(&frame[2..]);
        let decoder = FrameDecoder {
            verify_checksum: true,
            ..FrameDecoder::default()
        };

        assert_eq!(
            Err(Error::ChecksumMismatch {
                expected: 0x0169,
                actual: 0x0168
            }),
            decoder.decode_frame(&mut bytes, &MAGIC)
        );
    }

    #[test]
    fn checksum_is_ignored_unless_enabled() {
        let mut frame = PMS7003_FRAME;
        frame[31] = 0x00;
        let mut bytes = Bytes::new(&frame[2..]);

        assert!(FrameDecoder::default()
            .decode_frame(&mut bytes, &MAGIC)
            .is_ok());
    }

    #[test]
    fn encoded_frame_matches_wire_layout() {
        assert_eq!(
            vec![0x42, 0x4D, 0x00, 0x04, 0x12, 0x34, 0x00, 0x01],
            encode_frame(&MAGIC, &[0x1234, 0x0001])
        );
    }

    #[test]
    fn hex_dump_is_space_separated() {
        assert_eq!("42 4d 00 1c", hex_dump(&PMS7003_FRAME[..4]));
    }
}
