use crate::error::{Error, Result};
use core::fmt;
use log::debug;

/// Number of payload fields a reading is built from.
pub const READING_FIELDS: usize = 6;

///
/// One decoded sample, all concentrations in µg/m³
///
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// PM1.0, standard particle (CF=1)
    pub pm1_0_std: u16,
    pub pm2_5_std: u16,
    pub pm10_std: u16,
    /// PM1.0, atmospheric environment
    pub pm1_0_amp: u16,
    pub pm2_5_amp: u16,
    pub pm10_amp: u16,
    /// Payload fields following the six concentrations, in wire order
    pub extra: Vec<u16>,
}

impl Reading {
    ///
    /// Maps payload fields positionally. Needs at least [`READING_FIELDS`] fields.
    ///
    pub fn from_fields<E: fmt::Debug>(fields: &[u16]) -> Result<Self, E> {
        if fields.len() < READING_FIELDS {
            return Err(Error::ShortFrame {
                fields: fields.len(),
            });
        }

        let extra = fields[READING_FIELDS..].to_vec();
        if !extra.is_empty() {
            debug!("{} fields beyond the reading: {:?}", extra.len(), extra);
        }

        Ok(Self {
            pm1_0_std: fields[0],
            pm2_5_std: fields[1],
            pm10_std: fields[2],
            pm1_0_amp: fields[3],
            pm2_5_amp: fields[4],
            pm10_amp: fields[5],
            extra,
        })
    }

    ///
    /// Every payload field in wire order, the six concentrations followed by [`Reading::extra`]
    ///
    pub fn fields(&self) -> Vec<u16> {
        let mut fields = vec![
            self.pm1_0_std,
            self.pm2_5_std,
            self.pm10_std,
            self.pm1_0_amp,
            self.pm2_5_amp,
            self.pm10_amp,
        ];
        fields.extend_from_slice(&self.extra);
        fields
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Standard particle (CF=1):")?;
        writeln!(f, "PM1.0 {} µg/m³", self.pm1_0_std)?;
        writeln!(f, "PM2.5 {} µg/m³", self.pm2_5_std)?;
        writeln!(f, "PM10  {} µg/m³", self.pm10_std)?;
        writeln!(f, "Atmospheric environment:")?;
        writeln!(f, "PM1.0 {} µg/m³", self.pm1_0_amp)?;
        writeln!(f, "PM2.5 {} µg/m³", self.pm2_5_amp)?;
        writeln!(f, "PM10  {} µg/m³", self.pm10_amp)
    }
}
