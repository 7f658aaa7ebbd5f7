//! ### ID - Chip identification number (`0xD0`, 1 byte, R)
//!
//! Holds `0x55` on a BMP180 and `0x58` on a BMP280. Both chips answer on the same
//! address, so this is what decides which compensation engine applies.
#![doc(alias = "ID")]
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Identity value reported by the BMP180
pub const BMP180_CHIP_ID: u8 = 0x55;

/// Identity value reported by the BMP280
pub const BMP280_CHIP_ID: u8 = 0x58;

/// Marker struct for the ID (0xD0) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct ChipId;
impl Reg for ChipId { const ADDR: u8 = 0xD0; }

impl Readable for ChipId {
    type Out = ChipFamily;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(ChipFamily::from(b[0]))
    }
}

/// Barometer family as classified by the identity register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipFamily {
    Bmp180,
    Bmp280,
    Unknown(u8),
}

impl From<u8> for ChipFamily {
    fn from(id: u8) -> Self {
        match id {
            BMP180_CHIP_ID => ChipFamily::Bmp180,
            BMP280_CHIP_ID => ChipFamily::Bmp280,
            other => ChipFamily::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_id_decode() {
        assert_eq!(ChipFamily::Bmp180, ChipId::decode(&[0x55]).unwrap());
        assert_eq!(ChipFamily::Bmp280, ChipId::decode(&[0x58]).unwrap());
        assert_eq!(ChipFamily::Unknown(0x60), ChipId::decode(&[0x60]).unwrap());
    }
}
