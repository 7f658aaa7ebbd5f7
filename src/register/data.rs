//! Raw measurement registers.
//!
//! These return the uncompensated ADC codes. For most use cases the driver methods
//! (`read_temperature`, `read_pressure`, `measure`) are what you want, since they run
//! the compensation for you.
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker struct for the BMP180 temperature result, OUT_MSB/OUT_LSB (0xF6 - 0xF7)
///
/// - **Length:** 2 bytes
/// - **Access:** Read-only
pub struct Bmp180Temperature;
impl Reg for Bmp180Temperature { const ADDR: u8 = 0xF6; }

impl Readable for Bmp180Temperature {
    type Out = u16;
    const N: usize = 2;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Marker struct for the BMP180 pressure result, OUT_MSB/OUT_LSB/OUT_XLSB (0xF6 - 0xF8)
///
/// The value is returned unshifted. The number of valid bits depends on the oversampling
/// setting, so the driver shifts it right by `8 - oss`.
///
/// - **Length:** 3 bytes
/// - **Access:** Read-only
pub struct Bmp180Pressure;
impl Reg for Bmp180Pressure { const ADDR: u8 = 0xF6; }

impl Readable for Bmp180Pressure {
    type Out = u32;
    const N: usize = 3;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }
}

/// Marker struct for the BMP280 pressure result, press_msb/lsb/xlsb (0xF7 - 0xF9)
///
/// - **Length:** 3 bytes
/// - **Access:** Read-only
pub struct Bmp280Pressure;
impl Reg for Bmp280Pressure { const ADDR: u8 = 0xF7; }

impl Readable for Bmp280Pressure {
    type Out = u32;
    const N: usize = 3;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]) >> 4)
    }
}

/// Marker struct for the BMP280 temperature result, temp_msb/lsb/xlsb (0xFA - 0xFC)
///
/// - **Length:** 3 bytes
/// - **Access:** Read-only
pub struct Bmp280Temperature;
impl Reg for Bmp280Temperature { const ADDR: u8 = 0xFA; }

impl Readable for Bmp280Temperature {
    type Out = u32;
    const N: usize = 3;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]) >> 4)
    }
}
