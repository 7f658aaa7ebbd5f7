//! Factory calibration blocks.
//!
//! Both blocks are returned as raw bytes. Validation and decoding into coefficients
//! happen in [`crate::calibration`], since a corrupt block is reported as
//! [`SensorError::CalibrationFault`](crate::SensorError::CalibrationFault) rather than
//! as an invalid register field.
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Size of the BMP180 calibration block, 11 big-endian words
pub const BMP180_CALIBRATION_LEN: usize = 22;

/// Size of the BMP280 calibration block, 12 little-endian words
pub const BMP280_CALIBRATION_LEN: usize = 24;

/// Marker struct for the BMP180 calibration EEPROM (0xAA - 0xBF)
///
/// - **Length:** 22 bytes
/// - **Access:** Read-only
pub struct Bmp180Calibration;
impl Reg for Bmp180Calibration { const ADDR: u8 = 0xAA; }

impl Readable for Bmp180Calibration {
    type Out = [u8; BMP180_CALIBRATION_LEN];
    const N: usize = BMP180_CALIBRATION_LEN;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut block = [0u8; BMP180_CALIBRATION_LEN];
        block.copy_from_slice(&b[..BMP180_CALIBRATION_LEN]);

        Ok(block)
    }
}

/// Marker struct for the BMP280 trimming parameters (0x88 - 0x9F)
///
/// - **Length:** 24 bytes
/// - **Access:** Read-only
pub struct Bmp280Calibration;
impl Reg for Bmp280Calibration { const ADDR: u8 = 0x88; }

impl Readable for Bmp280Calibration {
    type Out = [u8; BMP280_CALIBRATION_LEN];
    const N: usize = BMP280_CALIBRATION_LEN;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut block = [0u8; BMP280_CALIBRATION_LEN];
        block.copy_from_slice(&b[..BMP280_CALIBRATION_LEN]);

        Ok(block)
    }
}
