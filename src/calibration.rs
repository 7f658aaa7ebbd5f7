//! Calibration coefficients and the fixed-point compensation algorithms.
//!
//! The arithmetic mirrors the reference integer implementations from the datasheets. The
//! BMP180 algorithm divides (truncating toward zero) while the BMP280 algorithm shifts
//! (rounding toward negative infinity); the two are not interchangeable for negative
//! intermediates. Products that can exceed 32 bits for out-of-range inputs wrap, as they
//! do on the 32-bit reference, instead of panicking.
//!
//! Pressure compensation depends on a term produced by the temperature compensation of
//! the same cycle ([`B5`] for the BMP180, [`TFine`] for the BMP280). It is returned by
//! `compensate_temperature` and must be handed to `compensate_pressure` explicitly.

use crate::error::SensorError;
use crate::register::calibration::{BMP180_CALIBRATION_LEN, BMP280_CALIBRATION_LEN};
use crate::register::ctrl_meas::OversamplingSetting;

/// A calibration word read back as `0x0000` or `0xFFFF`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CalibrationFault {
    /// Byte offset of the word within the calibration block
    pub offset: u8,
}

impl<BusError> From<CalibrationFault> for SensorError<BusError> {
    fn from(value: CalibrationFault) -> Self {
        SensorError::CalibrationFault(value.offset)
    }
}

/// A compensation step would have divided by zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DivideByZero;

impl<BusError> From<DivideByZero> for SensorError<BusError> {
    fn from(_: DivideByZero) -> Self {
        SensorError::DivideByZero
    }
}

/// Checks every aligned 16-bit word of a calibration block.
///
/// Erased or unreadable NVM reads back as all zeros or all ones, neither of which is a
/// valid coefficient.
pub fn check_coefficient_words(block: &[u8]) -> Result<(), CalibrationFault> {
    for (index, word) in block.chunks_exact(2).enumerate() {
        if word == [0x00, 0x00] || word == [0xFF, 0xFF] {
            let offset = (index * 2) as u8;
            error!("calibration word at offset {} reads {:#x}", offset, word[0]);
            return Err(CalibrationFault { offset });
        }
    }

    Ok(())
}

/// BMP180 temperature term required by the pressure compensation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct B5(pub i32);

/// BMP280 temperature term required by the pressure compensation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TFine(pub i32);

/// Compensated temperature together with the term the pressure compensation needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature<F> {
    /// Hundredths of a degree Celsius
    pub centi_celsius: i32,
    pub fine: F,
}

/// BMP180 factory calibration (datasheet section 3.4)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bmp180Calibration {
    ac1: i16,
    ac2: i16,
    ac3: i16,
    ac4: u16,
    ac5: u16,
    ac6: u16,
    b1: i16,
    b2: i16,
    mb: i16,
    mc: i16,
    md: i16,
}

impl Bmp180Calibration {
    /// Decodes the 22 byte EEPROM block (big-endian words starting at `0xAA`).
    pub fn from_nvm(b: &[u8; BMP180_CALIBRATION_LEN]) -> Result<Self, CalibrationFault> {
        check_coefficient_words(b)?;

        Ok(Self {
            ac1: i16::from_be_bytes([b[0], b[1]]),
            ac2: i16::from_be_bytes([b[2], b[3]]),
            ac3: i16::from_be_bytes([b[4], b[5]]),
            ac4: u16::from_be_bytes([b[6], b[7]]),
            ac5: u16::from_be_bytes([b[8], b[9]]),
            ac6: u16::from_be_bytes([b[10], b[11]]),
            b1: i16::from_be_bytes([b[12], b[13]]),
            b2: i16::from_be_bytes([b[14], b[15]]),
            mb: i16::from_be_bytes([b[16], b[17]]),
            mc: i16::from_be_bytes([b[18], b[19]]),
            md: i16::from_be_bytes([b[20], b[21]]),
        })
    }

    /// MB is part of the block but unused by the integer algorithm.
    pub fn mb(&self) -> i16 {
        self.mb
    }

    /// Converts the raw temperature code UT.
    ///
    /// The chip resolves 0.1 °C; the result is scaled to hundredths.
    pub fn compensate_temperature(&self, ut: u16) -> Result<Temperature<B5>, DivideByZero> {
        let x1 = (i32::from(ut) - i32::from(self.ac6)).wrapping_mul(i32::from(self.ac5)) / (1 << 15);
        let denominator = x1 + i32::from(self.md);
        if denominator == 0 {
            return Err(DivideByZero);
        }
        let x2 = (i32::from(self.mc) << 11) / denominator;
        let b5 = x1 + x2;
        let tenths = (b5 + 8) / (1 << 4);

        Ok(Temperature {
            centi_celsius: tenths * 10,
            fine: B5(b5),
        })
    }

    /// Converts the raw pressure code UP into Pa, using the `B5` of the temperature
    /// conversion that preceded it.
    pub fn compensate_pressure(
        &self,
        up: u32,
        oversampling: OversamplingSetting,
        b5: B5,
    ) -> Result<u32, DivideByZero> {
        let oss = oversampling.code();

        let b6 = b5.0.wrapping_sub(4000);
        let b6_squared = b6.wrapping_mul(b6) / (1 << 12);
        let x1 = i32::from(self.b2).wrapping_mul(b6_squared) / (1 << 11);
        let x2 = i32::from(self.ac2).wrapping_mul(b6) / (1 << 11);
        let x3 = x1.wrapping_add(x2);
        let b3 = (((i32::from(self.ac1) * 4).wrapping_add(x3) << oss).wrapping_add(2)) / 4;

        let x1 = i32::from(self.ac3).wrapping_mul(b6) / (1 << 13);
        let x2 = i32::from(self.b1).wrapping_mul(b6_squared) / (1 << 16);
        let x3 = x1.wrapping_add(x2).wrapping_add(2) / 4;
        let b4 = u32::from(self.ac4).wrapping_mul(x3.wrapping_add(32768) as u32) / (1 << 15);
        if b4 == 0 {
            return Err(DivideByZero);
        }

        let b7 = up.wrapping_sub(b3 as u32).wrapping_mul(50000 >> oss);
        let p = if b7 < 0x8000_0000 {
            b7.wrapping_mul(2) / b4
        } else {
            (b7 / b4).wrapping_mul(2)
        } as i32;

        let x1 = (p / (1 << 8)).wrapping_mul(p / (1 << 8));
        let x1 = x1.wrapping_mul(3038) / (1 << 16);
        let x2 = (-7357i32).wrapping_mul(p) / (1 << 16);
        let p = p.wrapping_add(x1.wrapping_add(x2).wrapping_add(3791) / (1 << 4));

        Ok(p as u32)
    }
}

/// BMP280 trimming parameters (datasheet section 3.11.2)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bmp280Calibration {
    t1: u16,
    t2: i16,
    t3: i16,
    p1: u16,
    p2: i16,
    p3: i16,
    p4: i16,
    p5: i16,
    p6: i16,
    p7: i16,
    p8: i16,
    p9: i16,
}

impl Bmp280Calibration {
    /// Decodes the 24 byte trimming block (little-endian words starting at `0x88`).
    pub fn from_nvm(b: &[u8; BMP280_CALIBRATION_LEN]) -> Result<Self, CalibrationFault> {
        check_coefficient_words(b)?;

        Ok(Self {
            t1: u16::from_le_bytes([b[0], b[1]]),
            t2: i16::from_le_bytes([b[2], b[3]]),
            t3: i16::from_le_bytes([b[4], b[5]]),
            p1: u16::from_le_bytes([b[6], b[7]]),
            p2: i16::from_le_bytes([b[8], b[9]]),
            p3: i16::from_le_bytes([b[10], b[11]]),
            p4: i16::from_le_bytes([b[12], b[13]]),
            p5: i16::from_le_bytes([b[14], b[15]]),
            p6: i16::from_le_bytes([b[16], b[17]]),
            p7: i16::from_le_bytes([b[18], b[19]]),
            p8: i16::from_le_bytes([b[20], b[21]]),
            p9: i16::from_le_bytes([b[22], b[23]]),
        })
    }

    /// Converts the 20-bit raw temperature code. The result is already in hundredths.
    pub fn compensate_temperature(&self, adc_t: u32) -> Temperature<TFine> {
        let adc_t = adc_t as i32;
        let t1 = i32::from(self.t1);

        let var1 = (((adc_t >> 3) - (t1 << 1)).wrapping_mul(i32::from(self.t2))) >> 11;
        let delta = (adc_t >> 4) - t1;
        let var2 = ((delta.wrapping_mul(delta) >> 12).wrapping_mul(i32::from(self.t3))) >> 14;
        let t_fine = var1.wrapping_add(var2);

        Temperature {
            centi_celsius: t_fine.wrapping_mul(5).wrapping_add(128) >> 8,
            fine: TFine(t_fine),
        }
    }

    /// Converts the 20-bit raw pressure code into Pa, using the `t_fine` of the
    /// temperature conversion from the same measurement.
    pub fn compensate_pressure(&self, adc_p: u32, t_fine: TFine) -> Result<u32, DivideByZero> {
        let mut var1 = (t_fine.0 >> 1) - 64000;
        let quarter_squared = (var1 >> 2).wrapping_mul(var1 >> 2);

        let mut var2 = (quarter_squared >> 11).wrapping_mul(i32::from(self.p6));
        var2 = var2.wrapping_add(var1.wrapping_mul(i32::from(self.p5)) << 1);
        var2 = (var2 >> 2).wrapping_add(i32::from(self.p4) << 16);

        var1 = ((i32::from(self.p3).wrapping_mul(quarter_squared >> 13) >> 3)
            .wrapping_add(i32::from(self.p2).wrapping_mul(var1) >> 1))
            >> 18;
        var1 = (32768 + var1).wrapping_mul(i32::from(self.p1)) >> 15;
        if var1 == 0 {
            return Err(DivideByZero);
        }

        let mut p = 1_048_576u32
            .wrapping_sub(adc_p)
            .wrapping_sub((var2 >> 12) as u32)
            .wrapping_mul(3125);
        p = if p < 0x8000_0000 {
            p.wrapping_shl(1) / var1 as u32
        } else {
            (p / var1 as u32).wrapping_mul(2)
        };

        let var1 = i32::from(self.p9).wrapping_mul(((p >> 3).wrapping_mul(p >> 3) >> 13) as i32) >> 12;
        let var2 = ((p >> 2) as i32).wrapping_mul(i32::from(self.p8)) >> 13;
        let correction = var1.wrapping_add(var2).wrapping_add(i32::from(self.p7)) >> 4;

        Ok((p as i32).wrapping_add(correction) as u32)
    }
}
