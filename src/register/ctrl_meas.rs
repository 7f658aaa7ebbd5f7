//! ### CTRL_MEAS (`0xF4`, 1 byte, RW)
//!
//! Both barometers start conversions through this register, but the encoding differs:
//!
//! - BMP180: a measurement command, `0x2E` for temperature or `0x34 + (oss << 6)` for
//!   pressure. See [`Bmp180Control`].
//! - BMP280: oversampling for temperature and pressure plus the power mode.
//!   See [`Bmp280CtrlMeas`].
use crate::register::{InvalidRegisterField, Readable, Reg, UnexpectedValue, Writable};

/// Oversampling setting of the BMP180 pressure measurement.
///
/// Higher settings average more internal samples, which lowers noise and lengthens the
/// conversion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OversamplingSetting {
    UltraLowPower,
    #[default]
    Standard,
    HighResolution,
    UltraHighResolution,
}

impl OversamplingSetting {
    /// The 2-bit `oss` code, used both in the command and in the compensation math.
    pub fn code(self) -> u8 {
        match self {
            OversamplingSetting::UltraLowPower => 0,
            OversamplingSetting::Standard => 1,
            OversamplingSetting::HighResolution => 2,
            OversamplingSetting::UltraHighResolution => 3,
        }
    }

    /// Maximum pressure conversion time in milliseconds.
    pub fn wait_ms(self) -> u32 {
        match self {
            OversamplingSetting::UltraLowPower => 5,
            OversamplingSetting::Standard => 8,
            OversamplingSetting::HighResolution => 14,
            OversamplingSetting::UltraHighResolution => 26,
        }
    }
}

impl From<u8> for OversamplingSetting {
    /// Codes outside `0..=3` fall back to [`OversamplingSetting::Standard`].
    fn from(code: u8) -> Self {
        match code {
            0 => OversamplingSetting::UltraLowPower,
            1 => OversamplingSetting::Standard,
            2 => OversamplingSetting::HighResolution,
            3 => OversamplingSetting::UltraHighResolution,
            _ => OversamplingSetting::Standard,
        }
    }
}

/// Marker struct for the BMP180 view of CTRL_MEAS (0xF4)
///
/// - **Length:** 1 byte
/// - **Access:** Write
pub struct Bmp180Control;
impl Reg for Bmp180Control { const ADDR: u8 = 0xF4; }

/// Conversion commands understood by the BMP180
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeasurementCommand {
    Temperature,
    Pressure(OversamplingSetting),
}

impl Writable for Bmp180Control {
    type In = MeasurementCommand;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = match v {
            MeasurementCommand::Temperature => 0x2E,
            MeasurementCommand::Pressure(oss) => 0x34 + (oss.code() << 6),
        };
    }
}

/// Oversampling of a single BMP280 measurement channel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl TryFrom<u8> for Oversampling {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0b000 => Ok(Oversampling::Skipped),
            0b001 => Ok(Oversampling::X1),
            0b010 => Ok(Oversampling::X2),
            0b011 => Ok(Oversampling::X4),
            0b100 => Ok(Oversampling::X8),
            0b101..=0b111 => Ok(Oversampling::X16),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<Oversampling> for u8 {
    fn from(value: Oversampling) -> Self {
        match value {
            Oversampling::Skipped => 0b000,
            Oversampling::X1 => 0b001,
            Oversampling::X2 => 0b010,
            Oversampling::X4 => 0b011,
            Oversampling::X8 => 0b100,
            Oversampling::X16 => 0b101,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    Sleep,
    Forced,
    Normal,
}

impl TryFrom<u8> for PowerMode {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0b00 => Ok(PowerMode::Sleep),
            0b01 | 0b10 => Ok(PowerMode::Forced),
            0b11 => Ok(PowerMode::Normal),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<PowerMode> for u8 {
    fn from(value: PowerMode) -> Self {
        match value {
            PowerMode::Sleep => 0b00,
            PowerMode::Forced => 0b10,
            PowerMode::Normal => 0b11,
        }
    }
}

/// Marker struct for the BMP280 view of CTRL_MEAS (0xF4)
///
/// - **Length:** 1 byte
/// - **Access:** Read/Write
pub struct Bmp280CtrlMeas;
impl Reg for Bmp280CtrlMeas { const ADDR: u8 = 0xF4; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CtrlMeasCfg {
    pub osrs_t: Oversampling,
    pub osrs_p: Oversampling,
    pub mode: PowerMode,
}

impl Readable for Bmp280CtrlMeas {
    type Out = CtrlMeasCfg;

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CtrlMeasCfg {
            osrs_t: Oversampling::try_from(b[0] >> 5)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 5))?,
            osrs_p: Oversampling::try_from((b[0] >> 2) & 0b111)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 2))?,
            mode: PowerMode::try_from(b[0] & 0b11)
                .map_err(|e| InvalidRegisterField::new(Self::ADDR, e.0, 0))?,
        })
    }
}

impl Writable for Bmp280CtrlMeas {
    type In = CtrlMeasCfg;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let osrs_t: u8 = v.osrs_t.into();
        let osrs_p: u8 = v.osrs_p.into();
        let mode: u8 = v.mode.into();
        out[0] = (osrs_t << 5) | (osrs_p << 2) | mode;
    }
}
