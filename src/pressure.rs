//! Barometer auto-detection.
//!
//! The BMP180 and BMP280 answer on the same address and are told apart by their
//! identity register. [`PressureSensor::detect`] reads it once and builds the matching
//! driver.

use embedded_hal::i2c::SevenBitAddress;
use embedded_hal_async::delay::DelayNs;

use crate::bmp180::Bmp180;
use crate::bmp280::Bmp280;
use crate::bus::{Bus, I2c};
use crate::config::{Configuration, ResetPolicy};
use crate::error::{SensorError, SensorResult};
use crate::register::chip_id::{ChipFamily, ChipId};
use crate::register::reset::{ResetCommand, SoftReset};

/// I2C address shared by the BMP180 and BMP280
pub const ADDRESS: SevenBitAddress = 0x77;

/// Time the chip needs to come back after a soft reset
const RESET_SETTLE_MS: u32 = 2;

/// A compensated barometer reading
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Hundredths of a degree Celsius
    pub temperature: i32,
    /// Pa, which is the same as hundredths of a hPa
    pub pressure: u32,
}

impl Measurement {
    /// Altitude in metres above the level where the pressure equals `sea_level_pressure` (Pa),
    /// using the international barometric formula.
    pub fn altitude_m(&self, sea_level_pressure: u32) -> f32 {
        let ratio = self.pressure as f32 / sea_level_pressure as f32;

        44330.0 * (1.0 - libm::powf(ratio, 1.0 / 5.255))
    }
}

/// Optionally resets the barometer, then reads and logs its identity.
///
/// An unknown identity is not an error at this point; the caller decides what to do with it.
pub(crate) async fn identify<B: Bus, D: DelayNs>(
    bus: &mut B,
    reset: ResetPolicy,
    delay: &mut D,
) -> SensorResult<ChipFamily, B::Error> {
    if reset == ResetPolicy::Soft {
        bus.write_typed::<SoftReset>(ADDRESS, &ResetCommand::PowerOnReset).await?;
        delay.delay_ms(RESET_SETTLE_MS).await;
    }

    let family = bus.read_typed::<ChipId>(ADDRESS).await?;
    match family {
        ChipFamily::Bmp180 => info!("barometer identified as BMP180"),
        ChipFamily::Bmp280 => info!("barometer identified as BMP280"),
        ChipFamily::Unknown(id) => warn!("unknown barometer identity {:#x}", id),
    }

    Ok(family)
}

/// Either barometer behind one interface
pub enum PressureSensor<B> {
    Bmp180(Bmp180<B>),
    Bmp280(Bmp280<B>),
}

impl<T> PressureSensor<I2c<T>>
where
    T: embedded_hal_async::i2c::I2c,
{
    pub async fn detect_i2c<D: DelayNs>(
        i2c: T,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, T::Error> {
        Self::detect(I2c::new(i2c), config, delay).await
    }
}

impl<B> PressureSensor<B>
where
    B: Bus,
{
    /// Identifies the barometer at [`ADDRESS`] and loads its calibration.
    ///
    /// Returns [`SensorError::UnsupportedChip`] when the identity matches neither family.
    pub async fn detect<D: DelayNs>(
        mut bus: B,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        match identify(&mut bus, config.reset, delay).await? {
            ChipFamily::Bmp180 => Ok(PressureSensor::Bmp180(Bmp180::load(bus, config).await?)),
            ChipFamily::Bmp280 => Ok(PressureSensor::Bmp280(Bmp280::load(bus, config, delay).await?)),
            ChipFamily::Unknown(id) => Err(SensorError::UnsupportedChip(id)),
        }
    }

    pub fn family(&self) -> ChipFamily {
        match self {
            PressureSensor::Bmp180(_) => ChipFamily::Bmp180,
            PressureSensor::Bmp280(_) => ChipFamily::Bmp280,
        }
    }

    /// Runs a temperature conversion followed by a pressure conversion.
    pub async fn measure<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<Measurement, B::Error> {
        match self {
            PressureSensor::Bmp180(sensor) => sensor.measure(delay).await,
            PressureSensor::Bmp280(sensor) => sensor.measure(delay).await,
        }
    }

    /// Reference pressure from the configuration, for [`Measurement::altitude_m`].
    pub fn sea_level_pressure(&self) -> u32 {
        match self {
            PressureSensor::Bmp180(sensor) => sensor.sea_level_pressure(),
            PressureSensor::Bmp280(sensor) => sensor.sea_level_pressure(),
        }
    }

    pub fn release(self) -> B {
        match self {
            PressureSensor::Bmp180(sensor) => sensor.release(),
            PressureSensor::Bmp280(sensor) => sensor.release(),
        }
    }
}
