use embedded_hal_async::delay::DelayNs;

use crate::bus::{Bus, I2c};
use crate::calibration::{Bmp180Calibration, Temperature, B5};
use crate::config::Configuration;
use crate::error::SensorResult;
use crate::pressure::{identify, Measurement, ADDRESS};
use crate::register;
use crate::register::ctrl_meas::{Bmp180Control, MeasurementCommand, OversamplingSetting};
use crate::register::data;

/// Temperature conversion time
const TEMPERATURE_WAIT_MS: u32 = 5;

/// Type alias for a BMP180 communicating over I2C
pub type Bmp180I2c<T> = Bmp180<I2c<T>>;

/// Driver for the BMP180 barometer
///
/// The BMP180 has no status register worth polling. Every conversion is started with a
/// command and followed by a fixed wait that depends on the oversampling setting.
pub struct Bmp180<B> {
    bus: B,
    calibration: Bmp180Calibration,
    oversampling: OversamplingSetting,
    sea_level_pressure: u32,
}

impl<T> Bmp180I2c<T>
where
    T: embedded_hal_async::i2c::I2c,
{
    /// Constructs a new BMP180 driver that communicates over I2C
    ///
    /// This function will:
    /// - Perform a soft reset if the configuration asks for one
    /// - Read and log the identity register
    /// - Load and validate the calibration coefficients
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use embedded_hal_async::delay::DelayNs;
    /// # use embedded_hal_async::i2c::I2c;
    /// # use climate_beacon::SensorResult;
    /// use climate_beacon::bmp180::Bmp180;
    /// use climate_beacon::config::Configuration;
    /// use climate_beacon::register::ctrl_meas::OversamplingSetting;
    /// # async fn demo<I: I2c, D: DelayNs>(i2c: I, mut delay: D) -> SensorResult<(), I::Error> {
    ///
    /// let config = Configuration::default().oversampling(OversamplingSetting::HighResolution);
    /// let mut device = Bmp180::new_i2c(i2c, config, &mut delay).await?;
    /// let measurement = device.measure(&mut delay).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new_i2c<D: DelayNs>(
        i2c: T,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c), config, delay).await
    }
}

impl<B> Bmp180<B>
where
    B: Bus,
{
    /// Creates a new driver instance on an arbitrary [`Bus`].
    ///
    /// An identity other than `0x55` is logged but does not stop initialization.
    pub async fn new<D: DelayNs>(
        mut bus: B,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        identify(&mut bus, config.reset, delay).await?;

        Self::load(bus, config).await
    }

    /// Reads the calibration EEPROM. The identity has already been checked by the caller.
    pub(crate) async fn load(mut bus: B, config: Configuration) -> SensorResult<Self, B::Error> {
        let block = bus.read_typed::<register::calibration::Bmp180Calibration>(ADDRESS).await?;
        let calibration = Bmp180Calibration::from_nvm(&block)?;

        Ok(Bmp180 {
            bus,
            calibration,
            oversampling: config.oversampling,
            sea_level_pressure: config.sea_level_pressure,
        })
    }

    pub fn calibration(&self) -> &Bmp180Calibration {
        &self.calibration
    }

    pub fn oversampling(&self) -> OversamplingSetting {
        self.oversampling
    }

    pub fn sea_level_pressure(&self) -> u32 {
        self.sea_level_pressure
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// Starts a temperature conversion and returns the raw code UT.
    pub async fn read_raw_temperature<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<u16, B::Error> {
        self.bus
            .write_typed::<Bmp180Control>(ADDRESS, &MeasurementCommand::Temperature)
            .await?;
        delay.delay_ms(TEMPERATURE_WAIT_MS).await;

        self.bus.read_typed::<data::Bmp180Temperature>(ADDRESS).await
    }

    /// Starts a pressure conversion and returns the raw code UP.
    ///
    /// UP has `16 + oss` significant bits.
    pub async fn read_raw_pressure<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<u32, B::Error> {
        let oss = self.oversampling;
        self.bus
            .write_typed::<Bmp180Control>(ADDRESS, &MeasurementCommand::Pressure(oss))
            .await?;
        delay.delay_ms(oss.wait_ms()).await;

        let raw = self.bus.read_typed::<data::Bmp180Pressure>(ADDRESS).await?;

        Ok(raw >> (8 - oss.code()))
    }

    /// Measures temperature. The returned [`B5`] is needed by [`read_pressure`](Self::read_pressure).
    pub async fn read_temperature<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<Temperature<B5>, B::Error> {
        let ut = self.read_raw_temperature(delay).await?;

        Ok(self.calibration.compensate_temperature(ut)?)
    }

    /// Measures pressure in Pa, compensated with the `b5` of a preceding temperature reading.
    pub async fn read_pressure<D: DelayNs>(&mut self, b5: B5, delay: &mut D) -> SensorResult<u32, B::Error> {
        let up = self.read_raw_pressure(delay).await?;

        Ok(self.calibration.compensate_pressure(up, self.oversampling, b5)?)
    }

    /// Reads temperature, then pressure.
    pub async fn measure<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<Measurement, B::Error> {
        let temperature = self.read_temperature(delay).await?;
        let pressure = self.read_pressure(temperature.fine, delay).await?;

        Ok(Measurement {
            temperature: temperature.centi_celsius,
            pressure,
        })
    }
}
