use embedded_hal_async::delay::DelayNs;

use crate::bus::{Bus, I2c};
use crate::calibration::{Bmp280Calibration, TFine, Temperature};
use crate::config::Configuration;
use crate::error::{SensorError, SensorResult};
use crate::pressure::{identify, Measurement, ADDRESS};
use crate::register;
use crate::register::ctrl_meas::{Bmp280CtrlMeas, CtrlMeasCfg, PowerMode};
use crate::register::data;
use crate::register::status::Status;

/// Delay between two STATUS reads
const POLL_INTERVAL_MS: u32 = 1;

/// Type alias for a BMP280 communicating over I2C
pub type Bmp280I2c<T> = Bmp280<I2c<T>>;

/// Driver for the BMP280 barometer
///
/// The chip is operated in forced mode: every reading writes CTRL_MEAS, which starts one
/// temperature and pressure conversion, then polls STATUS until it is done.
pub struct Bmp280<B> {
    bus: B,
    calibration: Bmp280Calibration,
    ctrl_meas: CtrlMeasCfg,
    max_status_polls: u16,
    sea_level_pressure: u32,
}

impl<T> Bmp280I2c<T>
where
    T: embedded_hal_async::i2c::I2c,
{
    /// Constructs a new BMP280 driver that communicates over I2C
    ///
    /// This function will:
    /// - Perform a soft reset if the configuration asks for one
    /// - Read and log the identity register
    /// - Wait for the NVM copy to finish and load the trimming parameters
    pub async fn new_i2c<D: DelayNs>(
        i2c: T,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, T::Error> {
        Self::new(I2c::new(i2c), config, delay).await
    }
}

impl<B> Bmp280<B>
where
    B: Bus,
{
    /// Creates a new driver instance on an arbitrary [`Bus`].
    ///
    /// An identity other than `0x58` is logged but does not stop initialization.
    pub async fn new<D: DelayNs>(
        mut bus: B,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        identify(&mut bus, config.reset, delay).await?;

        Self::load(bus, config, delay).await
    }

    pub(crate) async fn load<D: DelayNs>(
        mut bus: B,
        config: Configuration,
        delay: &mut D,
    ) -> SensorResult<Self, B::Error> {
        // After a reset the trimming parameters are copied into the image registers first
        wait_until(&mut bus, delay, config.max_status_polls, |status| !status.im_update()).await?;

        let block = bus.read_typed::<register::calibration::Bmp280Calibration>(ADDRESS).await?;
        let calibration = Bmp280Calibration::from_nvm(&block)?;

        Ok(Bmp280 {
            bus,
            calibration,
            ctrl_meas: CtrlMeasCfg {
                osrs_t: config.temperature_oversampling,
                osrs_p: config.pressure_oversampling,
                mode: PowerMode::Forced,
            },
            max_status_polls: config.max_status_polls,
            sea_level_pressure: config.sea_level_pressure,
        })
    }

    pub fn calibration(&self) -> &Bmp280Calibration {
        &self.calibration
    }

    pub fn sea_level_pressure(&self) -> u32 {
        self.sea_level_pressure
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// Reads back CTRL_MEAS (0xF4).
    pub async fn ctrl_meas(&mut self) -> SensorResult<CtrlMeasCfg, B::Error> {
        self.bus.read_typed::<Bmp280CtrlMeas>(ADDRESS).await
    }

    /// Starts a forced conversion and waits for it to finish.
    async fn convert<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<(), B::Error> {
        self.bus.write_typed::<Bmp280CtrlMeas>(ADDRESS, &self.ctrl_meas).await?;

        wait_until(&mut self.bus, delay, self.max_status_polls, |status| !status.measuring()).await
    }

    /// Runs a conversion and returns the temperature together with its `t_fine`.
    pub async fn read_temperature<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<Temperature<TFine>, B::Error> {
        self.convert(delay).await?;
        let adc_t = self.bus.read_typed::<data::Bmp280Temperature>(ADDRESS).await?;

        Ok(self.calibration.compensate_temperature(adc_t))
    }

    /// Measures pressure in Pa.
    ///
    /// A fresh temperature reading is taken first, so `t_fine` always belongs to the same
    /// conversion as the pressure code.
    pub async fn read_pressure<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<u32, B::Error> {
        Ok(self.measure(delay).await?.pressure)
    }

    /// Reads temperature and pressure from a single forced conversion.
    pub async fn measure<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<Measurement, B::Error> {
        let temperature = self.read_temperature(delay).await?;
        let adc_p = self.bus.read_typed::<data::Bmp280Pressure>(ADDRESS).await?;
        let pressure = self.calibration.compensate_pressure(adc_p, temperature.fine)?;

        Ok(Measurement {
            temperature: temperature.centi_celsius,
            pressure,
        })
    }
}

/// Polls STATUS until `done` holds, at most `max_polls` times (never fewer than once)
/// with 1 ms in between.
async fn wait_until<B: Bus, D: DelayNs>(
    bus: &mut B,
    delay: &mut D,
    max_polls: u16,
    done: impl Fn(&register::status::StatusFlags) -> bool,
) -> SensorResult<(), B::Error> {
    for _ in 0..max_polls.max(1) {
        if done(&bus.read_typed::<Status>(ADDRESS).await?) {
            return Ok(());
        }

        delay.delay_ms(POLL_INTERVAL_MS).await;
    }

    warn!("bmp280 status still busy after {} polls", max_polls);
    Err(SensorError::Timeout)
}
