use crate::register::ctrl_meas::{Oversampling, OversamplingSetting};

/// Standard atmosphere at sea level, in Pa
pub const STANDARD_SEA_LEVEL_PRESSURE: u32 = 101_325;

/// What the barometer drivers do to the chip before reading its calibration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetPolicy {
    /// Write the soft reset command and let the chip settle for 2 ms.
    #[default]
    Soft,
    /// Leave the chip as it is.
    None,
}

/// Barometer configuration, shared by the BMP180 and BMP280 drivers.
///
/// Each driver only looks at the settings that apply to its chip.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) oversampling: OversamplingSetting,
    pub(crate) temperature_oversampling: Oversampling,
    pub(crate) pressure_oversampling: Oversampling,
    pub(crate) max_status_polls: u16,
    pub(crate) reset: ResetPolicy,
    pub(crate) sea_level_pressure: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            oversampling: OversamplingSetting::Standard,
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X4,
            max_status_polls: 50,
            reset: ResetPolicy::Soft,
            sea_level_pressure: STANDARD_SEA_LEVEL_PRESSURE,
        }
    }
}

impl Configuration {
    /// BMP180 pressure oversampling. Determines both the conversion wait and the number
    /// of valid bits in the raw pressure code.
    pub fn oversampling(mut self, oversampling: OversamplingSetting) -> Self {
        self.oversampling = oversampling;

        self
    }

    pub fn temperature_oversampling(mut self, temperature_oversampling: Oversampling) -> Self {
        self.temperature_oversampling = temperature_oversampling;

        self
    }

    /// BMP280 pressure oversampling.
    /// [`Oversampling::Skipped`] disables the pressure channel, in which case the data
    /// registers hold `0x80000` and the compensated pressure is meaningless.
    pub fn pressure_oversampling(mut self, pressure_oversampling: Oversampling) -> Self {
        self.pressure_oversampling = pressure_oversampling;

        self
    }

    /// Number of STATUS reads (1 ms apart) the BMP280 driver performs while waiting for a
    /// forced conversion, before giving up with [`SensorError::Timeout`](crate::SensorError::Timeout).
    /// STATUS is always read at least once, so `0` behaves like `1`.
    pub fn max_status_polls(mut self, max_status_polls: u16) -> Self {
        self.max_status_polls = max_status_polls;

        self
    }

    pub fn reset(mut self, reset: ResetPolicy) -> Self {
        self.reset = reset;

        self
    }

    /// Reference pressure in Pa used for altitude calculations.
    pub fn sea_level_pressure(mut self, sea_level_pressure: u32) -> Self {
        self.sea_level_pressure = sea_level_pressure;

        self
    }
}
