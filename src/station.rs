//! One acquisition cycle: barometer, then AM2320, then the telemetry frame.

use embedded_hal_async::delay::DelayNs;

use crate::am2320::{Am2320, ERROR_SENTINEL};
use crate::bus::Bus;
use crate::error::SensorResult;
use crate::frame::{TelemetryFrame, TelemetryValues};
use crate::pressure::{Measurement, PressureSensor};

/// Outcome of every reading taken during one [`Station::acquire`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport<ComboError, BaroError> {
    pub barometer: SensorResult<Measurement, BaroError>,
    /// AM2320 temperature in hundredths of a degree Celsius
    pub temperature: SensorResult<i32, ComboError>,
    /// AM2320 humidity in hundredths of a percent
    pub humidity: SensorResult<i32, ComboError>,
}

impl<ComboError, BaroError> CycleReport<ComboError, BaroError> {
    /// True when no channel fell back to the error sentinel.
    pub fn is_complete(&self) -> bool {
        self.barometer.is_ok() && self.temperature.is_ok() && self.humidity.is_ok()
    }

    /// The values as written into the frame.
    pub fn values(&self) -> TelemetryValues {
        let barometer = self.barometer.as_ref().ok();

        TelemetryValues {
            temperature: barometer.map_or(ERROR_SENTINEL, |m| m.temperature),
            pressure: barometer.map_or(ERROR_SENTINEL, |m| m.pressure as i32),
            temperature2: *self.temperature.as_ref().unwrap_or(&ERROR_SENTINEL),
            humidity: *self.humidity.as_ref().unwrap_or(&ERROR_SENTINEL),
        }
    }
}

/// Owns both sensors, the delay provider and the frame the readings end up in.
pub struct Station<C, P, D> {
    combo: Am2320<C>,
    barometer: PressureSensor<P>,
    delay: D,
    frame: TelemetryFrame,
}

impl<C, P, D> Station<C, P, D>
where
    C: Bus,
    P: Bus,
    D: DelayNs,
{
    pub fn new(combo: Am2320<C>, barometer: PressureSensor<P>, delay: D) -> Self {
        Self {
            combo,
            barometer,
            delay,
            frame: TelemetryFrame::new(),
        }
    }

    /// Takes every reading once and updates the frame.
    ///
    /// A failed reading does not stop the cycle. Its channel carries the error sentinel
    /// in the frame, and the error itself is in the returned report.
    pub async fn acquire(&mut self) -> CycleReport<C::Error, P::Error> {
        let barometer = self.barometer.measure(&mut self.delay).await;
        let temperature = self.combo.read_temperature(&mut self.delay).await;
        let humidity = self.combo.read_humidity(&mut self.delay).await;

        let report = CycleReport { barometer, temperature, humidity };
        let values = report.values();

        debug!("temperature   : {}", values.temperature);
        debug!("pressure      : {}", values.pressure);
        debug!("temperature 2 : {}", values.temperature2);
        debug!("humidity      : {}", values.humidity);
        if let Ok(measurement) = &report.barometer {
            debug!("altitude      : {}", measurement.altitude_m(self.barometer.sea_level_pressure()));
        }

        self.frame.encode(&values);

        report
    }

    /// The frame as of the last [`acquire`](Self::acquire), ready to be advertised.
    pub fn frame(&self) -> &TelemetryFrame {
        &self.frame
    }

    pub fn release(self) -> (Am2320<C>, PressureSensor<P>, D) {
        (self.combo, self.barometer, self.delay)
    }
}
