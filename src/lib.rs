//! Async drivers and telemetry encoding for a small BTHome climate beacon.
//!
//! The crate talks to three I2C peripherals through [`embedded-hal-async`]:
//!
//! - the **AM2320** humidity/temperature sensor, which uses a Modbus-like framed
//!   read protocol guarded by a CRC-16/MODBUS checksum ([`am2320`]),
//! - the **BMP180** barometer ([`bmp180`]),
//! - the **BMP280** barometer ([`bmp280`]).
//!
//! Both barometers live on address `0x77` and are told apart by their identity
//! register, see [`pressure::PressureSensor`]. Compensated readings are packed into a
//! 16 byte BTHome v2 service data payload by [`frame::TelemetryFrame`], and
//! [`station::Station`] ties one acquisition cycle together.
//!
//! The broadcast transport and the polling loop are left to the application.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use embedded_hal_async::delay::DelayNs;
//! # use embedded_hal_async::i2c::I2c;
//! use climate_beacon::{Station, SensorResult};
//! use climate_beacon::am2320::Am2320;
//! use climate_beacon::bus;
//! use climate_beacon::config::Configuration;
//! use climate_beacon::pressure::PressureSensor;
//!
//! # async fn demo<I: I2c, D: DelayNs>(combo_i2c: I, baro_i2c: I, mut delay: D) -> SensorResult<(), I::Error> {
//! let combo = Am2320::new(bus::I2c::new(combo_i2c));
//! let baro = PressureSensor::detect(bus::I2c::new(baro_i2c), Configuration::default(), &mut delay).await?;
//! let mut station = Station::new(combo, baro, delay);
//!
//! loop {
//!     let report = station.acquire().await;
//!     if report.is_complete() {
//!         // hand station.frame().as_bytes() to the advertiser
//!     }
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`embedded-hal-async`]: https://docs.rs/embedded-hal-async
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[macro_use]
mod fmt;

pub mod am2320;
pub mod bmp180;
pub mod bmp280;
pub mod bus;
pub mod calibration;
pub mod config;
pub mod error;
pub mod frame;
pub mod pressure;
pub mod register;
pub mod station;

#[cfg(test)]
mod testing;

pub use error::{SensorError, SensorResult};
pub use frame::TelemetryFrame;
pub use pressure::{Measurement, PressureSensor};
pub use station::{CycleReport, Station};
