//! AM2320 temperature and humidity sensor.
//!
//! The AM2320 does not expose a plain register file over I2C. It sleeps between reads
//! and answers a Modbus-like request frame:
//!
//! ```text
//! wake     write [0x00]                     (NACKed while the sensor is asleep)
//!          wait 10 ms
//! request  write [0x03, register, 0x02]     (function code, start register, count)
//!          wait 2 ms
//! response read  [0x03, 0x02, hi, lo, crc_lo, crc_hi]
//! ```
//!
//! The response is validated before its payload is used: function code, length and a
//! CRC-16/MODBUS over the first four bytes.

use embedded_hal::i2c::SevenBitAddress;
use embedded_hal_async::delay::DelayNs;

use crate::bus::{Bus, I2c};
use crate::error::{SensorError, SensorResult};

/// Fixed I2C address of the AM2320
pub const ADDRESS: SevenBitAddress = 0x5C;

/// Humidity high byte, followed by the low byte at `0x01`
pub const HUMIDITY_REGISTER: u8 = 0x00;

/// Temperature high byte, followed by the low byte at `0x03`
pub const TEMPERATURE_REGISTER: u8 = 0x02;

/// Value written into the telemetry frame in place of a failed reading.
///
/// Only used at the frame boundary; the driver itself reports failures as errors.
pub const ERROR_SENTINEL: i32 = -1000;

/// Modbus "read registers" function code
const READ_REGISTERS: u8 = 0x03;

/// Number of registers requested per read
const REGISTER_COUNT: u8 = 0x02;

const RESPONSE_LEN: usize = 6;

const WAKE_DELAY_MS: u32 = 10;
const RESPONSE_DELAY_MS: u32 = 2;

const MODBUS: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_MODBUS);

/// CRC-16/MODBUS (reflected polynomial `0xA001`, initial value `0xFFFF`).
pub fn checksum(bytes: &[u8]) -> u16 {
    MODBUS.checksum(bytes)
}

/// Converts a raw temperature word into hundredths of a degree Celsius.
///
/// The sensor uses sign-magnitude: bit 15 is the sign, the low 15 bits are tenths of a degree.
pub fn decode_temperature(raw: u16) -> i32 {
    let tenths = i32::from(raw & 0x7FFF);
    if raw & 0x8000 != 0 {
        -tenths * 10
    } else {
        tenths * 10
    }
}

/// Converts a raw humidity word (tenths of a percent) into hundredths of a percent.
pub fn decode_humidity(raw: u16) -> i32 {
    i32::from(raw) * 10
}

/// Checks a response frame and extracts its payload.
fn validate<E>(response: &[u8; RESPONSE_LEN]) -> SensorResult<u16, E> {
    let [function_code, length, hi, lo, crc_lo, crc_hi] = *response;

    if function_code != READ_REGISTERS || length != REGISTER_COUNT {
        warn!("am2320 responded with function {:#x}, length {}", function_code, length);
        return Err(SensorError::ProtocolMismatch { function_code, length });
    }

    let received = u16::from_le_bytes([crc_lo, crc_hi]);
    let computed = checksum(&response[..4]);
    if received != computed {
        warn!("am2320 checksum {:#x} does not match computed {:#x}", received, computed);
        return Err(SensorError::ChecksumMismatch { received, computed });
    }

    Ok(u16::from_be_bytes([hi, lo]))
}

/// Driver for the AM2320
pub struct Am2320<B> {
    bus: B,
}

impl<T> Am2320<I2c<T>>
where
    T: embedded_hal_async::i2c::I2c,
{
    /// Creates a driver talking over the given I2C bus.
    pub fn new_i2c(i2c: T) -> Self {
        Self::new(I2c::new(i2c))
    }
}

impl<B> Am2320<B>
where
    B: Bus,
{
    /// No bus traffic happens here; the sensor is woken up on every read.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// Performs one complete wake, request and response exchange for the register pair
    /// starting at `register`.
    ///
    /// A NACK on the wake write is expected from a sleeping sensor and is ignored. Any
    /// failure after that aborts the read.
    pub async fn read_register16<D: DelayNs>(
        &mut self,
        register: u8,
        delay: &mut D,
    ) -> SensorResult<u16, B::Error> {
        if self.bus.write(ADDRESS, &[0x00]).await.is_err() {
            trace!("am2320 wake write not acknowledged");
        }
        delay.delay_ms(WAKE_DELAY_MS).await;

        self.bus
            .write(ADDRESS, &[READ_REGISTERS, register, REGISTER_COUNT])
            .await
            .map_err(SensorError::Bus)?;
        delay.delay_ms(RESPONSE_DELAY_MS).await;

        let mut response = [0u8; RESPONSE_LEN];
        self.bus
            .read(ADDRESS, &mut response)
            .await
            .map_err(SensorError::Bus)?;

        validate(&response)
    }

    /// Temperature in hundredths of a degree Celsius.
    pub async fn read_temperature<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<i32, B::Error> {
        let raw = self.read_register16(TEMPERATURE_REGISTER, delay).await?;

        Ok(decode_temperature(raw))
    }

    /// Relative humidity in hundredths of a percent.
    pub async fn read_humidity<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<i32, B::Error> {
        let raw = self.read_register16(HUMIDITY_REGISTER, delay).await?;

        Ok(decode_humidity(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBus, FakeDelay, FakeDevice};

    fn sensor(device: FakeDevice) -> (FakeBus, Am2320<I2c<FakeBus>>) {
        let fake = FakeBus::new();
        fake.attach(ADDRESS, device);
        let sensor = Am2320::new_i2c(fake.clone());

        (fake, sensor)
    }

    #[test]
    fn checksum_reference_vectors() {
        assert_eq!(0x4B37, checksum(b"123456789"));
        assert_eq!(0xFFFF, checksum(&[]));
        assert_eq!(0x807E, checksum(&[0x01]));
    }

    #[test]
    fn temperature_is_sign_magnitude() {
        assert_eq!(-500, decode_temperature(0x8032));
        assert_eq!(2000, decode_temperature(0x00C8));
        assert_eq!(0, decode_temperature(0x8000));
    }

    #[test]
    fn humidity_is_scaled() {
        assert_eq!(5000, decode_humidity(500));
    }

    #[tokio::test]
    async fn reads_register_pair() {
        let (fake, mut sensor) = sensor(FakeDevice::am2320().with_bytes(0x00, &[0x02, 0x5E, 0x01, 0x05]));
        let mut delay = FakeDelay::new();

        assert_eq!(0x0105, sensor.read_register16(TEMPERATURE_REGISTER, &mut delay).await.unwrap());

        assert_eq!(
            vec![(ADDRESS, vec![0x00]), (ADDRESS, vec![0x03, 0x02, 0x02])],
            fake.writes()
        );
        assert_eq!(12, delay.elapsed_ms());
    }

    #[tokio::test]
    async fn reads_temperature_and_humidity() {
        let (_, mut sensor) = sensor(FakeDevice::am2320().with_bytes(0x00, &[0x02, 0x5E, 0x80, 0x32]));
        let mut delay = FakeDelay::new();

        assert_eq!(-500, sensor.read_temperature(&mut delay).await.unwrap());
        assert_eq!(6060, sensor.read_humidity(&mut delay).await.unwrap());
        assert_eq!(24, delay.elapsed_ms());
    }

    #[tokio::test]
    async fn acknowledged_wake_is_fine_too() {
        let (_, mut sensor) = sensor(FakeDevice::am2320().awake().with_bytes(0x02, &[0x00, 0xC8]));

        assert_eq!(2000, sensor.read_temperature(&mut FakeDelay::new()).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_function_code() {
        let crc = checksum(&[0x83, 0x02, 0x00, 0xC8]).to_le_bytes();
        let (_, mut sensor) = sensor(FakeDevice::am2320().respond_with([0x83, 0x02, 0x00, 0xC8, crc[0], crc[1]]));

        let result = sensor.read_temperature(&mut FakeDelay::new()).await;
        assert_eq!(Err(SensorError::ProtocolMismatch { function_code: 0x83, length: 0x02 }), result);
    }

    #[tokio::test]
    async fn wrong_length() {
        let crc = checksum(&[0x03, 0x04, 0x00, 0xC8]).to_le_bytes();
        let (_, mut sensor) = sensor(FakeDevice::am2320().respond_with([0x03, 0x04, 0x00, 0xC8, crc[0], crc[1]]));

        let result = sensor.read_temperature(&mut FakeDelay::new()).await;
        assert_eq!(Err(SensorError::ProtocolMismatch { function_code: 0x03, length: 0x04 }), result);
    }

    #[tokio::test]
    async fn corrupted_checksum() {
        let computed = checksum(&[0x03, 0x02, 0x00, 0xC8]);
        let [lo, hi] = (computed ^ 0x0100).to_le_bytes();
        let (_, mut sensor) = sensor(FakeDevice::am2320().respond_with([0x03, 0x02, 0x00, 0xC8, lo, hi]));

        let result = sensor.read_temperature(&mut FakeDelay::new()).await;
        assert_eq!(
            Err(SensorError::ChecksumMismatch { received: computed ^ 0x0100, computed }),
            result
        );
    }

    #[tokio::test]
    async fn checksum_is_transmitted_low_byte_first() {
        // [03 02 00 C8] has CRC 0x36A0
        let (_, mut sensor) = sensor(FakeDevice::am2320().respond_with([0x03, 0x02, 0x00, 0xC8, 0xA0, 0x36]));

        assert_eq!(2000, sensor.read_temperature(&mut FakeDelay::new()).await.unwrap());
    }

    #[tokio::test]
    async fn nack_on_response_is_a_bus_error() {
        let (_, mut sensor) = sensor(FakeDevice::am2320().nack_reads());

        let result = sensor.read_humidity(&mut FakeDelay::new()).await;
        assert!(matches!(result, Err(SensorError::Bus(_))));
    }

    #[tokio::test]
    async fn missing_sensor_is_a_bus_error() {
        let fake = FakeBus::new();
        let mut sensor = Am2320::new_i2c(fake);

        let result = sensor.read_temperature(&mut FakeDelay::new()).await;
        assert!(matches!(result, Err(SensorError::Bus(_))));
    }
}
