//! Register transaction client.
//!
//! Every method performs exactly one bus transaction and reports the outcome. There are
//! no retries: a negative acknowledgement surfaces as the HAL's error value, which carries
//! an [`embedded_hal::i2c::ErrorKind`].
//!
//! The client holds nothing but the bus handle. Several drivers can share one physical bus
//! by handing each of them its own device handle (for example
//! `embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice`); serializing access between
//! concurrent callers is left to that mechanism.

use core::future::Future;

use embedded_hal::i2c::SevenBitAddress;

use crate::error::{SensorError, SensorResult};
use crate::register::{Readable, Writable};

/// Largest register block read or written in a single transaction
pub(crate) const MAX_REG_BYTES: usize = 24;

pub trait Bus {
    type Error;

    /// Writes `value` into `reg` of the device at `address`.
    fn write_register(
        &mut self,
        address: SevenBitAddress,
        reg: u8,
        value: u8,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Reads consecutive registers starting at `start` in one burst.
    ///
    /// The devices auto-increment their register pointer, so this fills `data` with
    /// `start`, `start + 1`, ... in a single write-read transaction.
    fn read_registers(
        &mut self,
        address: SevenBitAddress,
        start: u8,
        data: &mut [u8],
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Writes a raw frame without a register pointer.
    fn write(&mut self, address: SevenBitAddress, bytes: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;

    /// Reads a raw frame without a register pointer.
    fn read(&mut self, address: SevenBitAddress, data: &mut [u8]) -> impl Future<Output = Result<(), Self::Error>>;

    /// Reads a single register.
    fn read_register(
        &mut self,
        address: SevenBitAddress,
        reg: u8,
    ) -> impl Future<Output = Result<u8, Self::Error>> {
        async move {
            let mut buf = [0u8; 1];
            self.read_registers(address, reg, &mut buf).await?;

            Ok(buf[0])
        }
    }

    /// Reads a register (or fixed-size register block) using a typed marker.
    fn read_typed<R: Readable>(
        &mut self,
        address: SevenBitAddress,
    ) -> impl Future<Output = SensorResult<R::Out, Self::Error>> {
        async move {
            let mut buf = [0u8; MAX_REG_BYTES];
            let data = &mut buf[..R::N];
            self.read_registers(address, R::ADDR, data)
                .await
                .map_err(SensorError::Bus)?;

            Ok(R::decode(data)?)
        }
    }

    /// Writes a single-byte register using a typed marker.
    fn write_typed<W: Writable>(
        &mut self,
        address: SevenBitAddress,
        v: &W::In,
    ) -> impl Future<Output = SensorResult<(), Self::Error>> {
        async move {
            let mut buf = [0u8; 1];
            W::encode(v, &mut buf);
            self.write_register(address, W::ADDR, buf[0])
                .await
                .map_err(SensorError::Bus)
        }
    }
}

pub struct I2c<I2cType> {
    i2c: I2cType,
}

impl<I2cType> I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    pub fn new(i2c: I2cType) -> Self {
        Self { i2c }
    }

    /// Gives back the wrapped bus handle.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType> Bus for I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    type Error = <I2cType as embedded_hal_async::i2c::ErrorType>::Error;

    async fn write_register(&mut self, address: SevenBitAddress, reg: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(address, &[reg, value]).await?;

        Ok(())
    }

    async fn read_registers(&mut self, address: SevenBitAddress, start: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(address, &[start], data).await?;

        Ok(())
    }

    async fn write(&mut self, address: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, bytes).await
    }

    async fn read(&mut self, address: SevenBitAddress, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(address, data).await
    }
}
