//! Errors that can occur while talking to the sensors.
//!
//! [`SensorError`] is generic over the underlying bus error type, so the HAL
//! error (and its [`embedded_hal::i2c::ErrorKind`]) is never lost.

use crate::register::InvalidRegisterField;

/// Type alias used to simplify return types throughout the crate
pub type SensorResult<T, BusError> = Result<T, SensorError<BusError>>;

/// This represents all possible errors that can occur when reading the sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<BusError> {
    /// The I2C driver reported an error, typically a negative acknowledgement.
    Bus(BusError),

    /// The AM2320 echoed an unexpected function code or payload length.
    ProtocolMismatch {
        /// Function code found in the response, should be `0x03`
        function_code: u8,
        /// Payload length found in the response, should be `2`
        length: u8,
    },

    /// The checksum transmitted by the AM2320 does not match the received bytes.
    ChecksumMismatch {
        /// Checksum carried in the last two bytes of the response
        received: u16,
        /// Checksum computed over the preamble and payload
        computed: u16,
    },

    /// A calibration coefficient read back as `0x0000` or `0xFFFF`.
    ///
    /// Most likely the NVM read was corrupted by a bus fault. The value is the byte
    /// offset of the coefficient within the calibration block.
    CalibrationFault(u8),

    /// A compensation step would have divided by zero. Indicates corrupt calibration data
    /// or raw values outside of what the sensor can produce.
    DivideByZero,

    /// The sensor did not finish a conversion within the configured number of status polls.
    Timeout,

    /// The identity register holds a value no compensation engine exists for.
    UnsupportedChip(u8),

    /// Reading from a register returned unexpected data. This should not happen in normal circumstances.
    UnexpectedRegisterData(InvalidRegisterField),
}

impl<BusError> From<InvalidRegisterField> for SensorError<BusError> {
    fn from(value: InvalidRegisterField) -> Self {
        SensorError::UnexpectedRegisterData(value)
    }
}
