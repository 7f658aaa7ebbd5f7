//! BTHome v2 service data payload.
//!
//! ```text
//! offset  0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
//!        D2 FC 40 02 tL tH 04 pL pM pH 02 sL sH 03 hL hH
//! ```
//!
//! All values are little-endian. The first temperature comes from the barometer, the
//! second one from the AM2320.

/// BTHome service UUID, transmitted as `[0xD2, 0xFC]`
pub const SERVICE_UUID: u16 = 0xFCD2;

/// Length of the service data payload
pub const FRAME_LEN: usize = 16;

/// BTHome v2, unencrypted, regular advertising interval
const DEVICE_INFO: u8 = 0x40;

const TEMPERATURE_ID: u8 = 0x02;
const PRESSURE_ID: u8 = 0x04;
const HUMIDITY_ID: u8 = 0x03;

pub const TEMPERATURE_OFFSET: usize = 4;
pub const PRESSURE_OFFSET: usize = 7;
pub const TEMPERATURE2_OFFSET: usize = 11;
pub const HUMIDITY_OFFSET: usize = 14;

/// Values for one frame, already scaled to the units the frame carries.
///
/// No range checks happen: each value is truncated to its field width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryValues {
    /// Hundredths of a degree Celsius, sint16
    pub temperature: i32,
    /// Hundredths of a hPa, uint24
    pub pressure: i32,
    /// Hundredths of a degree Celsius, sint16
    pub temperature2: i32,
    /// Hundredths of a percent, uint16
    pub humidity: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryFrame {
    bytes: [u8; FRAME_LEN],
}

impl Default for TelemetryFrame {
    fn default() -> Self {
        let [uuid_lo, uuid_hi] = SERVICE_UUID.to_le_bytes();

        Self {
            bytes: [
                uuid_lo, uuid_hi, DEVICE_INFO,
                TEMPERATURE_ID, 0, 0,
                PRESSURE_ID, 0, 0, 0,
                TEMPERATURE_ID, 0, 0,
                HUMIDITY_ID, 0, 0,
            ],
        }
    }
}

impl TelemetryFrame {
    /// A frame with the header and object ids in place and all values zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the value fields in place. The header is left alone.
    pub fn encode(&mut self, values: &TelemetryValues) {
        self.put(TEMPERATURE_OFFSET, values.temperature, 2);
        self.put(PRESSURE_OFFSET, values.pressure, 3);
        self.put(TEMPERATURE2_OFFSET, values.temperature2, 2);
        self.put(HUMIDITY_OFFSET, values.humidity, 2);
    }

    fn put(&mut self, offset: usize, value: i32, width: usize) {
        self.bytes[offset..offset + width].copy_from_slice(&value.to_le_bytes()[..width]);
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::am2320::ERROR_SENTINEL;

    #[test]
    fn new_frame_has_header() {
        let frame = TelemetryFrame::new();

        assert_eq!(
            &[0xD2, 0xFC, 0x40, 0x02, 0, 0, 0x04, 0, 0, 0, 0x02, 0, 0, 0x03, 0, 0],
            frame.as_bytes()
        );
    }

    #[test]
    fn encodes_little_endian_fields() {
        let mut frame = TelemetryFrame::new();

        frame.encode(&TelemetryValues {
            temperature: 1234,
            pressure: 98765,
            temperature2: -56,
            humidity: 4321,
        });

        assert_eq!(
            &[
                0xD2, 0xFC, 0x40,
                0x02, 0xD2, 0x04,
                0x04, 0xCD, 0x81, 0x01,
                0x02, 0xC8, 0xFF,
                0x03, 0xE1, 0x10,
            ],
            frame.as_bytes()
        );
    }

    #[test]
    fn sentinel_truncates_to_field_width() {
        let mut frame = TelemetryFrame::new();

        frame.encode(&TelemetryValues {
            temperature: ERROR_SENTINEL,
            pressure: ERROR_SENTINEL,
            temperature2: ERROR_SENTINEL,
            humidity: ERROR_SENTINEL,
        });

        let bytes = frame.as_bytes();
        assert_eq!([0x18, 0xFC], bytes[4..6]);
        assert_eq!([0x18, 0xFC, 0xFF], bytes[7..10]);
        assert_eq!([0x18, 0xFC], bytes[11..13]);
        assert_eq!([0x18, 0xFC], bytes[14..16]);
    }

    #[test]
    fn encode_overwrites_previous_cycle() {
        let mut frame = TelemetryFrame::new();
        frame.encode(&TelemetryValues { temperature: -1, pressure: -1, temperature2: -1, humidity: -1 });

        frame.encode(&TelemetryValues::default());

        assert_eq!(TelemetryFrame::new(), frame);
    }
}
