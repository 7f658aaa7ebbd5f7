//! Register catalog for the BMP180 and BMP280.
//!
//! Each register is a marker type implementing [`Reg`] plus [`Readable`] and/or
//! [`Writable`], which is what [`Bus::read_typed`](crate::bus::Bus::read_typed) and
//! [`Bus::write_typed`](crate::bus::Bus::write_typed) operate on. The two chips share a
//! register map layout in the `0xD0..=0xFC` range, but the meaning of `CTRL_MEAS` and the
//! data/calibration blocks differ.

pub mod calibration;
pub mod chip_id;
pub mod ctrl_meas;
pub mod data;
pub mod reset;
pub mod status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidRegisterField {
    pub register: u8,
    pub value: u8,
    pub bit_offset: u8,
}

impl InvalidRegisterField {
    pub fn new(register: u8, value: u8, bit_offset: u8) -> Self {
        Self { register, value, bit_offset }
    }
}

pub struct UnexpectedValue(pub u8);

pub trait Reg { const ADDR: u8; }

pub trait Readable: Reg {
    type Out;
    const N: usize = 1;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField>;
}

pub trait Writable: Reg {
    type In;
    fn encode(v: &Self::In, out: &mut [u8]);
}
