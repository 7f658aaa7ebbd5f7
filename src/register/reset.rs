//! ### SOFT_RESET (`0xE0`, 1 byte, W)
//!
//! Writing `0xB6` performs the same sequence as a power-on reset. Any other value has
//! no effect.
use crate::register::{Reg, Writable};

/// Marker struct for the SOFT_RESET (0xE0) register
pub struct SoftReset;
impl Reg for SoftReset { const ADDR: u8 = 0xE0; }

/// Commands accepted by the SOFT_RESET register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResetCommand {
    PowerOnReset,
}

impl Writable for SoftReset {
    type In = ResetCommand;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = match v {
            ResetCommand::PowerOnReset => 0xB6,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_reset_encode() {
        let mut buffer = [0u8; 1];
        SoftReset::encode(&ResetCommand::PowerOnReset, &mut buffer);
        assert_eq!([0xB6], buffer);
    }
}
