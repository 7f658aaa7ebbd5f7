use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use heapless::LinearMap;

const MODBUS: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_MODBUS);

/// The only way the fake bus fails: the addressed device did not acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeNack;

impl embedded_hal::i2c::Error for FakeNack {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

#[derive(Debug, Clone)]
enum Protocol {
    /// Register pointer with auto-increment (BMP180/BMP280)
    Registers,
    /// Function code framing (AM2320)
    Modbus {
        asleep: bool,
        pending: Option<[u8; 6]>,
        forced_response: Option<[u8; 6]>,
    },
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    memory: [u8; 256],
    pointer: u8,
    protocol: Protocol,
    nack_all: bool,
    nack_reads: bool,
    busy_polls: u32,
    busy_remaining: u32,
    conversions: LinearMap<u8, (u8, heapless::Vec<u8, 4>), 4>,
}

impl FakeDevice {
    fn with_protocol(protocol: Protocol) -> Self {
        FakeDevice {
            memory: [0u8; 256],
            pointer: 0,
            protocol,
            nack_all: false,
            nack_reads: false,
            busy_polls: 0,
            busy_remaining: 0,
            conversions: LinearMap::new(),
        }
    }

    pub fn registers() -> Self {
        Self::with_protocol(Protocol::Registers)
    }

    /// An AM2320 that starts out asleep, so the first wake write is not acknowledged.
    pub fn am2320() -> Self {
        Self::with_protocol(Protocol::Modbus { asleep: true, pending: None, forced_response: None })
    }

    pub fn with_bytes(mut self, start: u8, bytes: &[u8]) -> Self {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory[start.wrapping_add(offset as u8) as usize] = *byte;
        }

        self
    }

    pub fn nack_everything(mut self) -> Self {
        self.nack_all = true;

        self
    }

    pub fn nack_reads(mut self) -> Self {
        self.nack_reads = true;

        self
    }

    /// STATUS (0xF3) reports "measuring" for this many reads after every CTRL_MEAS write.
    /// `u32::MAX` never finishes.
    pub fn busy_for(mut self, polls: u32) -> Self {
        self.busy_polls = polls;

        self
    }

    /// Writing `command` to 0xF4 loads `bytes` at `start`, like a finished conversion.
    pub fn converts(mut self, command: u8, start: u8, bytes: &[u8]) -> Self {
        let bytes = heapless::Vec::from_slice(bytes).unwrap();
        self.conversions.insert(command, (start, bytes)).unwrap();

        self
    }

    /// Answers every Modbus read with `response`, regardless of the request.
    pub fn respond_with(mut self, response: [u8; 6]) -> Self {
        if let Protocol::Modbus { forced_response, .. } = &mut self.protocol {
            *forced_response = Some(response);
        }

        self
    }

    /// Keeps the AM2320 awake, so wake writes are acknowledged.
    pub fn awake(mut self) -> Self {
        if let Protocol::Modbus { asleep, .. } = &mut self.protocol {
            *asleep = false;
        }

        self
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), FakeNack> {
        match &mut self.protocol {
            Protocol::Registers => {
                let Some((&pointer, values)) = bytes.split_first() else {
                    return Ok(());
                };
                self.pointer = pointer;
                for value in values {
                    self.memory[self.pointer as usize] = *value;
                    if self.pointer == 0xF4 {
                        self.busy_remaining = self.busy_polls;
                        if let Some((start, data)) = self.conversions.get(value) {
                            for (offset, byte) in data.iter().enumerate() {
                                self.memory[start.wrapping_add(offset as u8) as usize] = *byte;
                            }
                        }
                    }
                    self.pointer = self.pointer.wrapping_add(1);
                }

                Ok(())
            }
            Protocol::Modbus { asleep, pending, .. } => {
                if *asleep {
                    *asleep = false;
                    return Err(FakeNack);
                }
                if let [0x03, reg, 0x02] = *bytes {
                    let hi = self.memory[reg as usize];
                    let lo = self.memory[reg.wrapping_add(1) as usize];
                    let crc = MODBUS.checksum(&[0x03, 0x02, hi, lo]).to_le_bytes();
                    *pending = Some([0x03, 0x02, hi, lo, crc[0], crc[1]]);
                }

                Ok(())
            }
        }
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), FakeNack> {
        if self.nack_reads {
            return Err(FakeNack);
        }

        match &mut self.protocol {
            Protocol::Registers => {
                for byte in buffer.iter_mut() {
                    *byte = self.memory[self.pointer as usize];
                    if self.pointer == 0xF3 && self.busy_remaining > 0 {
                        *byte |= 0b0000_1000;
                        if self.busy_remaining != u32::MAX {
                            self.busy_remaining -= 1;
                        }
                    }
                    self.pointer = self.pointer.wrapping_add(1);
                }

                Ok(())
            }
            Protocol::Modbus { pending, forced_response, .. } => {
                let response = forced_response.or(pending.take()).ok_or(FakeNack)?;
                let len = buffer.len().min(response.len());
                buffer[..len].copy_from_slice(&response[..len]);

                Ok(())
            }
        }
    }
}

#[derive(Default)]
struct FakeBusState {
    devices: LinearMap<u8, FakeDevice, 4>,
    writes: Vec<(u8, Vec<u8>)>,
}

/// In-memory I2C bus. Clones share the same devices, so a test can keep one handle for
/// inspection while a driver owns another.
#[derive(Clone, Default)]
pub struct FakeBus {
    state: Rc<RefCell<FakeBusState>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, address: SevenBitAddress, device: FakeDevice) {
        self.state.borrow_mut().devices.insert(address, device).unwrap();
    }

    pub fn detach(&self, address: SevenBitAddress) {
        self.state.borrow_mut().devices.remove(&address);
    }

    pub fn register(&self, address: SevenBitAddress, reg: u8) -> u8 {
        self.state.borrow().devices.get(&address).unwrap().memory[reg as usize]
    }

    /// Every write attempted so far, acknowledged or not.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.state.borrow().writes.clone()
    }
}

impl ErrorType for FakeBus {
    type Error = FakeNack;
}

impl I2c<SevenBitAddress> for FakeBus {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        let FakeBusState { devices, writes } = &mut *state;

        for operation in operations {
            if let Operation::Write(bytes) = operation {
                writes.push((address, bytes.to_vec()));
            }

            let device = devices.get_mut(&address).ok_or(FakeNack)?;
            if device.nack_all {
                return Err(FakeNack);
            }

            match operation {
                Operation::Write(bytes) => device.write(bytes)?,
                Operation::Read(buffer) => device.read(buffer)?,
            }
        }

        Ok(())
    }
}

/// Delay provider that returns immediately and keeps count of the time asked for.
#[derive(Clone, Default)]
pub struct FakeDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_reports_busy_after_ctrl_meas_write() {
        let fake = FakeBus::new();
        fake.attach(0x77, FakeDevice::registers().busy_for(2));
        let mut bus = fake.clone();

        bus.write(0x77, &[0xF4, 0x2E]).await.unwrap();

        let mut status = [0u8; 1];
        for expected in [0x08, 0x08, 0x00] {
            bus.write_read(0x77, &[0xF3], &mut status).await.unwrap();
            assert_eq!([expected], status);
        }
    }

    #[tokio::test]
    async fn am2320_wakes_on_first_write() {
        let fake = FakeBus::new();
        fake.attach(0x5C, FakeDevice::am2320().with_bytes(0x02, &[0x01, 0x05]));
        let mut bus = fake.clone();

        assert_eq!(Err(FakeNack), bus.write(0x5C, &[0x00]).await);
        bus.write(0x5C, &[0x03, 0x02, 0x02]).await.unwrap();

        let mut response = [0u8; 6];
        bus.read(0x5C, &mut response).await.unwrap();
        assert_eq!([0x03, 0x02, 0x01, 0x05], response[..4]);
    }

    #[tokio::test]
    async fn delay_accumulates() {
        let delay = FakeDelay::new();
        let mut handle = delay.clone();

        handle.delay_ms(10).await;
        handle.delay_us(2000).await;

        assert_eq!(12, delay.elapsed_ms());
    }
}
