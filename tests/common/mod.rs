#![allow(dead_code)]

pub use custom_device::custom_device::{
    CustomDevice, Error, State, CMD_PERFORM_ACTION, DEVICE_ADDR, DEVICE_ID, REG_ACTION, REG_DEVICE_ID,
    REG_PARAMETER, REG_PROCESSED, REG_RAW_DATA, REG_STATUS,
};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};
use embedded_hal_mock as hal;
pub use hal::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

/// Handshake transactions answering with `id`, low byte first.
pub fn trans_identify(id: u16) -> [I2cTrans; 2] {
    [
        I2cTrans::write(DEVICE_ADDR, vec![REG_DEVICE_ID]),
        I2cTrans::read(DEVICE_ADDR, id.to_le_bytes().to_vec()),
    ]
}

pub fn trans_read_register(reg: u8, value: u16) -> [I2cTrans; 2] {
    [
        I2cTrans::write(DEVICE_ADDR, vec![reg]),
        I2cTrans::read(DEVICE_ADDR, value.to_le_bytes().to_vec()),
    ]
}

pub fn trans_write_register(reg: u8, value: u16) -> I2cTrans {
    let [lo, hi] = value.to_le_bytes();
    I2cTrans::write(DEVICE_ADDR, vec![reg, lo, hi])
}

pub fn chain(groups: &[&[I2cTrans]]) -> Vec<I2cTrans> {
    groups.concat()
}

/// Delay that only sums up what it was asked to wait.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}

/// Fake device: 256 little-endian 16-bit registers behind a register pointer.
///
/// A 1-byte write moves the pointer, a 3-byte write stores a value, a
/// 2-byte read returns the register under the pointer.
pub struct RegisterFile {
    pub address: u8,
    pub registers: [u16; 256],
    pointer: u8,
    pub transactions: usize,
    pub reads: usize,
    pub writes: Vec<Vec<u8>>,
}

impl RegisterFile {
    pub fn new(id: u16) -> Self {
        Self::with_address(DEVICE_ADDR, id)
    }

    pub fn with_address(address: u8, id: u16) -> Self {
        let mut registers = [0u16; 256];
        registers[REG_DEVICE_ID as usize] = id;
        RegisterFile {
            address,
            registers,
            pointer: 0,
            transactions: 0,
            reads: 0,
            writes: Vec::new(),
        }
    }
}

impl i2c::ErrorType for RegisterFile {
    type Error = ErrorKind;
}

impl i2c::I2c for RegisterFile {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        self.transactions += 1;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push(bytes.to_vec());
                    match bytes.len() {
                        1 => self.pointer = bytes[0],
                        3 => {
                            self.pointer = bytes[0];
                            self.registers[bytes[0] as usize] = u16::from_le_bytes([bytes[1], bytes[2]]);
                        }
                        _ => return Err(ErrorKind::Other),
                    }
                }
                Operation::Read(buf) => {
                    self.reads += 1;
                    if buf.len() != 2 {
                        return Err(ErrorKind::Other);
                    }
                    buf.copy_from_slice(&self.registers[self.pointer as usize].to_le_bytes());
                }
            }
        }
        Ok(())
    }
}
