//! Noise sensor device on I2C address 0x23.
//!
//! All registers are 16 bits wide and little-endian on the wire. A register
//! is selected by writing its address in one transaction and read back in a
//! second transaction; there is no repeated start.
//!
//! The driver identifies the device lazily: the first accessor call runs the
//! handshake if `begin` was never called. Accessors without the `try_`
//! prefix never fail, they return `0` (or do nothing) when the bus or the
//! handshake fails. Use the `try_` variants to tell a zero reading from a
//! communication failure.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::noise;

/// Default 7-bit device address.
pub const DEVICE_ADDR: u8 = 0x23;
/// Expected content of the identity register.
pub const DEVICE_ID: u16 = 0x427c;

pub const REG_DEVICE_ID: u8 = 0x00;
pub const REG_RAW_DATA: u8 = 0x06;
pub const REG_PROCESSED: u8 = 0x07;
pub const REG_STATUS: u8 = 0x08;
pub const REG_PARAMETER: u8 = 0x10;
pub const REG_ACTION: u8 = 0x20;

/// Written to `REG_ACTION` to start the one-shot action.
pub const CMD_PERFORM_ACTION: u16 = 0x01;

/// Parameter values above this are capped.
pub const PARAMETER_MAX: u8 = 100;

/// Power-up settle time before every handshake.
pub const POWER_UP_DELAY_MS: u32 = 10;

/// Device errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Selecting the identity register failed, nothing acknowledged the address
    DeviceNotFound(E),
    /// The identity register could not be read back
    IdentityReadIncomplete(E),
    /// A device answered, but with an unexpected identity
    IdentityMismatch(u16),
    /// Writing the register address failed
    RegisterSelectFailed(E),
    /// Reading the 2 register bytes failed
    RegisterReadIncomplete(E),
    /// Writing register address and value failed
    RegisterWriteFailed(E),
}

/// Handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No successful handshake yet
    Uninitialized,
    /// Identity verified, registers may be accessed
    Ready,
}

/// Returns true for the identity value in either byte order.
fn is_valid_identity(id: u16) -> bool {
    id == DEVICE_ID || id == DEVICE_ID.swap_bytes()
}

/// Noise sensor driver.
///
/// The bus is not owned in any meaningful sense: pass `&mut bus`, or a
/// shared bus device from `embedded-hal-bus` when several drivers sit on
/// the same bus.
pub struct CustomDevice<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    state: State,
}

impl<I2C, D> CustomDevice<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a driver for the device at the default address `0x23`.
    ///
    /// Does not touch the bus.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::new_with_address(i2c, delay, DEVICE_ADDR)
    }

    /// Create a driver for a device at a custom 7-bit address.
    pub fn new_with_address(i2c: I2C, delay: D, address: u8) -> Self {
        CustomDevice {
            i2c,
            delay,
            address,
            state: State::Uninitialized,
        }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    /// Run the identification handshake, returns whether it succeeded.
    pub fn begin(&mut self) -> bool {
        match self.try_begin() {
            Ok(()) => true,
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("begin failed: {}", defmt::Debug2Format(&_err));
                false
            }
        }
    }

    /// Run the identification handshake.
    ///
    /// Every call waits for the power-up delay and reads the identity
    /// register again. A failure never resets an earlier success.
    pub fn try_begin(&mut self) -> Result<(), Error<I2C::Error>> {
        self.delay.delay_ms(POWER_UP_DELAY_MS);

        self.i2c
            .write(self.address, &[REG_DEVICE_ID])
            .map_err(Error::DeviceNotFound)?;

        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(Error::IdentityReadIncomplete)?;

        let id = u16::from_le_bytes(buf);
        if !is_valid_identity(id) {
            return Err(Error::IdentityMismatch(id));
        }

        self.state = State::Ready;
        #[cfg(feature = "defmt")]
        defmt::debug!("device {:02x} ready, id {:04x}", self.address, id);
        Ok(())
    }

    /// Raw measurement, `0` on any failure.
    pub fn read_raw_data(&mut self) -> u16 {
        unwrap_or_log(self.try_read_raw_data())
    }

    pub fn try_read_raw_data(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.ensure_ready()?;
        self.read_register(REG_RAW_DATA)
    }

    /// Processed measurement, `0` on any failure.
    pub fn read_processed_data(&mut self) -> u16 {
        unwrap_or_log(self.try_read_processed_data())
    }

    pub fn try_read_processed_data(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.ensure_ready()?;
        self.read_register(REG_PROCESSED)
    }

    /// Status byte (low 8 bits of the status register), `0` on any failure.
    pub fn read_status(&mut self) -> u8 {
        unwrap_or_log(self.try_read_status())
    }

    pub fn try_read_status(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.ensure_ready()?;
        let val = self.read_register(REG_STATUS)?;
        Ok((val & 0xff) as u8)
    }

    /// Write the device parameter, values above 100 are capped to 100.
    pub fn set_parameter(&mut self, value: u8) {
        unwrap_or_log(self.try_set_parameter(value))
    }

    pub fn try_set_parameter(&mut self, value: u8) -> Result<(), Error<I2C::Error>> {
        self.ensure_ready()?;
        let value = value.min(PARAMETER_MAX);
        self.write_register(REG_PARAMETER, value as u16)
    }

    /// Start the one-shot device action. There is no confirmation.
    pub fn trigger_action(&mut self) {
        unwrap_or_log(self.try_trigger_action())
    }

    pub fn try_trigger_action(&mut self) -> Result<(), Error<I2C::Error>> {
        self.ensure_ready()?;
        self.write_register(REG_ACTION, CMD_PERFORM_ACTION)
    }

    /// Sound level in dB computed from the raw measurement.
    ///
    /// A failed read is converted like a zero reading.
    pub fn read_decibel(&mut self) -> f32 {
        noise::convert_to_decibel(self.read_raw_data())
    }

    pub fn try_read_decibel(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.try_read_raw_data().map(noise::convert_to_decibel)
    }

    fn ensure_ready(&mut self) -> Result<(), Error<I2C::Error>> {
        match self.state {
            State::Ready => Ok(()),
            State::Uninitialized => self.try_begin(),
        }
    }

    fn read_register(&mut self, register: u8) -> Result<u16, Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[register])
            .map_err(Error::RegisterSelectFailed)?;

        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(Error::RegisterReadIncomplete)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn write_register(&mut self, register: u8, value: u16) -> Result<(), Error<I2C::Error>> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c
            .write(self.address, &[register, lo, hi])
            .map_err(Error::RegisterWriteFailed)
    }
}

/// Degrade a failed access to the default value, logging the cause.
fn unwrap_or_log<T: Default, E: core::fmt::Debug>(result: Result<T, Error<E>>) -> T {
    match result {
        Ok(val) => val,
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("register access failed: {}", defmt::Debug2Format(&_err));
            T::default()
        }
    }
}
