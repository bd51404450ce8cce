//! Platform-agnostic driver for the 0x23 I2C noise sensor, built on the
//! `embedded-hal` 1.0 traits.
//!
//! ```ignore
//! let mut sensor = CustomDevice::new(&mut i2c, delay);
//! if sensor.begin() {
//!     let raw = sensor.read_raw_data();
//!     let db = sensor.read_decibel();
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod custom_device;
pub mod noise;

pub use custom_device::{CustomDevice, Error, State};
pub use noise::convert_to_decibel;
