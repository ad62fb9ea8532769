//! A trait for reading and writing control-table registers over a bus.
//!
//! Packet framing, checksums, retries and timeouts all belong to the implementation of
//! [`DeviceBus`]. The register layer only relies on each call being a single, complete transaction.

#[cfg(feature = "sim")]
pub mod sim;

use crate::DeviceId;

/// A bus carrying register reads and writes to the devices attached to it.
///
/// Writes to [`DeviceId::BROADCAST`] are applied by every device and are not acknowledged.
/// Implementations must never apply a word write partially.
pub trait DeviceBus {
    /// Transport level failure.
    type Error: std::error::Error + 'static;

    /// Reads the byte at `address`.
    fn read_byte(&mut self, id: DeviceId, address: u8) -> Result<u8, Self::Error>;

    /// Reads the word whose low byte is at `address`.
    fn read_word(&mut self, id: DeviceId, address: u8) -> Result<u16, Self::Error>;

    /// Writes the byte at `address`.
    fn write_byte(&mut self, id: DeviceId, address: u8, value: u8) -> Result<(), Self::Error>;

    /// Writes a word, low byte at `address` and high byte at `address + 1`.
    fn write_word(&mut self, id: DeviceId, address: u8, value: u16) -> Result<(), Self::Error>;
}

/// Lets a [`crate::Controller`] borrow a bus, for instance through a mutex guard:
///
/// ```rust
/// # use dynamixel_control::{sim::SimBus, ActuatorField, Controller, DeviceId};
/// # use std::sync::Mutex;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let id = DeviceId::new(1).ok_or("bad id")?;
/// let bus = Mutex::new(SimBus::new().with_defaults::<ActuatorField>(id));
///
/// let mut guard = bus.lock().map_err(|_| "poisoned")?;
/// // the lock is held for the whole read-modify-write
/// Controller::new(&mut *guard).actuator(id).torque_enable_switch()?;
/// # Ok(())
/// # }
/// ```
impl<B: DeviceBus + ?Sized> DeviceBus for &mut B {
    type Error = B::Error;

    fn read_byte(&mut self, id: DeviceId, address: u8) -> Result<u8, Self::Error> {
        (**self).read_byte(id, address)
    }

    fn read_word(&mut self, id: DeviceId, address: u8) -> Result<u16, Self::Error> {
        (**self).read_word(id, address)
    }

    fn write_byte(&mut self, id: DeviceId, address: u8, value: u8) -> Result<(), Self::Error> {
        (**self).write_byte(id, address, value)
    }

    fn write_word(&mut self, id: DeviceId, address: u8, value: u16) -> Result<(), Self::Error> {
        (**self).write_word(id, address, value)
    }
}
