//! An in-memory [`DeviceBus`] holding one control-table image per device.
//!
//! Every successful transaction is recorded, which makes it the test double of choice for code
//! built on [`crate::Controller`], and lets the demos run without hardware.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LE};
use itertools::Itertools;
use thiserror::Error;

use crate::protocol::registers::ControlTable;
use crate::transport::DeviceBus;
use crate::DeviceId;

/// Size of the control-table image of a simulated device.
pub const IMAGE_SIZE: usize = 256;

/// Failures of the simulated bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// No simulated device has this id.
    #[error("no response from device {0}")]
    NoResponse(DeviceId),
    /// The access runs past the end of the image.
    #[error("address {0} is outside the control table")]
    AddressOutOfRange(u16),
    /// Raised by [`SimBus::fail_next`].
    #[error("injected transport failure")]
    Injected,
}

/// A transaction that reached the simulated bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Transaction {
    ReadByte { id: DeviceId, address: u8 },
    ReadWord { id: DeviceId, address: u8 },
    WriteByte { id: DeviceId, address: u8, value: u8 },
    WriteWord { id: DeviceId, address: u8, value: u16 },
}

impl Transaction {
    /// Whether the transaction modified a register.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Transaction::WriteByte { .. } | Transaction::WriteWord { .. }
        )
    }
}

/// Simulated devices behind a simulated bus.
///
/// ```rust
/// # use dynamixel_control::sim::{SimBus, Transaction};
/// # use dynamixel_control::{ActuatorField, Controller, DeviceId};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let id = DeviceId::new(1).ok_or("bad id")?;
/// let mut controller = Controller::new(SimBus::new().with_defaults::<ActuatorField>(id));
/// controller.write(id, ActuatorField::GoalPosition, 5000)?;
/// assert_eq!(
///     controller.bus().transactions(),
///     &[Transaction::WriteWord { id, address: 30, value: 1023 }]
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimBus {
    devices: BTreeMap<DeviceId, Box<[u8; IMAGE_SIZE]>>,
    transactions: Vec<Transaction>,
    fail_next: bool,
}

impl SimBus {
    /// A bus with no device attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a device whose control table is all zeros.
    pub fn with_device(mut self, id: DeviceId) -> Self {
        self.add_device(id);
        self
    }

    /// Attaches a device loaded with the factory defaults of `T`.
    /// Fields without a documented default are zero.
    pub fn with_defaults<T: ControlTable>(mut self, id: DeviceId) -> Self {
        self.add_device(id);
        for field in T::FIELDS {
            let descriptor = field.descriptor();
            if let Some(initial) = descriptor.initial {
                let image = self.image_mut(id);
                let address = usize::from(descriptor.address);
                match descriptor.width.size() {
                    1 => image[address] = initial as u8,
                    _ => LE::write_u16(&mut image[address..address + 2], initial),
                }
            }
        }
        self
    }

    /// Attaches a device whose control table is all zeros. Does nothing if it is already attached.
    /// The broadcast id cannot be attached.
    pub fn add_device(&mut self, id: DeviceId) {
        if !id.is_broadcast() {
            self.devices
                .entry(id)
                .or_insert_with(|| Box::new([0; IMAGE_SIZE]));
        }
    }

    /// Makes the next transaction fail with [`SimError::Injected`], without touching any image.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Every successful transaction, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns the recorded transactions and starts a new record.
    pub fn take_transactions(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    /// The control-table image of a device, if attached.
    pub fn image(&self, id: DeviceId) -> Option<&[u8; IMAGE_SIZE]> {
        self.devices.get(&id).map(|image| &**image)
    }

    /// Sets a byte directly, without recording a transaction. Attaches the device if needed.
    pub fn poke_byte(&mut self, id: DeviceId, address: u8, value: u8) {
        self.add_device(id);
        self.image_mut(id)[usize::from(address)] = value;
    }

    /// Sets a word directly, without recording a transaction. Attaches the device if needed.
    /// The word must fit in the image.
    pub fn poke_word(&mut self, id: DeviceId, address: u8, value: u16) {
        self.add_device(id);
        let address = usize::from(address);
        if address + 2 <= IMAGE_SIZE {
            LE::write_u16(&mut self.image_mut(id)[address..address + 2], value);
        }
    }

    /// Reads a byte directly, without recording a transaction.
    pub fn peek_byte(&self, id: DeviceId, address: u8) -> Option<u8> {
        self.image(id).map(|image| image[usize::from(address)])
    }

    /// Reads a word directly, without recording a transaction.
    pub fn peek_word(&self, id: DeviceId, address: u8) -> Option<u16> {
        let address = usize::from(address);
        self.image(id)
            .and_then(|image| image.get(address..address + 2))
            .map(LE::read_u16)
    }

    fn image_mut(&mut self, id: DeviceId) -> &mut [u8; IMAGE_SIZE] {
        self.devices
            .entry(id)
            .or_insert_with(|| Box::new([0; IMAGE_SIZE]))
    }

    fn check_failure(&mut self) -> Result<(), SimError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(SimError::Injected);
        }
        Ok(())
    }

    /// The images addressed by `id`: every device for a broadcast.
    fn targets(&mut self, id: DeviceId) -> Result<Vec<&mut [u8; IMAGE_SIZE]>, SimError> {
        if id.is_broadcast() {
            return Ok(self.devices.values_mut().map(|image| &mut **image).collect());
        }
        self.devices
            .get_mut(&id)
            .map(|image| vec![&mut **image])
            .ok_or(SimError::NoResponse(id))
    }

    fn span(address: u8, len: usize) -> Result<std::ops::Range<usize>, SimError> {
        let start = usize::from(address);
        if start + len > IMAGE_SIZE {
            return Err(SimError::AddressOutOfRange(u16::from(address) + 1));
        }
        Ok(start..start + len)
    }

    fn record(&mut self, transaction: Transaction) {
        log::trace!("sim: {:?}", transaction);
        self.transactions.push(transaction);
    }
}

impl DeviceBus for SimBus {
    type Error = SimError;

    fn read_byte(&mut self, id: DeviceId, address: u8) -> Result<u8, SimError> {
        self.check_failure()?;
        let value = self
            .image(id)
            .map(|image| image[usize::from(address)])
            .ok_or(SimError::NoResponse(id))?;
        self.record(Transaction::ReadByte { id, address });
        Ok(value)
    }

    fn read_word(&mut self, id: DeviceId, address: u8) -> Result<u16, SimError> {
        self.check_failure()?;
        let span = Self::span(address, 2)?;
        let value = self
            .image(id)
            .map(|image| LE::read_u16(&image[span]))
            .ok_or(SimError::NoResponse(id))?;
        self.record(Transaction::ReadWord { id, address });
        Ok(value)
    }

    fn write_byte(&mut self, id: DeviceId, address: u8, value: u8) -> Result<(), SimError> {
        self.check_failure()?;
        for image in self.targets(id)? {
            image[usize::from(address)] = value;
        }
        self.record(Transaction::WriteByte { id, address, value });
        Ok(())
    }

    fn write_word(&mut self, id: DeviceId, address: u8, value: u16) -> Result<(), SimError> {
        self.check_failure()?;
        let span = Self::span(address, 2)?;
        for image in self.targets(id)? {
            LE::write_u16(&mut image[span.clone()], value);
        }
        self.record(Transaction::WriteWord { id, address, value });
        Ok(())
    }
}

/// Hex dump of every image, 16 bytes per row.
impl std::fmt::Display for SimBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, image) in &self.devices {
            writeln!(f, "device {id}")?;
            let rows = image
                .chunks(16)
                .enumerate()
                .map(|(row, chunk)| format!("  {:02x}: {}", row * 16, hex::encode(chunk)))
                .join("\n");
            writeln!(f, "{rows}")?;
        }
        Ok(())
    }
}
