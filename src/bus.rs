use crate::protocol::registers::ControlTable;
use crate::protocol::{MovementMode, RegisterValue, Width};
use crate::transport::DeviceBus;
use crate::{Actuator, DeviceId, Error, RegisterError, Sensor};

/// The main struct for reading and writing control tables.
///
/// Every call is generic over the [`ControlTable`] of the device it addresses, so the same
/// controller drives actuators and sensors sharing a bus.
/// Operations that need several transactions are not atomic: the controller takes `&mut self`
/// so that nothing else can use the bus in between.
#[derive(Debug)]
pub struct Controller<B: DeviceBus> {
    bus: B,
}

impl<B: DeviceBus> Controller<B> {
    /// Create a new [`Controller`] instance with a given bus.
    ///
    /// ```rust
    /// # use dynamixel_control::{sim::SimBus, Controller, DeviceId, SensorField};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let id = DeviceId::new(100).ok_or("bad id")?;
    /// let mut c = Controller::new(SimBus::new().with_defaults::<SensorField>(id));
    /// assert_eq!(c.read(id, SensorField::ModelNumber)?, 13);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Returns a reference to the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns a mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the controller and returns the bus.
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Reads a field, with a byte or word transaction depending on its width.
    /// The raw value is returned unmodified.
    pub fn read<T: ControlTable>(
        &mut self,
        id: DeviceId,
        field: T,
    ) -> Result<RegisterValue, Error<B::Error>> {
        if id.is_broadcast() {
            return Err(Error::BroadcastRead);
        }
        let descriptor = field.descriptor();
        let value = match descriptor.width {
            Width::Byte => self
                .bus
                .read_byte(id, descriptor.address)
                .map(RegisterValue::from),
            Width::Word => self.bus.read_word(id, descriptor.address),
        }
        .map_err(Error::Transport)?;
        log::trace!(
            "{} {}: read {} = {}",
            T::DEVICE_CLASS,
            id,
            descriptor.name,
            value
        );
        Ok(value)
    }

    /// Validates `value` against the field's [`crate::registers::Policy`], then writes it with a
    /// byte or word transaction depending on the width of the field.
    ///
    /// Returns the value actually transmitted, which differs from `value` when it was clamped.
    /// Nothing is transmitted when the value is refused or the field is read-only.
    /// Fields whose bounds depend on the [`MovementMode`] first read both angle limits, except
    /// for a broadcast write which uses the joint mode bounds.
    pub fn write<T: ControlTable>(
        &mut self,
        id: DeviceId,
        field: T,
        value: i32,
    ) -> Result<RegisterValue, Error<B::Error>> {
        let descriptor = field.descriptor();
        if !descriptor.is_writable() {
            log::warn!(
                "{} {}: refusing to write read-only {}",
                T::DEVICE_CLASS,
                id,
                descriptor.name
            );
            return Err(RegisterError::ReadOnly(descriptor.name).into());
        }

        let mode = match T::ANGLE_LIMITS {
            Some(_) if descriptor.policy.depends_on_mode() && !id.is_broadcast() => {
                Some(self.movement_mode::<T>(id)?)
            }
            _ => None,
        };
        let raw = descriptor
            .policy
            .apply(&descriptor, value, mode)
            .map_err(|e| {
                log::warn!("{} {}: {}", T::DEVICE_CLASS, id, e);
                e
            })?;

        let sent = match descriptor.width {
            // the policy guarantees the value fits the register
            Width::Byte => self.bus.write_byte(id, descriptor.address, raw as u8),
            Width::Word => self.bus.write_word(id, descriptor.address, raw),
        };
        sent.map_err(Error::Transport)?;
        log::trace!(
            "{} {}: wrote {} = {}",
            T::DEVICE_CLASS,
            id,
            descriptor.name,
            raw
        );
        Ok(raw)
    }

    /// Reads the field starting at `address`.
    pub fn read_address<T: ControlTable>(
        &mut self,
        id: DeviceId,
        address: u8,
    ) -> Result<RegisterValue, Error<B::Error>> {
        let field = field_at::<T>(address)?;
        self.read(id, field)
    }

    /// Writes the field starting at `address`, see [`Controller::write`].
    pub fn write_address<T: ControlTable>(
        &mut self,
        id: DeviceId,
        address: u8,
        value: i32,
    ) -> Result<RegisterValue, Error<B::Error>> {
        let field = field_at::<T>(address)?;
        self.write(id, field, value)
    }

    /// Whether the field reads above 0.
    pub fn read_flag<T: ControlTable>(
        &mut self,
        id: DeviceId,
        field: T,
    ) -> Result<bool, Error<B::Error>> {
        Ok(self.read(id, field)? > 0)
    }

    /// Reads the field and writes 0 if it was set, 1 otherwise. Returns the new state.
    ///
    /// This takes exactly one read and one write.
    pub fn toggle<T: ControlTable>(
        &mut self,
        id: DeviceId,
        field: T,
    ) -> Result<bool, Error<B::Error>> {
        let enabled = !self.read_flag(id, field)?;
        self.write(id, field, i32::from(enabled))?;
        Ok(enabled)
    }

    /// Reads both angle limits and derives the movement mode. Never cached.
    ///
    /// Fails with [`RegisterError::UnknownParameter`] for device classes without angle limits.
    pub fn movement_mode<T: ControlTable>(
        &mut self,
        id: DeviceId,
    ) -> Result<MovementMode, Error<B::Error>> {
        let (cw, ccw) = T::ANGLE_LIMITS.ok_or_else(|| {
            RegisterError::UnknownParameter(format!("{} angle limits", T::DEVICE_CLASS))
        })?;
        let cw = self.read(id, cw)?;
        let ccw = self.read(id, ccw)?;
        Ok(MovementMode::from_angle_limits(cw, ccw))
    }

    /// Returns the accessors of the actuator at `id`.
    pub fn actuator(&mut self, id: DeviceId) -> Actuator<'_, B> {
        Actuator::new(self, id)
    }

    /// Returns the accessors of the sensor module at `id`.
    pub fn sensor(&mut self, id: DeviceId) -> Sensor<'_, B> {
        Sensor::new(self, id)
    }
}

/// Looks up the field starting at `address`, naming the word it falls into when it is a high byte.
fn field_at<T: ControlTable>(address: u8) -> Result<T, RegisterError> {
    T::from_address(address).map_err(|e| {
        if let Some(word) = T::FIELDS
            .iter()
            .map(|field| field.descriptor())
            .find(|d| d.occupies(address))
        {
            log::warn!(
                "{}: address {} is the high byte of {}, use address {}",
                T::DEVICE_CLASS,
                address,
                word.name,
                word.address
            );
        }
        e
    })
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::registers::{ActuatorField, Policy, SensorField};
    use crate::sim::{SimBus, SimError, Transaction};

    const ID: DeviceId = match DeviceId::new(1) {
        Some(id) => id,
        None => panic!(),
    };

    fn controller() -> Controller<SimBus> {
        Controller::new(SimBus::new().with_defaults::<ActuatorField>(ID))
    }

    #[test]
    fn goal_position_is_clamped() {
        let mut c = controller();
        assert_eq!(c.write(ID, ActuatorField::GoalPosition, -5).unwrap(), 0);
        assert_eq!(c.write(ID, ActuatorField::GoalPosition, 5000).unwrap(), 1023);
        assert_eq!(
            c.bus().transactions(),
            &[
                Transaction::WriteWord {
                    id: ID,
                    address: 30,
                    value: 0
                },
                Transaction::WriteWord {
                    id: ID,
                    address: 30,
                    value: 1023
                },
            ]
        );
    }

    #[test]
    fn rejected_value_is_not_sent() {
        let mut c = controller();
        let e = c.write(ID, ActuatorField::StatusReturnLevel, 7).unwrap_err();
        assert_eq!(
            e.register_error(),
            Some(&RegisterError::OutOfRange {
                field: "status return level",
                value: 7,
                min: 0,
                max: 3
            })
        );
        assert!(c.write(ID, ActuatorField::TorqueEnable, 2).is_err());
        assert!(c.bus().transactions().is_empty());
        assert_eq!(c.bus().peek_byte(ID, 16), Some(2));
    }

    fn check_policies<T: ControlTable>(id: DeviceId) {
        let mut c = Controller::new(SimBus::new().with_defaults::<T>(id));
        for field in T::FIELDS {
            let d = field.descriptor();
            match d.policy {
                Policy::Clamp { min, max } => {
                    let (min_raw, max_raw) = (min as RegisterValue, max as RegisterValue);
                    for k in [1, 5, 1000] {
                        let low = c.write(id, *field, min - k).unwrap();
                        let high = c.write(id, *field, max + k).unwrap();
                        assert_eq!((low, high), (min_raw, max_raw), "{}", d.name);
                    }
                    assert_eq!(c.bus_mut().take_transactions().len(), 6, "{}", d.name);
                }
                Policy::Reject { min, max } => {
                    assert!(c.write(id, *field, min - 1).is_err(), "{}", d.name);
                    assert!(c.write(id, *field, max + 1).is_err(), "{}", d.name);
                    assert!(c.bus().transactions().is_empty(), "{}", d.name);
                }
                Policy::Flag => {
                    assert!(c.write(id, *field, 2).is_err(), "{}", d.name);
                    assert!(c.write(id, *field, -1).is_err(), "{}", d.name);
                    assert!(c.bus().transactions().is_empty(), "{}", d.name);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn every_policy_field_clamps_or_refuses() {
        check_policies::<ActuatorField>(ID);
        check_policies::<SensorField>(DeviceId::new(100).unwrap());
    }

    #[test]
    fn read_only_is_not_sent() {
        let mut c = controller();
        let e = c.write(ID, ActuatorField::PresentPosition, 10).unwrap_err();
        assert_eq!(
            e.register_error(),
            Some(&RegisterError::ReadOnly("present position"))
        );
        assert!(c.bus().transactions().is_empty());
    }

    fn check_dispatch<T: ControlTable>(id: DeviceId) {
        let mut c = Controller::new(SimBus::new().with_defaults::<T>(id));
        for field in T::FIELDS {
            let d = field.descriptor();
            c.read(id, *field).unwrap();
            let expected = match d.width {
                Width::Byte => Transaction::ReadByte {
                    id,
                    address: d.address,
                },
                Width::Word => Transaction::ReadWord {
                    id,
                    address: d.address,
                },
            };
            assert_eq!(c.bus_mut().take_transactions(), vec![expected], "{}", d.name);

            if d.is_writable() {
                let raw = c.write(id, *field, 1).unwrap();
                let last = c.bus_mut().take_transactions().pop().unwrap();
                let expected = match d.width {
                    Width::Byte => Transaction::WriteByte {
                        id,
                        address: d.address,
                        value: raw as u8,
                    },
                    Width::Word => Transaction::WriteWord {
                        id,
                        address: d.address,
                        value: raw,
                    },
                };
                assert_eq!(last, expected, "{}", d.name);
            }
        }
    }

    #[test]
    fn width_dispatch_is_exhaustive() {
        check_dispatch::<ActuatorField>(ID);
        check_dispatch::<SensorField>(DeviceId::new(100).unwrap());
    }

    #[test]
    fn movement_mode_from_limits() {
        let mut c = controller();
        for (cw, ccw, mode) in [
            (0, 0, MovementMode::Wheel),
            (0, 1, MovementMode::Joint),
            (1, 0, MovementMode::Joint),
        ] {
            c.bus_mut().poke_word(ID, 6, cw);
            c.bus_mut().poke_word(ID, 8, ccw);
            assert_eq!(c.movement_mode::<ActuatorField>(ID).unwrap(), mode);
        }
        assert_eq!(
            c.bus().transactions().len(),
            6,
            "the mode is read again on every query"
        );
    }

    #[test]
    fn sensor_has_no_movement_mode() {
        let mut c = controller();
        assert!(matches!(
            c.movement_mode::<SensorField>(ID),
            Err(Error::Register(RegisterError::UnknownParameter(_)))
        ));
    }

    #[test]
    fn moving_speed_depends_on_mode() {
        let mut c = controller();
        c.bus_mut().poke_word(ID, 6, 0);
        c.bus_mut().poke_word(ID, 8, 0);
        assert_eq!(c.write(ID, ActuatorField::MovingSpeed, 1500).unwrap(), 1500);
        assert_eq!(
            c.bus_mut().take_transactions(),
            vec![
                Transaction::ReadWord { id: ID, address: 6 },
                Transaction::ReadWord { id: ID, address: 8 },
                Transaction::WriteWord {
                    id: ID,
                    address: 32,
                    value: 1500
                },
            ]
        );

        c.bus_mut().poke_word(ID, 8, 1023);
        assert_eq!(c.write(ID, ActuatorField::MovingSpeed, 1500).unwrap(), 1023);
    }

    #[test]
    fn toggle_reads_then_writes_complement() {
        let mut c = controller();
        assert!(c.toggle(ID, ActuatorField::TorqueEnable).unwrap());
        assert_eq!(
            c.bus_mut().take_transactions(),
            vec![
                Transaction::ReadByte {
                    id: ID,
                    address: 24
                },
                Transaction::WriteByte {
                    id: ID,
                    address: 24,
                    value: 1
                },
            ]
        );
        assert!(!c.toggle(ID, ActuatorField::TorqueEnable).unwrap());
        assert_eq!(c.bus().peek_byte(ID, 24), Some(0));

        // any non-zero value counts as set
        c.bus_mut().poke_byte(ID, 25, 7);
        assert!(!c.toggle(ID, ActuatorField::Led).unwrap());
        assert_eq!(c.bus().peek_byte(ID, 25), Some(0));
    }

    #[test]
    fn transport_errors_propagate() {
        let mut c = controller();
        c.bus_mut().fail_next();
        assert!(matches!(
            c.read(ID, ActuatorField::PresentLoad),
            Err(Error::Transport(SimError::Injected))
        ));
        let missing = DeviceId::new(9).unwrap();
        assert!(matches!(
            c.write(missing, ActuatorField::Led, 1),
            Err(Error::Transport(SimError::NoResponse(_)))
        ));
    }

    #[test]
    fn broadcast() {
        let other = DeviceId::new(2).unwrap();
        let mut c = Controller::new(
            SimBus::new()
                .with_defaults::<ActuatorField>(ID)
                .with_defaults::<ActuatorField>(other),
        );
        assert!(matches!(
            c.read(DeviceId::BROADCAST, ActuatorField::Led),
            Err(Error::BroadcastRead)
        ));
        assert!(c.bus().transactions().is_empty());

        c.write(DeviceId::BROADCAST, ActuatorField::Led, 1).unwrap();
        assert_eq!(c.read(ID, ActuatorField::Led).unwrap(), 1);
        assert_eq!(c.read(other, ActuatorField::Led).unwrap(), 1);

        // no reply to read the mode from, so the joint bound applies
        c.bus_mut().take_transactions();
        assert_eq!(
            c.write(DeviceId::BROADCAST, ActuatorField::MovingSpeed, 1500)
                .unwrap(),
            1023
        );
        assert_eq!(c.bus().transactions().len(), 1);
    }

    #[test]
    fn raw_addresses() {
        let mut c = controller();
        assert_eq!(c.read_address::<ActuatorField>(ID, 0).unwrap(), 12);
        assert_eq!(c.write_address::<ActuatorField>(ID, 30, 2000).unwrap(), 1023);
        assert!(matches!(
            c.read_address::<ActuatorField>(ID, 31),
            Err(Error::Register(RegisterError::UnknownAddress(31)))
        ));
    }

    #[test]
    fn toggles_under_a_lock_are_not_lost() {
        let bus = Arc::new(Mutex::new(
            SimBus::new().with_defaults::<ActuatorField>(ID),
        ));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let bus = Arc::clone(&bus);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let mut guard = bus.lock().unwrap();
                        Controller::new(&mut *guard)
                            .toggle(ID, ActuatorField::Led)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let bus = bus.lock().unwrap();
        assert_eq!(bus.transactions().len(), 200);
        assert_eq!(bus.peek_byte(ID, 25), Some(0));
        let writes: Vec<_> = bus
            .transactions()
            .iter()
            .filter(|t| t.is_write())
            .filter_map(|t| match t {
                Transaction::WriteByte { value, .. } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(writes.len(), 100);
        let alternating = writes.iter().enumerate().all(|(i, v)| *v == (i % 2 == 0) as u8);
        assert!(alternating, "{writes:?}");
    }
}
