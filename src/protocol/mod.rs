#[macro_use]
mod register_macros;
pub mod registers;
pub mod units;

/// The raw contents of a register. Byte registers only ever hold `0..=255`.
pub type RegisterValue = u16;

/// Identifies a device on the bus.
///
/// Ids `0..=253` address a single device, [`DeviceId::BROADCAST`] addresses all of them at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DeviceId(u8);

impl DeviceId {
    /// Writes sent to this id are applied by every device and never acknowledged.
    pub const BROADCAST: DeviceId = DeviceId(254);

    /// Returns `None` for 255, which is not a valid id.
    ///
    /// ```rust
    /// # use dynamixel_control::DeviceId;
    /// const SHOULDER: DeviceId = match DeviceId::new(1) {
    ///     Some(id) => id,
    ///     None => panic!(),
    /// };
    /// assert!(!SHOULDER.is_broadcast());
    /// ```
    pub const fn new(id: u8) -> Option<Self> {
        if id > Self::BROADCAST.0 {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Whether this is [`DeviceId::BROADCAST`].
    pub const fn is_broadcast(self) -> bool {
        self.0 == Self::BROADCAST.0
    }

    /// The id as sent on the wire.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<DeviceId> for u8 {
    fn from(id: DeviceId) -> u8 {
        id.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_broadcast() {
            write!(f, "broadcast")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Number of bytes a register occupies in the control table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// One byte at the field address.
    Byte,
    /// Two bytes, low byte at the field address and high byte right after it.
    Word,
}

impl Width {
    /// Returns the number of bytes.
    pub const fn size(self) -> u8 {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
        }
    }

    /// The largest value the register can hold.
    pub const fn max(self) -> RegisterValue {
        match self {
            Width::Byte => u8::MAX as RegisterValue,
            Width::Word => u16::MAX,
        }
    }
}

/// How an actuator moves, derived from its angle limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementMode {
    /// Continuous rotation. Both angle limits are 0.
    Wheel,
    /// Position control between the angle limits.
    Joint,
}

impl MovementMode {
    /// Wheel mode iff both limits are 0.
    pub const fn from_angle_limits(cw: RegisterValue, ccw: RegisterValue) -> Self {
        if cw == 0 && ccw == 0 {
            MovementMode::Wheel
        } else {
            MovementMode::Joint
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_range() {
        assert_eq!(DeviceId::new(0).map(DeviceId::get), Some(0));
        assert_eq!(DeviceId::new(253).map(DeviceId::get), Some(253));
        assert_eq!(DeviceId::new(254), Some(DeviceId::BROADCAST));
        assert_eq!(DeviceId::new(255), None);
        assert!(DeviceId::BROADCAST.is_broadcast());
        assert_eq!(DeviceId::BROADCAST.to_string(), "broadcast");
        assert_eq!(DeviceId::new(7).map(|id| id.to_string()), Some("#7".into()));
    }

    #[test]
    fn movement_mode_boundaries() {
        assert_eq!(MovementMode::from_angle_limits(0, 0), MovementMode::Wheel);
        assert_eq!(MovementMode::from_angle_limits(0, 1), MovementMode::Joint);
        assert_eq!(MovementMode::from_angle_limits(1, 0), MovementMode::Joint);
    }

    #[test]
    fn width_domain() {
        assert_eq!(Width::Byte.max(), 255);
        assert_eq!(Width::Word.max(), 65535);
        assert_eq!(Width::Word.size(), 2);
    }
}
