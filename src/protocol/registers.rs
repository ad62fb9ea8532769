//! Control tables of the Dynamixel AX-series devices.
//!
//! Every device exposes its parameters as a fixed memory map: the control table. This module defines
//! one closed enum per device class ([`ActuatorField`] for the AX-12 actuator, [`SensorField`] for the
//! AX-S1 sensor module) and the [`ControlTable`] trait that lets [`crate::Controller`] read and write
//! any of them.
//!
//! Each field is described by a [`RegisterDescriptor`]: its address, its [`Width`], whether it can
//! be written, and the [`Policy`] used to validate a value before it goes on the bus.
//! A reference for the tables can be found in the
//! [AX-12 manual](https://emanual.robotis.com/docs/en/dxl/ax/ax-12a/#control-table) and the
//! [AX-S1 manual](https://emanual.robotis.com/docs/en/dxl/ax/ax-s1/#control-table).

use crate::protocol::{MovementMode, RegisterValue, Width};
use crate::RegisterError;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Whether a field can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Status and identification registers maintained by the device.
    ReadOnly,
    /// Configuration and command registers.
    ReadWrite,
}

/// What happens to a value before it is written to a field.
///
/// Clamping policies silently coerce the value into range, rejecting policies refuse the write.
/// Which one applies is fixed per field and mirrors the device firmware documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Written as given. The value must still fit the register.
    Unchecked,
    /// Coerced into `min..=max`.
    Clamp {
        /// Values below are raised to this
        min: i32,
        /// Values above are lowered to this
        max: i32,
    },
    /// Raised to the minimum, no upper bound apart from the register width.
    AtLeast(i32),
    /// Refused if outside `min..=max`.
    Reject {
        /// Smallest accepted value
        min: i32,
        /// Largest accepted value
        max: i32,
    },
    /// A boolean register: refused unless exactly 0 or 1.
    Flag,
    /// Coerced into `0..=max`, where `max` depends on the current [`MovementMode`].
    ModeClamp {
        /// Upper bound in [`MovementMode::Wheel`]
        wheel_max: i32,
        /// Upper bound in [`MovementMode::Joint`]
        joint_max: i32,
    },
}

impl Policy {
    /// Whether [`Policy::apply`] needs the current movement mode.
    pub const fn depends_on_mode(self) -> bool {
        matches!(self, Policy::ModeClamp { .. })
    }

    /// Returns the value to transmit for `value`, or the reason nothing must be transmitted.
    ///
    /// `mode` is only consulted by [`Policy::ModeClamp`]. When it is unknown the joint mode bound,
    /// which is the stricter one, is used.
    /// Whatever the policy, the result never exceeds the register width: a value that would have to
    /// be truncated is refused instead, since truncation would silently write something else.
    pub fn apply(
        self,
        descriptor: &RegisterDescriptor,
        value: i32,
        mode: Option<MovementMode>,
    ) -> Result<RegisterValue, RegisterError> {
        let out_of_range = |min, max| RegisterError::OutOfRange {
            field: descriptor.name,
            value,
            min,
            max,
        };
        let coerced = match self {
            Policy::Unchecked => value,
            Policy::Clamp { min, max } => value.clamp(min, max),
            Policy::AtLeast(min) => value.max(min),
            Policy::Reject { min, max } => {
                if value < min || value > max {
                    return Err(out_of_range(min, max));
                }
                value
            }
            Policy::Flag => {
                if value != 0 && value != 1 {
                    return Err(out_of_range(0, 1));
                }
                value
            }
            Policy::ModeClamp {
                wheel_max,
                joint_max,
            } => {
                let max = match mode.unwrap_or(MovementMode::Joint) {
                    MovementMode::Wheel => wheel_max,
                    MovementMode::Joint => joint_max,
                };
                value.clamp(0, max)
            }
        };
        if coerced != value {
            log::debug!("{}: clamped {} to {}", descriptor.name, value, coerced);
        }

        let width_max = descriptor.width.max();
        RegisterValue::try_from(coerced)
            .ok()
            .filter(|v| *v <= width_max)
            .ok_or_else(|| out_of_range(0, i32::from(width_max)))
    }
}

/// Describes a single field of a control table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterDescriptor {
    /// The name used in the device manual
    pub name: &'static str,
    /// Address of the field (of its low byte for word registers)
    pub address: u8,
    /// Number of bytes the field occupies
    pub width: Width,
    /// Whether the field can be written
    pub access: Access,
    /// Validation applied before writing
    pub policy: Policy,
    /// Factory default, if the manual documents one
    pub initial: Option<RegisterValue>,
}

impl RegisterDescriptor {
    /// The first address after the field.
    pub const fn end(&self) -> u16 {
        self.address as u16 + self.width.size() as u16
    }

    /// Whether `address` is one of the bytes of the field.
    pub const fn occupies(&self, address: u8) -> bool {
        address >= self.address && (address as u16) < self.end()
    }

    /// Whether the field can be written.
    pub const fn is_writable(&self) -> bool {
        matches!(self.access, Access::ReadWrite)
    }
}

/// A control table: the closed set of fields of one device class.
///
/// Implemented by the field enums of this module. The accessor in [`crate::Controller`] is generic
/// over this trait, so byte/word dispatch and validation are written once for every device class.
pub trait ControlTable: Copy + std::fmt::Debug + Eq + 'static {
    /// Name of the device class, used in log messages.
    const DEVICE_CLASS: &'static str;
    /// Every field of the table, in address order.
    const FIELDS: &'static [Self];
    /// The CW and CCW angle-limit fields that define the [`MovementMode`], if the class has them.
    const ANGLE_LIMITS: Option<(Self, Self)> = None;

    /// Returns the descriptor of the field.
    fn descriptor(self) -> RegisterDescriptor;

    /// Returns the field starting at `address`.
    fn from_address(address: u8) -> Result<Self, RegisterError>;

    /// Returns the field with the given manual name, ignoring ASCII case.
    fn from_name(name: &str) -> Result<Self, RegisterError> {
        Self::FIELDS
            .iter()
            .copied()
            .find(|field| field.descriptor().name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| RegisterError::UnknownParameter(name.to_owned()))
    }
}

control_table! {
    /// The control table of the AX-12 actuator.
    pub enum ActuatorField : "actuator", angle_limits(CwAngleLimit, CcwAngleLimit) {
        /// Model number of the device.
        ModelNumber = 0, "model number", Word, ReadOnly, Policy::Unchecked, Some(12);
        /// Firmware version.
        FirmwareVersion = 2, "version of firmware", Byte, ReadOnly, Policy::Unchecked, None;
        /// Id of the device on the bus.
        Id = 3, "id", Byte, ReadWrite, Policy::Clamp { min: 0, max: 254 }, Some(1);
        /// Baud rate index, the bus speed is 2000000 / (value + 1) bps.
        BaudRate = 4, "baud rate", Byte, ReadWrite, Policy::Clamp { min: 0, max: 254 }, Some(1);
        /// Delay before a status packet is returned, in units of 2 µs.
        ReturnDelayTime = 5, "return delay time", Byte, ReadWrite, Policy::Clamp { min: 0, max: 254 }, Some(250);
        /// Clockwise angle limit. Values above 2047 select multi-turn mode, so only the lower bound is checked.
        CwAngleLimit = 6, "cw angle limit", Word, ReadWrite, Policy::AtLeast(0), Some(0);
        /// Counter-clockwise angle limit.
        CcwAngleLimit = 8, "ccw angle limit", Word, ReadWrite, Policy::AtLeast(0), Some(1023);
        /// Temperature above which the overheating alarm triggers, in °C.
        HighestLimitTemperature = 11, "the highest limit temperature", Byte, ReadWrite, Policy::Unchecked, Some(70);
        /// Lower operating voltage bound, in 0.1 V.
        LowestLimitVoltage = 12, "the lowest limit voltage", Byte, ReadWrite, Policy::Clamp { min: 50, max: 250 }, Some(60);
        /// Upper operating voltage bound, in 0.1 V.
        HighestLimitVoltage = 13, "the highest limit voltage", Byte, ReadWrite, Policy::Clamp { min: 50, max: 250 }, Some(140);
        /// Torque limit loaded into [`ActuatorField::TorqueLimit`] at power on, in 0.1 %.
        MaxTorque = 14, "max torque", Word, ReadWrite, Policy::Clamp { min: 0, max: 1023 }, Some(1023);
        /// 0: reply to ping only, 1: reply to reads only, 2: reply to every instruction.
        StatusReturnLevel = 16, "status return level", Byte, ReadWrite, Policy::Reject { min: 0, max: 3 }, Some(2);
        /// Whether the LED blinks when an alarm is raised.
        AlarmLed = 17, "alarm led", Byte, ReadWrite, Policy::Flag, None;
        /// Bit mask of the errors that shut the torque off.
        AlarmShutdown = 18, "alarm shutdown", Byte, ReadWrite, Policy::Unchecked, Some(36);
        /// Whether the motor produces torque.
        TorqueEnable = 24, "torque enable", Byte, ReadWrite, Policy::Flag, Some(0);
        /// LED state.
        Led = 25, "led", Byte, ReadWrite, Policy::Unchecked, Some(0);
        /// Clockwise error tolerated around the goal position.
        CwComplianceMargin = 26, "cw compliance margin", Byte, ReadWrite, Policy::Clamp { min: 0, max: 255 }, Some(1);
        /// Counter-clockwise error tolerated around the goal position.
        CcwComplianceMargin = 27, "ccw compliance margin", Byte, ReadWrite, Policy::Clamp { min: 0, max: 255 }, Some(1);
        /// Clockwise torque slope near the goal, nominally a power of two from 2 to 128.
        CwComplianceSlope = 28, "cw compliance slope", Byte, ReadWrite, Policy::Clamp { min: 0, max: 255 }, Some(32);
        /// Counter-clockwise torque slope near the goal.
        CcwComplianceSlope = 29, "ccw compliance slope", Byte, ReadWrite, Policy::Clamp { min: 0, max: 255 }, Some(32);
        /// Target position, 0.29° per step.
        GoalPosition = 30, "goal position", Word, ReadWrite, Policy::Clamp { min: 0, max: 1023 }, None;
        /// Joint mode: 0.111 rpm per step. Wheel mode: 0.1 % of full power, bit 10 is the direction.
        MovingSpeed = 32, "moving speed", Word, ReadWrite, Policy::ModeClamp { wheel_max: 2047, joint_max: 1023 }, None;
        /// Output torque limit, in 0.1 %.
        TorqueLimit = 34, "torque limit", Word, ReadWrite, Policy::Clamp { min: 0, max: 1023 }, None;
        /// Current position, 0.29° per step.
        PresentPosition = 36, "present position", Word, ReadOnly, Policy::Unchecked, None;
        /// Current speed, bit 10 is the direction.
        PresentSpeed = 38, "present speed", Word, ReadOnly, Policy::Unchecked, None;
        /// Current load in 0.1 %, bit 10 is the direction.
        PresentLoad = 40, "present load", Word, ReadOnly, Policy::Unchecked, None;
        /// Current supply voltage, in 0.1 V.
        PresentVoltage = 42, "present voltage", Byte, ReadOnly, Policy::Unchecked, None;
        /// Current internal temperature, in °C.
        PresentTemperature = 43, "present temperature", Byte, ReadOnly, Policy::Unchecked, None;
        /// 1 while a registered instruction is waiting for an action instruction.
        Registered = 44, "registered", Byte, ReadOnly, Policy::Unchecked, Some(0);
        /// 1 while the actuator is moving.
        Moving = 46, "moving", Byte, ReadOnly, Policy::Unchecked, Some(0);
        /// Once set, the EEPROM area can no longer be modified until power off.
        Lock = 47, "lock", Byte, ReadWrite, Policy::Flag, Some(0);
        /// Minimum current driven into the motor when outside the compliance margin.
        Punch = 48, "punch", Word, ReadWrite, Policy::Clamp { min: 32, max: 1023 }, Some(32);
    }
}

control_table! {
    /// The control table of the AX-S1 sensor module.
    pub enum SensorField : "sensor" {
        /// Model number of the device.
        ModelNumber = 0, "model number", Word, ReadOnly, Policy::Unchecked, Some(13);
        /// Firmware version.
        FirmwareVersion = 2, "version of firmware", Byte, ReadOnly, Policy::Unchecked, None;
        /// Id of the device on the bus.
        Id = 3, "id", Byte, ReadWrite, Policy::Clamp { min: 0, max: 254 }, Some(100);
        /// Baud rate index.
        BaudRate = 4, "baud rate", Byte, ReadWrite, Policy::Clamp { min: 0, max: 254 }, Some(1);
        /// Delay before a status packet is returned, in units of 2 µs.
        ReturnDelayTime = 5, "return delay time", Byte, ReadWrite, Policy::Clamp { min: 0, max: 254 }, Some(250);
        /// 0: reply to ping only, 1: reply to reads only, 2: reply to every instruction.
        StatusReturnLevel = 16, "status return level", Byte, ReadWrite, Policy::Reject { min: 0, max: 3 }, Some(2);
        /// Reflected infrared on the left.
        IrLeftFireData = 26, "ir left fire data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Reflected infrared in the center.
        IrCenterFireData = 27, "ir center fire data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Reflected infrared on the right.
        IrRightFireData = 28, "ir right fire data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Ambient light on the left.
        LightLeftData = 29, "light left data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Ambient light in the center.
        LightCenterData = 30, "light center data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Ambient light on the right.
        LightRightData = 31, "light right data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Bit 0 left, bit 1 center, bit 2 right: set when the IR reading exceeds the compare value.
        IrObstacleDetected = 32, "ir obstacle detected", Byte, ReadOnly, Policy::Unchecked, None;
        /// Bit 0 left, bit 1 center, bit 2 right: set when the light reading exceeds the compare value.
        LightDetected = 33, "light detected", Byte, ReadOnly, Policy::Unchecked, None;
        /// Microphone level, sampled 3800 times per second. Silence reads around 128.
        SoundData = 35, "sound data", Byte, ReadOnly, Policy::Unchecked, None;
        /// Loudest level since the last reset.
        SoundDataMaxHold = 36, "sound data max hold", Byte, ReadWrite, Policy::Unchecked, None;
        /// Number of sounds detected.
        SoundDetectedCount = 37, "sound detected count", Byte, ReadWrite, Policy::Unchecked, None;
        /// Time of the last sound detection.
        SoundDetectedTime = 38, "sound detected time", Word, ReadWrite, Policy::Unchecked, None;
        /// Buzzer note index.
        BuzzerData0 = 40, "buzzer data 0", Byte, ReadWrite, Policy::Unchecked, None;
        /// Buzzer ringing time, in 0.1 s.
        BuzzerData1 = 41, "buzzer data 1", Byte, ReadWrite, Policy::Unchecked, None;
        /// 1 while a registered instruction is waiting for an action instruction.
        Registered = 44, "registered", Byte, ReadWrite, Policy::Unchecked, Some(0);
        /// Number of bytes received from the IR remote control and not read yet.
        IrRemoconArrived = 46, "ir remocon arrived", Byte, ReadOnly, Policy::Unchecked, Some(0);
        /// Once set, the EEPROM area can no longer be modified until power off.
        Lock = 47, "lock", Byte, ReadWrite, Policy::Flag, Some(0);
        /// Last data received from the IR remote control.
        RemoconRxData = 48, "remocon rx data", Word, ReadOnly, Policy::Unchecked, None;
        /// Data to transmit over IR.
        RemoconTxData = 50, "remocon tx data", Word, ReadWrite, Policy::Unchecked, None;
        /// Threshold used for [`SensorField::IrObstacleDetected`].
        IrObstacleDetectCompare = 52, "ir obstacle detect compare", Byte, ReadWrite, Policy::Unchecked, None;
        /// Threshold used for [`SensorField::LightDetected`].
        LightDetectCompare = 53, "light detect compare", Byte, ReadWrite, Policy::Unchecked, None;
    }
}
