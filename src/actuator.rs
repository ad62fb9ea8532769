use crate::bus::Controller;
use crate::protocol::registers::ActuatorField;
use crate::protocol::units::{self, Direction};
use crate::protocol::{MovementMode, RegisterValue};
use crate::transport::DeviceBus;
use crate::{DeviceId, Error};

/// Accessors for one AX-12 actuator, returned by [`Controller::actuator`].
///
/// Setters go through the write policy of their field, see [`ActuatorField`].
/// The derived operations issue several transactions and are not atomic.
#[derive(Debug)]
pub struct Actuator<'a, B: DeviceBus> {
    controller: &'a mut Controller<B>,
    id: DeviceId,
}

impl<'a, B: DeviceBus> Actuator<'a, B> {
    pub(crate) fn new(controller: &'a mut Controller<B>, id: DeviceId) -> Self {
        Self { controller, id }
    }

    /// The id this facade talks to.
    pub fn device_id(&self) -> DeviceId {
        self.id
    }

    field_accessors! {
        ActuatorField {
            ModelNumber => model_number;
            FirmwareVersion => firmware_version;
            Id => id, set_id;
            BaudRate => baud_rate, set_baud_rate;
            ReturnDelayTime => return_delay_time, set_return_delay_time;
            CwAngleLimit => cw_angle_limit, set_cw_angle_limit;
            CcwAngleLimit => ccw_angle_limit, set_ccw_angle_limit;
            HighestLimitTemperature => highest_limit_temperature, set_highest_limit_temperature;
            LowestLimitVoltage => lowest_limit_voltage, set_lowest_limit_voltage;
            HighestLimitVoltage => highest_limit_voltage, set_highest_limit_voltage;
            MaxTorque => max_torque, set_max_torque;
            StatusReturnLevel => status_return_level, set_status_return_level;
            AlarmLed => alarm_led, set_alarm_led;
            AlarmShutdown => alarm_shutdown, set_alarm_shutdown;
            TorqueEnable => torque_enable, set_torque_enable;
            Led => led, set_led;
            CwComplianceMargin => cw_compliance_margin, set_cw_compliance_margin;
            CcwComplianceMargin => ccw_compliance_margin, set_ccw_compliance_margin;
            CwComplianceSlope => cw_compliance_slope, set_cw_compliance_slope;
            CcwComplianceSlope => ccw_compliance_slope, set_ccw_compliance_slope;
            GoalPosition => goal_position, set_goal_position;
            MovingSpeed => moving_speed, set_moving_speed;
            TorqueLimit => torque_limit, set_torque_limit;
            PresentPosition => present_position;
            PresentSpeed => present_speed;
            PresentLoad => present_load;
            PresentVoltage => present_voltage;
            PresentTemperature => present_temperature;
            Registered => registered;
            Moving => moving;
            Lock => lock, set_lock;
            Punch => punch, set_punch;
        }
    }

    /// Reads any field starting at `address`.
    pub fn read_address(&mut self, address: u8) -> Result<RegisterValue, Error<B::Error>> {
        self.controller.read_address::<ActuatorField>(self.id, address)
    }

    /// Writes any field starting at `address`, through its write policy.
    pub fn write_address(
        &mut self,
        address: u8,
        value: i32,
    ) -> Result<RegisterValue, Error<B::Error>> {
        self.controller
            .write_address::<ActuatorField>(self.id, address, value)
    }

    /// Turns the torque off if it was on, on otherwise. Returns the new state.
    pub fn torque_enable_switch(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.toggle(self.id, ActuatorField::TorqueEnable)
    }

    /// Turns the LED off if it was on, on otherwise. Returns the new state.
    pub fn led_switch(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.toggle(self.id, ActuatorField::Led)
    }

    /// Reads both angle limits, see [`MovementMode::from_angle_limits`].
    pub fn movement_mode(&mut self) -> Result<MovementMode, Error<B::Error>> {
        self.controller.movement_mode::<ActuatorField>(self.id)
    }

    /// Switches to wheel mode by writing 0 to both angle limits.
    pub fn toggle_wheel_mode(&mut self) -> Result<(), Error<B::Error>> {
        self.set_cw_angle_limit(0)?;
        self.set_ccw_angle_limit(0)?;
        Ok(())
    }

    /// Switches to joint mode between `cw` and `ccw`. Each limit is raised to 0 on its own.
    ///
    /// Returns the limits transmitted. Passing 0 for both selects wheel mode.
    pub fn toggle_joint_mode(
        &mut self,
        cw: i32,
        ccw: i32,
    ) -> Result<(RegisterValue, RegisterValue), Error<B::Error>> {
        let cw = self.set_cw_angle_limit(cw)?;
        let ccw = self.set_ccw_angle_limit(ccw)?;
        Ok((cw, ccw))
    }

    /// Sets the wheel mode speed from a direction and a magnitude in `0..=1023`.
    pub fn set_wheel_speed(
        &mut self,
        direction: Direction,
        magnitude: RegisterValue,
    ) -> Result<RegisterValue, Error<B::Error>> {
        let raw = units::join_direction(direction, magnitude);
        self.set_moving_speed(i32::from(raw))
    }

    /// The present speed as a direction and a magnitude.
    pub fn present_speed_directed(
        &mut self,
    ) -> Result<(Direction, RegisterValue), Error<B::Error>> {
        Ok(units::split_direction(self.present_speed()?))
    }

    /// The present load as a direction and a magnitude, in 0.1 %.
    pub fn present_load_directed(
        &mut self,
    ) -> Result<(Direction, RegisterValue), Error<B::Error>> {
        Ok(units::split_direction(self.present_load()?))
    }

    /// Whether the actuator is moving.
    pub fn is_moving(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.read_flag(self.id, ActuatorField::Moving)
    }

    /// Whether a registered instruction is waiting.
    pub fn is_instruction_registered(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.read_flag(self.id, ActuatorField::Registered)
    }

    /// Whether the EEPROM area is locked.
    pub fn is_eeprom_locked(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.read_flag(self.id, ActuatorField::Lock)
    }

    /// The goal position in whole degrees.
    pub fn goal_position_angular(&mut self) -> Result<i32, Error<B::Error>> {
        Ok(units::angular_from_raw(self.goal_position()?))
    }

    /// Sets the goal position from whole degrees. The position is clamped like
    /// [`Actuator::set_goal_position`], so angles past 296° go to the end stop.
    pub fn set_goal_position_angular(
        &mut self,
        angle: i32,
    ) -> Result<RegisterValue, Error<B::Error>> {
        self.set_goal_position(units::raw_from_angular(angle))
    }

    /// The present position in whole degrees.
    pub fn present_position_angular(&mut self) -> Result<i32, Error<B::Error>> {
        Ok(units::angular_from_raw(self.present_position()?))
    }
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::sim::{SimBus, Transaction};

    const ID: DeviceId = match DeviceId::new(1) {
        Some(id) => id,
        None => panic!(),
    };

    fn controller() -> Controller<SimBus> {
        Controller::new(SimBus::new().with_defaults::<ActuatorField>(ID))
    }

    #[test]
    fn setters_clamp() {
        let mut c = controller();
        let mut a = c.actuator(ID);
        assert_eq!(a.set_goal_position(-5).unwrap(), 0);
        assert_eq!(a.set_goal_position(5000).unwrap(), 1023);
        assert_eq!(a.set_lowest_limit_voltage(0).unwrap(), 50);
        assert_eq!(a.set_punch(1).unwrap(), 32);
        assert_eq!(a.set_torque_limit(4000).unwrap(), 1023);
        assert_eq!(a.goal_position().unwrap(), 1023);
    }

    #[test]
    fn status_return_level_is_rejected() {
        let mut c = controller();
        assert!(c.actuator(ID).set_status_return_level(7).is_err());
        assert!(c.actuator(ID).set_torque_enable(-1).is_err());
        assert!(c.bus().transactions().is_empty());
    }

    #[test]
    fn torque_switch() {
        let mut c = controller();
        assert!(c.actuator(ID).torque_enable_switch().unwrap());
        assert_eq!(c.bus().transactions().len(), 2);
        assert_eq!(c.actuator(ID).torque_enable().unwrap(), 1);
        assert!(!c.actuator(ID).torque_enable_switch().unwrap());
        assert!(c.actuator(ID).led_switch().unwrap());
        assert_eq!(c.bus().peek_byte(ID, 25), Some(1));
    }

    #[test]
    fn mode_switches() {
        let mut c = controller();
        let mut a = c.actuator(ID);
        assert_eq!(a.movement_mode().unwrap(), MovementMode::Joint);

        a.toggle_wheel_mode().unwrap();
        assert_eq!(a.movement_mode().unwrap(), MovementMode::Wheel);
        assert_eq!(a.set_moving_speed(1500).unwrap(), 1500);

        assert_eq!(a.toggle_joint_mode(-10, 800).unwrap(), (0, 800));
        assert_eq!(a.movement_mode().unwrap(), MovementMode::Joint);
        assert_eq!(a.set_moving_speed(1500).unwrap(), 1023);

        assert_eq!(a.toggle_joint_mode(0, 0).unwrap(), (0, 0));
        assert_eq!(a.movement_mode().unwrap(), MovementMode::Wheel);
    }

    #[test]
    fn wheel_mode_writes_both_limits() {
        let mut c = controller();
        c.actuator(ID).toggle_wheel_mode().unwrap();
        assert_eq!(
            c.bus().transactions(),
            &[
                Transaction::WriteWord {
                    id: ID,
                    address: 6,
                    value: 0
                },
                Transaction::WriteWord {
                    id: ID,
                    address: 8,
                    value: 0
                },
            ]
        );
    }

    #[test]
    fn directed_speed() {
        let mut c = controller();
        c.actuator(ID).toggle_wheel_mode().unwrap();
        assert_eq!(
            c.actuator(ID).set_wheel_speed(Direction::Cw, 300).unwrap(),
            1324
        );
        c.bus_mut().poke_word(ID, 38, 1024 + 512);
        c.bus_mut().poke_word(ID, 40, 100);
        assert_eq!(
            c.actuator(ID).present_speed_directed().unwrap(),
            (Direction::Cw, 512)
        );
        assert_eq!(
            c.actuator(ID).present_load_directed().unwrap(),
            (Direction::Ccw, 100)
        );
    }

    #[test]
    fn flags() {
        let mut c = controller();
        assert!(!c.actuator(ID).is_moving().unwrap());
        c.bus_mut().poke_byte(ID, 46, 1);
        c.bus_mut().poke_byte(ID, 44, 1);
        assert!(c.actuator(ID).is_moving().unwrap());
        assert!(c.actuator(ID).is_instruction_registered().unwrap());

        assert!(!c.actuator(ID).is_eeprom_locked().unwrap());
        c.actuator(ID).set_lock(1).unwrap();
        assert!(c.actuator(ID).is_eeprom_locked().unwrap());
    }

    #[test]
    fn angular_positions() {
        let mut c = controller();
        let mut a = c.actuator(ID);
        assert_eq!(a.set_goal_position_angular(100).unwrap(), 344);
        assert_eq!(a.goal_position_angular().unwrap(), 99);
        assert_eq!(a.set_goal_position_angular(400).unwrap(), 1023);
        assert_eq!(a.set_goal_position_angular(-30).unwrap(), 0);

        c.bus_mut().poke_word(ID, 36, 512);
        assert_eq!(c.actuator(ID).present_position_angular().unwrap(), 148);
    }

    #[test]
    fn raw_address_access() {
        let mut c = controller();
        let mut a = c.actuator(ID);
        assert_eq!(a.read_address(0).unwrap(), 12);
        assert_eq!(a.write_address(48, 0).unwrap(), 32);
        assert!(a.read_address(1).is_err());
        assert_eq!(a.device_id(), ID);
    }

    #[test]
    fn read_only_fields_have_no_setter_but_still_refuse() {
        let mut c = controller();
        assert!(c.actuator(ID).write_address(36, 10).is_err());
        assert_eq!(c.actuator(ID).model_number().unwrap(), 12);
    }
}
