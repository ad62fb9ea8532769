use crate::bus::Controller;
use crate::protocol::registers::SensorField;
use crate::protocol::RegisterValue;
use crate::transport::DeviceBus;
use crate::{DeviceId, Error};

/// Accessors for one AX-S1 sensor module, returned by [`Controller::sensor`].
#[derive(Debug)]
pub struct Sensor<'a, B: DeviceBus> {
    controller: &'a mut Controller<B>,
    id: DeviceId,
}

impl<'a, B: DeviceBus> Sensor<'a, B> {
    pub(crate) fn new(controller: &'a mut Controller<B>, id: DeviceId) -> Self {
        Self { controller, id }
    }

    /// The id this facade talks to.
    pub fn device_id(&self) -> DeviceId {
        self.id
    }

    field_accessors! {
        SensorField {
            ModelNumber => model_number;
            FirmwareVersion => firmware_version;
            Id => id, set_id;
            BaudRate => baud_rate, set_baud_rate;
            ReturnDelayTime => return_delay_time, set_return_delay_time;
            StatusReturnLevel => status_return_level, set_status_return_level;
            IrLeftFireData => ir_left_fire_data;
            IrCenterFireData => ir_center_fire_data;
            IrRightFireData => ir_right_fire_data;
            LightLeftData => light_left_data;
            LightCenterData => light_center_data;
            LightRightData => light_right_data;
            IrObstacleDetected => ir_obstacle_detected;
            LightDetected => light_detected;
            SoundData => sound_data;
            SoundDataMaxHold => sound_data_max_hold, set_sound_data_max_hold;
            SoundDetectedCount => sound_detected_count, set_sound_detected_count;
            SoundDetectedTime => sound_detected_time, set_sound_detected_time;
            BuzzerData0 => buzzer_data_0, set_buzzer_data_0;
            BuzzerData1 => buzzer_data_1, set_buzzer_data_1;
            Registered => registered, set_registered;
            IrRemoconArrived => ir_remocon_arrived;
            Lock => lock, set_lock;
            RemoconRxData => remocon_rx_data;
            RemoconTxData => remocon_tx_data, set_remocon_tx_data;
            IrObstacleDetectCompare => ir_obstacle_detect_compare, set_ir_obstacle_detect_compare;
            LightDetectCompare => light_detect_compare, set_light_detect_compare;
        }
    }

    /// Reads any field starting at `address`.
    pub fn read_address(&mut self, address: u8) -> Result<RegisterValue, Error<B::Error>> {
        self.controller.read_address::<SensorField>(self.id, address)
    }

    /// Writes any field starting at `address`, through its write policy.
    pub fn write_address(
        &mut self,
        address: u8,
        value: i32,
    ) -> Result<RegisterValue, Error<B::Error>> {
        self.controller
            .write_address::<SensorField>(self.id, address, value)
    }

    /// The note the buzzer plays.
    pub fn current_buzzer_note(&mut self) -> Result<RegisterValue, Error<B::Error>> {
        self.buzzer_data_0()
    }

    /// Plays `note` for the current ringing time.
    pub fn play_buzzer_note(&mut self, note: i32) -> Result<RegisterValue, Error<B::Error>> {
        self.set_buzzer_data_0(note)
    }

    /// How long a note rings, in 0.1 s.
    pub fn buzzer_ringing_time(&mut self) -> Result<RegisterValue, Error<B::Error>> {
        self.buzzer_data_1()
    }

    /// Sets how long a note rings, in 0.1 s.
    pub fn set_buzzer_ringing_time(
        &mut self,
        tenths: i32,
    ) -> Result<RegisterValue, Error<B::Error>> {
        self.set_buzzer_data_1(tenths)
    }

    /// Clears the loudest sound recorded.
    pub fn reset_sound_data_max_hold(&mut self) -> Result<(), Error<B::Error>> {
        self.set_sound_data_max_hold(0)?;
        Ok(())
    }

    /// Whether the EEPROM area is locked.
    pub fn is_eeprom_locked(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.read_flag(self.id, SensorField::Lock)
    }

    /// Whether a registered instruction is waiting.
    pub fn is_instruction_registered(&mut self) -> Result<bool, Error<B::Error>> {
        self.controller.read_flag(self.id, SensorField::Registered)
    }
}
