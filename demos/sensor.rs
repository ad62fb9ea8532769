//! Reads the sensor module at ID #100 and plays a note when an obstacle shows up.

#[path = "_logging.rs"]
mod logging;

use dynamixel_control::sim::SimBus;
use dynamixel_control::{Controller, DeviceId, SensorField};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("sensor", 0);

    let id = DeviceId::new(100).ok_or("invalid id")?;
    let mut c = Controller::new(SimBus::new().with_defaults::<SensorField>(id));
    c.sensor(id).set_buzzer_ringing_time(3)?;

    for step in 0u8..6 {
        // something approaches from the left
        c.bus_mut()
            .poke_byte(id, SensorField::IrLeftFireData as u8, step * 40);
        c.bus_mut().poke_byte(
            id,
            SensorField::IrObstacleDetected as u8,
            u8::from(step >= 3),
        );

        let mut s = c.sensor(id);
        let left = s.ir_left_fire_data()?;
        let obstacles = s.ir_obstacle_detected()?;
        log::info!("ir left {left}, obstacles {obstacles:03b}");
        if obstacles & 0b001 != 0 {
            s.play_buzzer_note(i32::from(step) * 4)?;
        }
    }

    let mut s = c.sensor(id);
    log::info!("last note {}", s.current_buzzer_note()?);
    s.reset_sound_data_max_hold()?;
    Ok(())
}
