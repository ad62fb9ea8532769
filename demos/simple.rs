//! Holds a single actuator at ID #1 in place and prints its state.
//!
//! Runs against the simulated bus, so the position only changes when written.
//! Pass `-v` or `-vv` to see the register traffic.

#[path = "_logging.rs"]
mod logging;

use dynamixel_control::sim::SimBus;
use dynamixel_control::{ActuatorField, Controller, DeviceId, Error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let verbosity = std::env::args()
        .filter(|a| a.starts_with("-v"))
        .map(|a| a.len() as i8 - 1)
        .sum();
    logging::init("simple", verbosity);

    let id = DeviceId::new(1).ok_or("invalid id")?;
    let mut c = Controller::new(SimBus::new().with_defaults::<ActuatorField>(id));
    c.bus_mut().poke_word(id, ActuatorField::PresentPosition as u8, 512);

    let mut servo = c.actuator(id);
    // hold the current position
    let position = servo.present_position()?;
    servo.set_goal_position(i32::from(position))?;
    if !servo.torque_enable_switch()? {
        servo.torque_enable_switch()?;
    }

    for _ in 0..10 {
        log::info!(
            "Position: {} ({}°), moving: {}",
            servo.present_position()?,
            servo.present_position_angular()?,
            servo.is_moving()?
        );
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    // refused before anything reaches the bus
    match servo.set_status_return_level(7) {
        Err(Error::Register(e)) => log::info!("refused: {e}"),
        other => log::warn!("unexpected: {other:?}"),
    }

    log::debug!("\n{}", c.bus());
    Ok(())
}
