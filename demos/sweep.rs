//! Sweeps two actuators between two angles, then spins them in wheel mode.
//!
//! Shows broadcast writes, angular positions and the mode-dependent speed limit.
//! The simulated bus is shared behind a mutex, as it would be between threads on real hardware.

#[path = "_logging.rs"]
mod logging;

use std::sync::Mutex;

use dynamixel_control::sim::SimBus;
use dynamixel_control::units::Direction;
use dynamixel_control::{ActuatorField, Controller, DeviceId};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("sweep", 1);

    let ids = [1, 2]
        .into_iter()
        .map(|id| DeviceId::new(id).ok_or("invalid id"))
        .collect::<Result<Vec<_>, _>>()?;
    let bus = Mutex::new(
        ids.iter()
            .fold(SimBus::new(), |bus, id| bus.with_defaults::<ActuatorField>(*id)),
    );

    {
        let mut guard = bus.lock().map_err(|_| "bus poisoned")?;
        let mut c = Controller::new(&mut *guard);
        c.write(DeviceId::BROADCAST, ActuatorField::TorqueEnable, 1)?;
        c.write(DeviceId::BROADCAST, ActuatorField::MovingSpeed, 200)?;
    }

    let elapsed = std::time::Instant::now();
    while elapsed.elapsed().as_secs() < 2 {
        let angle = if elapsed.elapsed().as_millis() % 1000 < 500 {
            60
        } else {
            240
        };
        let mut guard = bus.lock().map_err(|_| "bus poisoned")?;
        let mut c = Controller::new(&mut *guard);
        for id in &ids {
            let mut servo = c.actuator(*id);
            let raw = servo.set_goal_position_angular(angle)?;
            log::info!("{id}: goal {angle}° ({raw}), now at {}°", servo.goal_position_angular()?);
        }
        drop(guard);
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    let mut guard = bus.lock().map_err(|_| "bus poisoned")?;
    let mut c = Controller::new(&mut *guard);
    for id in &ids {
        let mut servo = c.actuator(*id);
        log::info!("{id}: joint mode speed 1500 -> {}", servo.set_moving_speed(1500)?);
        servo.toggle_wheel_mode()?;
        log::info!("{id}: wheel mode speed 1500 -> {}", servo.set_moving_speed(1500)?);
        servo.set_wheel_speed(Direction::Cw, 512)?;
        servo.toggle_joint_mode(0, 1023)?;
    }
    Ok(())
}
