//! Typed control-table access for Dynamixel AX-series devices ([AX-12](https://emanual.robotis.com/docs/en/dxl/ax/ax-12a/) actuators and [AX-S1](https://emanual.robotis.com/docs/en/dxl/ax/ax-s1/) sensor modules).
//!
//! Every parameter of a device lives in a byte or word register of its control table.
//! [`Controller`] reads and writes those registers over any [`DeviceBus`], picking the right
//! transaction width and applying each field's range policy before anything is sent.
//!
//! ```rust
//! # use dynamixel_control::{sim::SimBus, ActuatorField, Controller, DeviceId, MovementMode};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let id = DeviceId::new(1).ok_or("bad id")?;
//! let mut c = Controller::new(SimBus::new().with_defaults::<ActuatorField>(id));
//!
//! let mut servo = c.actuator(id);
//! servo.toggle_wheel_mode()?;
//! assert_eq!(servo.movement_mode()?, MovementMode::Wheel);
//! assert_eq!(servo.set_moving_speed(1500)?, 1500);
//! assert_eq!(servo.set_goal_position(5000)?, 1023);
//! # Ok(())
//! # }
//! ```

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true
)]
#![deny(
// missing_debug_implementations,
missing_docs,
trivial_casts,
trivial_numeric_casts,
unused_extern_crates,
unused_import_braces,
unused_qualifications,
// unused_results
)]
#![warn(clippy::unwrap_used)]

#[macro_use]
mod accessor_macros;

mod actuator;
mod bus;
mod error;
mod protocol;
mod sensor;
mod transport;

pub use actuator::Actuator;
pub use bus::Controller;
pub use error::*;
pub use protocol::registers::{
    Access, ActuatorField, ControlTable, Policy, RegisterDescriptor, SensorField,
};
pub use protocol::{registers, units, DeviceId, MovementMode, RegisterValue, Width};
pub use sensor::Sensor;
#[cfg(feature = "sim")]
pub use transport::sim;
pub use transport::DeviceBus;
