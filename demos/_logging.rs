extern crate env_logger;

/// Register traffic of the simulated bus, logged at trace level for every transaction.
const SIM_TARGET: &str = "dynamixel_control::transport::sim";

/// `verbosity` 0 logs the demo, 1 adds clamped and refused writes, 2 adds every register access,
/// 3 adds the raw transactions of the simulated bus.
pub fn init(root_module: &str, verbosity: i8) {
    use std::io::Write;

    let (demo_level, crate_level) = match verbosity {
        0 => (log::LevelFilter::Info, log::LevelFilter::Warn),
        1 => (log::LevelFilter::Debug, log::LevelFilter::Debug),
        _ => (log::LevelFilter::Trace, log::LevelFilter::Trace),
    };
    let sim_level = if verbosity >= 3 {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Off
    };

    env_logger::Builder::new()
        .format(|buffer, record: &log::Record| {
            let prefix = match record.level() {
                log::Level::Trace if record.target() == SIM_TARGET => "bus: ",
                log::Level::Trace => "Trace: ",
                log::Level::Debug | log::Level::Info => "",
                log::Level::Warn => "Warning: ",
                log::Level::Error => "Error: ",
            };

            writeln!(
                buffer,
                "{} {:<28} {}{}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.target(),
                prefix,
                record.args(),
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .filter_module(root_module, demo_level)
        .filter_module("dynamixel_control", crate_level)
        .filter_module(SIM_TARGET, sim_level)
        .parse_default_env()
        .init();
}

#[allow(dead_code)]
fn main() {}
