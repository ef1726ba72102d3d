use std::path::Path;

use heissim::modules::config;
use heissim::modules::floor_functions::floor_subsystem::FloorSubsystem;
use heissim::modules::udp_functions::udp::SystemAddresses;
use log::info;

fn main() -> std::io::Result<()> {
    env_logger::init();
    info!("booting floor subsystem");
    FloorSubsystem::run(
        SystemAddresses::local_default(),
        Path::new(config::SIMULATION_FILE),
    )
}
