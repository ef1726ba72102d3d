use std::thread::spawn;

use heissim::modules::config;
use heissim::modules::elevator_functions::elevator_subsystem::ElevatorSubsystem;
use heissim::modules::udp_functions::udp::SystemAddresses;
use log::{error, info};

fn main() {
    env_logger::init();
    info!("booting {} elevator subsystems", config::TOTAL_ELEVATORS);

    let mut handles = Vec::new();
    for car in 0..config::TOTAL_ELEVATORS {
        let addresses = SystemAddresses::local_default();
        handles.push(spawn(move || {
            if let Err(e) = ElevatorSubsystem::run(car, config::TOTAL_FLOORS, addresses) {
                error!("elevator subsystem {} failed to start: {}", car, e);
            }
        }));
    }

    for handle in handles {
        let _ = handle.join();
    }
}
