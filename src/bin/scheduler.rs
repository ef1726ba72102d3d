use heissim::modules::scheduler_functions::scheduler::Scheduler;
use heissim::modules::udp_functions::udp::SystemAddresses;
use log::info;

fn main() -> std::io::Result<()> {
    env_logger::init();
    info!("booting scheduler");
    Scheduler::run(SystemAddresses::local_default())
}
