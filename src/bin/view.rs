//! Console stand-in for the elevator view: decodes and logs every frame
//! the other subsystems forward to the visualization port.

use heissim::modules::config;
use heissim::modules::request_object::request_init::Request;
use heissim::modules::udp_functions::receiver::MessageReceiver;
use heissim::modules::udp_functions::udp::msg_deserialize;
use log::{debug, info};

fn main() -> std::io::Result<()> {
    env_logger::init();

    let receiver = MessageReceiver::init(config::ELEVATOR_VIEW_PORT)?;
    info!(
        "elevator view listening on port {}",
        config::ELEVATOR_VIEW_PORT
    );

    loop {
        let payload = receiver.poll();
        if payload.len() > 3 {
            if let Some(request) = Request::from_bytes(&payload) {
                info!("view: {}", request);
                continue;
            }
        }
        match msg_deserialize(&payload) {
            Some(msg) => info!("view: {:?}", msg),
            None => debug!("view: dropped unreadable message"),
        }
    }
}
