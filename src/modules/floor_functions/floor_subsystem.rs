//! ## Floor subsystem
//! Replays a scenario of calls and fault injections into the scheduler and
//! keeps the per-floor call lamps. After a startup grace period (so the
//! peers get to bind their ports), every tick either consumes one ingress
//! message or emits the next due scenario event.

use std::io;
use std::path::Path;
use std::thread;

use chrono::{Local, NaiveTime};
use log::{debug, info};

use crate::modules::config;
use crate::modules::floor_object::floor_init::{Floor, LightState};
use crate::modules::request_object::issue_init::Issue;
use crate::modules::request_object::request_init::Request;
use crate::modules::udp_functions::receiver::MessageReceiver;
use crate::modules::udp_functions::udp::{
    init_udp_handler, msg_deserialize, SystemAddresses, UdpHandler, UdpMsg,
};

use super::scenario::read_scenario;

//----------------------------------------------Structs

pub struct FloorSubsystem {
    pub handler: UdpHandler,
    pub receiver: MessageReceiver,
    pub floors: Vec<Floor>,
    pub pending_calls: Vec<Request>,
    pub pending_issues: Vec<Issue>,
}

//----------------------------------------------Functions

impl FloorSubsystem {
    pub fn init(
        handler: UdpHandler,
        receiver: MessageReceiver,
        pending_calls: Vec<Request>,
        pending_issues: Vec<Issue>,
    ) -> FloorSubsystem {
        let floors = (0..config::TOTAL_FLOORS)
            .map(|floor_number| Floor::init(floor_number, config::TOTAL_ELEVATORS))
            .collect();

        FloorSubsystem {
            handler,
            receiver,
            floors,
            pending_calls,
            pending_issues,
        }
    }

    /// Parses the scenario (fatal on malformed input, before any socket is
    /// bound), binds the floor port and replays forever.
    pub fn run(addresses: SystemAddresses, scenario_path: &Path) -> io::Result<()> {
        let (pending_calls, pending_issues) = read_scenario(scenario_path)?;

        let receiver = MessageReceiver::init(config::FLOOR_SUBSYSTEM_PORT)?;
        let handler = init_udp_handler(addresses)?;
        let mut subsystem =
            FloorSubsystem::init(handler, receiver, pending_calls, pending_issues);

        info!(
            "floor subsystem listening on port {}, waiting for peers to bind",
            config::FLOOR_SUBSYSTEM_PORT
        );
        thread::sleep(config::PEER_BIND_GRACE);

        loop {
            subsystem.tick();
        }
    }

    /// One loop turn: ingress first, scenario replay when idle
    pub fn tick(&mut self) {
        match self.receiver.poll_timeout(config::POLL_PERIOD) {
            Some(payload) => self.check_message(&payload),
            None => {
                let now = Local::now().time();
                self.check_request(now);
                self.check_issues(now);
            }
        }
    }

    /// Lamp bookkeeping: arrivals turn a lamp off, dispatches turn it on.
    /// Either way the raw frame goes on to the view.
    pub fn check_message(&mut self, payload: &[u8]) {
        match msg_deserialize(payload) {
            Some(UdpMsg::ElevatorArrival { car, floor }) if self.valid(car, floor) => {
                info!(
                    "floor subsystem: elevator {} has arrived at floor {}",
                    car, floor
                );
                info!(
                    "floor subsystem: elevator {} request lamp is turned off at floor {}",
                    car, floor
                );
                self.floors[floor as usize]
                    .lamp
                    .set_light_state(car, LightState::Off);
                self.forward_to_view(payload);
            }
            Some(UdpMsg::RequestElevator { car, floor }) if self.valid(car, floor) => {
                info!(
                    "floor subsystem: elevator {} request lamp is turned on at floor {}",
                    car, floor
                );
                self.floors[floor as usize]
                    .lamp
                    .set_light_state(car, LightState::On);
                self.forward_to_view(payload);
            }
            _ => debug!("floor subsystem: dropped unreadable message"),
        }
    }

    fn valid(&self, car: u8, floor: u8) -> bool {
        car < config::TOTAL_ELEVATORS && (floor as usize) < self.floors.len()
    }

    fn forward_to_view(&self, payload: &[u8]) {
        self.handler.send_raw(self.handler.addresses.view, payload);
    }

    /// Sends the next call whose request time has passed, at most one
    pub fn check_request(&mut self, now: NaiveTime) {
        let due = match self.pending_calls.first() {
            Some(request) => request.request_time <= now,
            None => return,
        };
        if due {
            let request = self.pending_calls.remove(0);
            info!("floor subsystem: sending request - {}", request);
            self.handler.send_request(&request);
        }
    }

    /// Sends the next fault whose scheduled time has passed, at most one
    pub fn check_issues(&mut self, now: NaiveTime) {
        let due = match self.pending_issues.first() {
            Some(issue) => issue.scheduled_time <= now,
            None => return,
        };
        if due {
            let issue = self.pending_issues.remove(0);
            info!("floor subsystem: sending issue - {}", issue);
            self.handler
                .send(self.handler.addresses.scheduler, &issue.to_msg());
        }
    }
}
