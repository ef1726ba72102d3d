//! ## Elevator subsystem
//! One instance runs per car, each with its own ingress port and priority
//! queue. The subsystem is a single-threaded state machine:
//!
//! - **ReceivingMessage**: handle one non-request message (faults, fixes,
//!   stop re-surfacing), then absorb every queued `REQUEST_ELEVATOR` into
//!   the car's pending stops.
//! - **MovingElevator**: sort the stops into sweep order, pop the first
//!   and drive there. Out-of-service cars do not move.
//! - **NewFloor**: cycle the doors, report the arrival to the scheduler
//!   and the running average travel time to the view.

use std::io;

use chrono::Local;
use log::{debug, info, warn};

use crate::modules::cab_object::cab::{Cab, Health, Motion};
use crate::modules::request_object::request_init::{Direction, Request, RequestType};
use crate::modules::udp_functions::receiver::MessageReceiver;
use crate::modules::udp_functions::udp::{
    init_udp_handler, msg_deserialize, SystemAddresses, UdpHandler, UdpMsg, REQUEST_ELEVATOR,
};

//----------------------------------------------Structs

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubsystemState {
    ReceivingMessage,
    MovingElevator,
    NewFloor,
}

pub struct ElevatorSubsystem {
    pub state: SubsystemState,
    pub cab: Cab,
    pub handler: UdpHandler,
    pub receiver: MessageReceiver,
}

//----------------------------------------------Functions

impl ElevatorSubsystem {
    pub fn init(
        cab: Cab,
        handler: UdpHandler,
        receiver: MessageReceiver,
    ) -> ElevatorSubsystem {
        ElevatorSubsystem {
            state: SubsystemState::ReceivingMessage,
            cab,
            handler,
            receiver,
        }
    }

    /// Binds the car's ingress port and runs the state machine forever
    pub fn run(car: u8, num_floors: u8, addresses: SystemAddresses) -> io::Result<()> {
        let port = addresses
            .elevator(car)
            .map(|address| address.port())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "no address for elevator")
            })?;
        let receiver = MessageReceiver::init(port)?;
        let handler = init_udp_handler(addresses)?;

        let mut subsystem = ElevatorSubsystem::init(Cab::init(car, num_floors), handler, receiver);
        info!("elevator subsystem {} listening on port {}", car, port);

        loop {
            subsystem.update_state();
        }
    }

    pub fn update_state(&mut self) {
        match self.state {
            SubsystemState::ReceivingMessage => self.receiving_message(),
            SubsystemState::MovingElevator => self.moving_elevator(),
            SubsystemState::NewFloor => self.new_floor(),
        }
    }

    /// Handles one non-request message, then drains all queued stop
    /// requests into the car.
    fn receiving_message(&mut self) {
        if let Some(payload) = self.receiver.poll_except(REQUEST_ELEVATOR) {
            self.check_message(&payload);
        }

        self.absorb_request_floors();

        if !self.cab.pending_stops.is_empty() {
            self.state = SubsystemState::MovingElevator;
        }
    }

    fn absorb_request_floors(&mut self) {
        for payload in self.receiver.take_matching(REQUEST_ELEVATOR) {
            match msg_deserialize(&payload) {
                Some(UdpMsg::RequestElevator { floor, .. }) if floor < self.cab.num_floors => {
                    info!(
                        "elevator {}: stop requested at floor {}",
                        self.cab.number, floor
                    );
                    self.cab.pending_stops.push(floor);
                }
                _ => debug!("elevator {}: dropped malformed request message", self.cab.number),
            }
        }
    }

    fn check_message(&mut self, payload: &[u8]) {
        let msg = match msg_deserialize(payload) {
            Some(msg) => msg,
            None => {
                debug!("elevator {}: dropped unreadable message", self.cab.number);
                return;
            }
        };

        match msg {
            UdpMsg::DoorIssue { .. } => {
                self.cab.set_health(Health::OutOfService);
                self.forward_to_view(payload);
                self.send_attempt_fix();
            }
            UdpMsg::ElevatorStuck { .. } => {
                self.cab.set_health(Health::OutOfService);
                self.forward_to_view(payload);
            }
            UdpMsg::IssueFixed { .. } => {
                self.cab.set_health(Health::InService);
                self.forward_to_view(payload);
            }
            UdpMsg::GetElevatorRequest => {
                self.resurface_pending_stops();
            }
            other => {
                debug!(
                    "elevator {}: ignoring message with tag {}",
                    self.cab.number,
                    other.tag()
                );
            }
        }
    }

    /// Asks the scheduler to try a repair after a door issue
    fn send_attempt_fix(&self) {
        info!(
            "elevator {}: asking scheduler to fix door issue",
            self.cab.number
        );
        let msg = UdpMsg::FixElevatorError {
            car: self.cab.number,
        };
        self.handler.send(self.handler.addresses.scheduler, &msg);
    }

    /// Hands every pending stop back to the scheduler as a fresh external
    /// request, for when this car stays out of service.
    fn resurface_pending_stops(&mut self) {
        warn!(
            "elevator {}: returning {} pending stops to the scheduler",
            self.cab.number,
            self.cab.pending_stops.len()
        );

        let now = Local::now().time();
        for &stop in &self.cab.pending_stops {
            let request = Request::init(
                stop,
                self.cab.number,
                Direction::Up,
                now,
                RequestType::External,
            );
            self.handler.send_request(&request);
        }
        self.cab.pending_stops.clear();
    }

    fn forward_to_view(&self, payload: &[u8]) {
        self.handler
            .send_raw(self.handler.addresses.view, payload);
    }

    /// Drives to the next stop of the sweep, if the car may move at all
    fn moving_elevator(&mut self) {
        if self.cab.pending_stops.is_empty() || self.cab.health == Health::OutOfService {
            if self.cab.pending_stops.is_empty() {
                self.cab.motion = Motion::Idle;
            }
            self.state = SubsystemState::ReceivingMessage;
            return;
        }

        match self.cab.next_stop() {
            Some(stop) => {
                info!(
                    "elevator {}: moving from floor {} to floor {}",
                    self.cab.number, self.cab.current_floor, stop
                );
                self.cab.motion = Motion::ServicingStop;
                self.cab.travel_to(stop);
                self.state = SubsystemState::NewFloor;
            }
            None => {
                // Every stop collapsed onto the current floor
                self.cab.motion = Motion::Idle;
                self.state = SubsystemState::ReceivingMessage;
            }
        }
    }

    /// Door cycle plus arrival report and travel-time telemetry
    fn new_floor(&mut self) {
        info!(
            "elevator {}: arrived at floor {}",
            self.cab.number, self.cab.current_floor
        );
        self.cab.cycle_doors();

        let arrival = UdpMsg::ElevatorArrival {
            car: self.cab.number,
            floor: self.cab.current_floor,
        };
        self.handler.send(self.handler.addresses.scheduler, &arrival);

        let telemetry = UdpMsg::AverageTravelTime {
            car: self.cab.number,
            seconds: self.cab.average_travel_time(),
        };
        self.handler.send(self.handler.addresses.view, &telemetry);

        self.cab.motion = if self.cab.pending_stops.is_empty() {
            Motion::Idle
        } else {
            Motion::Moving
        };
        self.state = SubsystemState::MovingElevator;
    }
}
