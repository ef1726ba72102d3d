//! ## Scheduler
//! Receives requests from the floor subsystem, dispatches them to the
//! closest in-service car, tracks expected arrival times from the car
//! kinematics and declares cars stuck when an estimate runs out. The
//! scheduler owns a mirror of every car (current floor, next floor,
//! health, arrival estimate); the cars themselves only talk to it through
//! messages.
//!
//! The main loop is a four-state machine:
//! - **ReceivingMessage**: block on the priority queue and classify.
//! - **Scheduling**: dispatch pending requests one per tick, in order.
//! - **CheckElevatorStuck**: the ETA watchdog.
//! - **FixingElevatorError**: roll the repair chance for a reported door
//!   issue and either restore the car or ask it to hand its stops back.

use std::collections::VecDeque;
use std::io;
use std::time::Instant;

use log::{debug, error, info, warn};
use rand::Rng;

use crate::modules::cab_object::cab::Health;
use crate::modules::cab_object::cab_movement::travel_time;
use crate::modules::config;
use crate::modules::request_object::request_init::{Request, RequestType};
use crate::modules::udp_functions::receiver::MessageReceiver;
use crate::modules::udp_functions::udp::{
    init_udp_handler, msg_deserialize, msg_serialize, SystemAddresses, UdpHandler, UdpMsg,
};

//----------------------------------------------Structs

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    ReceivingMessage,
    Scheduling,
    CheckElevatorStuck,
    FixingElevatorError(u8),
}

pub struct Scheduler {
    pub state: SchedulerState,
    pub start_time: Instant,
    pub handler: UdpHandler,
    pub receiver: MessageReceiver,
    pub pending_requests: VecDeque<Request>,

    // Mirror of every car, indexed by elevator number
    pub current_floors: Vec<u8>,
    pub next_floors: Vec<u8>,
    pub health: Vec<Health>,
    pub estimated_arrivals: Vec<Option<Instant>>,
}

//----------------------------------------------Functions

/// The in-service car whose next floor is closest to `request_floor`,
/// lowest car number on ties. None when every car is out of service.
pub fn closest_in_service(next_floors: &[u8], health: &[Health], request_floor: u8) -> Option<usize> {
    let mut closest_elevator = None;
    let mut min_distance = u8::MAX;

    for car in 0..next_floors.len() {
        if health[car] == Health::OutOfService {
            continue;
        }
        let distance = next_floors[car].abs_diff(request_floor);
        if distance < min_distance {
            min_distance = distance;
            closest_elevator = Some(car);
        }
    }

    closest_elevator
}

/// Repair roll: a uniform `roll` in [0,1) against the repair probability
pub fn repair_succeeds(roll: f64, probability: f64) -> bool {
    roll <= probability
}

impl Scheduler {
    pub fn init(handler: UdpHandler, receiver: MessageReceiver) -> Scheduler {
        let total = config::TOTAL_ELEVATORS as usize;
        Scheduler {
            state: SchedulerState::ReceivingMessage,
            start_time: Instant::now(),
            handler,
            receiver,
            pending_requests: VecDeque::new(),
            current_floors: vec![0; total],
            next_floors: vec![0; total],
            health: vec![Health::InService; total],
            estimated_arrivals: vec![None; total],
        }
    }

    /// Binds the scheduler port and runs the state machine forever
    pub fn run(addresses: SystemAddresses) -> io::Result<()> {
        let receiver = MessageReceiver::init(config::SCHEDULER_PORT)?;
        let handler = init_udp_handler(addresses)?;
        let mut scheduler = Scheduler::init(handler, receiver);
        info!("scheduler listening on port {}", config::SCHEDULER_PORT);

        loop {
            scheduler.update_state();
        }
    }

    pub fn update_state(&mut self) {
        match self.state {
            SchedulerState::ReceivingMessage => {
                let payload = self.receiver.poll();
                self.check_message(&payload);
            }
            SchedulerState::Scheduling => self.check_request(),
            SchedulerState::CheckElevatorStuck => self.check_travel_time_arrival(),
            SchedulerState::FixingElevatorError(car) => self.fix_elevator_error(car),
        }
    }

    /// Classifies one ingress payload. Anything longer than three bytes is
    /// a candidate serialized request, the rest are tag frames.
    pub fn check_message(&mut self, payload: &[u8]) {
        if payload.len() > 3 {
            match Request::from_bytes(payload) {
                Some(request) => {
                    if request.floor_number >= config::TOTAL_FLOORS {
                        warn!(
                            "dropping request for out-of-range floor {}",
                            request.floor_number
                        );
                        return;
                    }
                    info!("scheduler: request received - {}", request);
                    self.pending_requests.push_back(request);
                    self.state = SchedulerState::Scheduling;
                }
                None => debug!("dropped unreadable message of {} bytes", payload.len()),
            }
            return;
        }

        let msg = match msg_deserialize(payload) {
            Some(msg) => msg,
            None => {
                debug!("dropped malformed tag frame {:?}", payload);
                return;
            }
        };

        match msg {
            UdpMsg::DoorIssue { car } if self.valid_car(car) => {
                warn!("scheduler: elevator {} is out of service (door issue)", car);
                self.mark_out_of_service(car as usize);
                self.forward_to_elevator(car, payload);
            }
            UdpMsg::ElevatorStuck { car } if self.valid_car(car) => {
                warn!("scheduler: elevator {} is out of service (stuck)", car);
                self.mark_out_of_service(car as usize);
                self.forward_to_elevator(car, payload);
                self.get_elevator_requests(car);
            }
            UdpMsg::ElevatorArrival { car, floor }
                if self.valid_car(car) && floor < config::TOTAL_FLOORS =>
            {
                self.handle_arrival(car as usize, floor, payload);
            }
            UdpMsg::FixElevatorError { car } if self.valid_car(car) => {
                self.state = SchedulerState::FixingElevatorError(car);
            }
            other => debug!("scheduler: dropping message with tag {}", other.tag()),
        }
    }

    fn valid_car(&self, car: u8) -> bool {
        (car as usize) < self.health.len()
    }

    /// Out-of-service cars are at rest from the mirror's point of view and
    /// keep no arrival estimate around to trip the watchdog later.
    fn mark_out_of_service(&mut self, car: usize) {
        self.health[car] = Health::OutOfService;
        self.next_floors[car] = self.current_floors[car];
        self.estimated_arrivals[car] = None;
    }

    fn forward_to_elevator(&self, car: u8, payload: &[u8]) {
        match self.handler.addresses.elevator(car) {
            Some(address) => {
                self.handler.send_raw(address, payload);
            }
            None => error!("no address known for elevator {}", car),
        }
    }

    /// Asks a subsystem to hand its remaining stops back as fresh requests
    fn get_elevator_requests(&self, car: u8) {
        info!("scheduler: asking elevator {} for its remaining stops", car);
        if let Some(address) = self.handler.addresses.elevator(car) {
            self.handler.send(address, &UdpMsg::GetElevatorRequest);
        }
    }

    fn handle_arrival(&mut self, car: usize, floor: u8, payload: &[u8]) {
        info!("scheduler: elevator {} arrived at floor {}", car, floor);

        // An arrival with no dispatch outstanding means the car has
        // drained its stops, mirror it as at rest
        if self.estimated_arrivals[car].is_none() {
            self.next_floors[car] = floor;
        }
        self.current_floors[car] = floor;
        self.estimated_arrivals[car] = None;

        self.handler.send_raw(self.handler.addresses.floor, payload);
        self.update_simulation_time();
    }

    /// Dispatches the oldest pending request, one per tick, then falls
    /// through to the stuck check once the list is drained.
    pub fn check_request(&mut self) {
        match self.pending_requests.pop_front() {
            Some(request) => self.schedule(&request),
            None => self.state = SchedulerState::CheckElevatorStuck,
        }
    }

    /// Nearest-car dispatch. Internal requests are pinned to their car,
    /// external ones go to the closest in-service car.
    pub fn schedule(&mut self, request: &Request) {
        let request_floor = request.floor_number;

        match request.request_type {
            RequestType::Internal => {
                let car = request.elevator_number;
                if !self.valid_car(car) {
                    warn!("dropping internal request for unknown elevator {}", car);
                    return;
                }
                if self.health[car as usize] == Health::OutOfService {
                    error!(
                        "unable to schedule internal request, elevator {} out of service",
                        car
                    );
                    return;
                }
                info!(
                    "scheduler: scheduled internal request for floor {} to elevator {}",
                    request_floor, car
                );
                self.dispatch_to(car as usize, request_floor);
            }
            RequestType::External => {
                match closest_in_service(&self.next_floors, &self.health, request_floor) {
                    Some(car) => {
                        info!(
                            "scheduler: scheduled request for floor {} to elevator {}",
                            request_floor, car
                        );
                        self.dispatch_to(car, request_floor);
                    }
                    None => {
                        error!("unable to schedule request, all elevators are out of service");
                    }
                }
            }
        }
    }

    /// Sends the stop order to the car and the floor subsystem (which
    /// turns the lamp on), then books the expected arrival.
    fn dispatch_to(&mut self, car: usize, floor: u8) {
        let msg = UdpMsg::RequestElevator {
            car: car as u8,
            floor,
        };
        self.forward_to_elevator(car as u8, &msg_serialize(&msg));
        self.handler.send(self.handler.addresses.floor, &msg);

        let estimate = self.arrival_estimate(car, floor);
        self.estimated_arrivals[car] = Some(estimate);
        self.next_floors[car] = floor;
    }

    /// Expected arrival: kinematic travel time plus a fixed slack for the
    /// datagram round trips, plus the car's remaining travel time when it
    /// is already on its way somewhere else.
    pub fn arrival_estimate(&self, car: usize, new_floor: u8) -> Instant {
        let distance = self.current_floors[car].abs_diff(new_floor);
        let now = Instant::now();
        let mut estimate = now
            + std::time::Duration::from_secs_f64(travel_time(distance))
            + config::NETWORK_DELAY_SLACK;

        if self.current_floors[car] != self.next_floors[car] {
            if let Some(previous) = self.estimated_arrivals[car] {
                if previous > now {
                    estimate += previous - now;
                }
            }
        }

        estimate
    }

    /// ETA watchdog: any in-service car still short of its booked floor
    /// past its estimate is declared stuck, taken out of service and asked
    /// to give its stops back.
    pub fn check_travel_time_arrival(&mut self) {
        let now = Instant::now();
        for car in 0..self.health.len() {
            if self.health[car] == Health::OutOfService {
                continue;
            }
            if self.current_floors[car] == self.next_floors[car] {
                continue;
            }
            if let Some(estimate) = self.estimated_arrivals[car] {
                if now >= estimate {
                    warn!("scheduler: elevator {} is out of service, elevator is stuck", car);
                    self.mark_out_of_service(car);
                    let stuck = UdpMsg::ElevatorStuck { car: car as u8 };
                    self.forward_to_elevator(car as u8, &msg_serialize(&stuck));
                    self.get_elevator_requests(car as u8);
                }
            }
        }
        self.state = SchedulerState::ReceivingMessage;
    }

    /// Repair roll for a reported door issue. On success the car returns
    /// to service, otherwise its stops are re-surfaced for re-dispatch.
    pub fn fix_elevator_error(&mut self, car: u8) {
        let roll = rand::thread_rng().gen::<f64>();
        self.resolve_repair(car, roll);
    }

    /// Deterministic half of the repair decision, split out for testing
    pub fn resolve_repair(&mut self, car: u8, roll: f64) {
        if !self.valid_car(car) {
            warn!("dropping repair attempt for unknown elevator {}", car);
            self.state = SchedulerState::CheckElevatorStuck;
            return;
        }

        if repair_succeeds(roll, config::REPAIR_PROBABILITY) {
            info!("scheduler: elevator {} is in service", car);
            self.health[car as usize] = Health::InService;
            if let Some(address) = self.handler.addresses.elevator(car) {
                self.handler.send(address, &UdpMsg::IssueFixed { car });
            }
        } else {
            warn!("scheduler: unable to repair elevator {}", car);
            self.get_elevator_requests(car);
        }

        self.state = SchedulerState::CheckElevatorStuck;
    }

    /// Once every in-service car is at rest the run is complete; the total
    /// time goes to the view.
    fn update_simulation_time(&mut self) {
        for car in 0..self.health.len() {
            if self.health[car] == Health::OutOfService {
                continue;
            }
            if self.current_floors[car] != self.next_floors[car] {
                return;
            }
        }

        let elapsed = self.start_time.elapsed().as_secs();
        info!("time taken to complete simulation(s): {}", elapsed);

        let msg = UdpMsg::TotalSimulationTime {
            seconds: elapsed.min(u8::MAX as u64) as u8,
        };
        self.handler.send(self.handler.addresses.view, &msg);
    }
}
