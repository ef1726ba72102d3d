use std::fmt;

use log::{info, warn};

use crate::modules::request_object::request_init::Direction;

//----------------------------------------------Enums

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Health {
    InService,
    OutOfService,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Moving,
    ServicingStop,
}

//----------------------------------------------Structs

/// One elevator car. Owned exclusively by its subsystem; everyone else
/// learns about it through messages.
#[derive(Clone, Debug, PartialEq)]
pub struct Cab {
    pub number: u8,
    pub num_floors: u8,
    pub current_floor: u8,
    pub direction: Direction,
    pub door_state: DoorState,
    pub health: Health,
    pub motion: Motion,
    pub pending_stops: Vec<u8>,

    // Travel statistics backing the average-travel-time telemetry
    pub num_requests: u32,
    pub total_travel_time: u32,
}

impl Cab {
    pub fn init(number: u8, num_floors: u8) -> Cab {
        Cab {
            number,
            num_floors,
            current_floor: 0,
            direction: Direction::Up,
            door_state: DoorState::Closed,
            health: Health::InService,
            motion: Motion::Idle,
            pending_stops: Vec::new(),
            num_requests: 0,
            total_travel_time: 0,
        }
    }

    pub fn set_health(&mut self, health: Health) {
        self.health = health;
        match health {
            Health::InService => info!("elevator {}: in service", self.number),
            Health::OutOfService => warn!("elevator {}: out of service", self.number),
        }
    }

    /// Mean trip time in whole seconds, 0 before the first trip
    pub fn average_travel_time(&self) -> u8 {
        if self.num_requests == 0 {
            return 0;
        }
        (self.total_travel_time / self.num_requests).min(u8::MAX as u32) as u8
    }
}

impl fmt::Display for Cab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Elevator {} (Health: {:?}, Floor: {}, Stops: {:?})",
            self.number, self.health, self.current_floor, self.pending_stops
        )
    }
}
