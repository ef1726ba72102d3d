//! Motion model of a single car: the kinematic travel-time formula, the
//! sweep ordering of pending stops and the door cycle. All waiting happens
//! here as plain sleeps, the rest of the subsystem is bookkeeping.

use std::thread;
use std::time::Duration;

use log::info;

use crate::modules::config;
use crate::modules::request_object::request_init::Direction;

use super::cab::{Cab, DoorState};

//----------------------------------------------Kinematics

/// Travel time in seconds for a trip of `distance` floors with the
/// building's default car physics.
pub fn travel_time(distance: u8) -> f64 {
    travel_time_for(distance, config::MAX_SPEED, config::ACCELERATION)
}

/// Travel time with explicit physics. Short hops never reach top speed
/// and follow the pure-acceleration curve; longer trips get a top-speed
/// plateau.
pub fn travel_time_for(distance: u8, max_speed: f64, acceleration: f64) -> f64 {
    let distance = distance as f64;
    let time_to_max_speed = max_speed / acceleration;

    if time_to_max_speed * 2.0 >= distance / max_speed {
        (2.0 * distance / acceleration).sqrt()
    } else {
        time_to_max_speed + (distance - max_speed * time_to_max_speed) / max_speed
    }
}

//----------------------------------------------Stop ordering

/// Arranges `stops` into the order a car at `current_floor` heading in
/// `direction` will visit them: everything ahead in the travel direction
/// first (nearest first), then the stops behind it (nearest first again
/// once the car has turned around).
pub fn sweep_order(current_floor: u8, direction: Direction, stops: &[u8]) -> Vec<u8> {
    let mut ahead: Vec<u8>;
    let mut behind: Vec<u8>;

    match direction {
        Direction::Up => {
            ahead = stops.iter().copied().filter(|&s| s >= current_floor).collect();
            behind = stops.iter().copied().filter(|&s| s < current_floor).collect();
            ahead.sort_unstable();
            behind.sort_unstable_by(|a, b| b.cmp(a));
        }
        Direction::Down => {
            ahead = stops.iter().copied().filter(|&s| s <= current_floor).collect();
            behind = stops.iter().copied().filter(|&s| s > current_floor).collect();
            ahead.sort_unstable_by(|a, b| b.cmp(a));
            behind.sort_unstable();
        }
    }

    ahead.extend(behind);
    ahead
}

//----------------------------------------------Functions

impl Cab {
    /// Re-sorts the pending stops for the current position and direction.
    /// Duplicates and stops at the current floor are dropped.
    pub fn sort_pending_stops(&mut self) {
        self.pending_stops.sort_unstable();
        self.pending_stops.dedup();
        let current_floor = self.current_floor;
        self.pending_stops.retain(|&stop| stop != current_floor);
        self.pending_stops = sweep_order(self.current_floor, self.direction, &self.pending_stops);
    }

    /// Picks the next stop along the sweep and turns the car towards it
    pub fn next_stop(&mut self) -> Option<u8> {
        self.sort_pending_stops();
        if self.pending_stops.is_empty() {
            return None;
        }
        let stop = self.pending_stops.remove(0);
        self.set_direction_towards(stop);
        Some(stop)
    }

    pub fn set_direction_towards(&mut self, destination: u8) {
        if destination > self.current_floor {
            self.direction = Direction::Up;
        } else {
            self.direction = Direction::Down;
        }
    }

    /// Drives to `destination` by sleeping the kinematic travel time, then
    /// records the trip in the travel statistics.
    pub fn travel_to(&mut self, destination: u8) {
        let distance = self.current_floor.abs_diff(destination);
        let time_to_destination = travel_time(distance);

        thread::sleep(Duration::from_secs_f64(time_to_destination));

        self.num_requests += 1;
        self.total_travel_time += time_to_destination as u32;
        self.current_floor = destination;
    }

    /// Opens and closes the doors, one door-move time each way
    pub fn cycle_doors(&mut self) {
        info!("elevator {}: opening doors", self.number);
        thread::sleep(config::DOOR_MOVE_TIME);
        self.door_state = DoorState::Open;
        info!("elevator {}: doors open", self.number);

        info!("elevator {}: closing doors", self.number);
        thread::sleep(config::DOOR_MOVE_TIME);
        self.door_state = DoorState::Closed;
        info!("elevator {}: doors closed", self.number);
    }
}
