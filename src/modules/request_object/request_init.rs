use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// An elevator call made by a passenger, either from a floor panel
/// (external) or from inside a specific car (internal).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub floor_number: u8,
    pub elevator_number: u8,
    pub direction: Direction,
    pub request_time: NaiveTime,
    pub request_type: RequestType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Internal,
    External,
}

impl Request {
    pub fn init(
        floor_number: u8,
        elevator_number: u8,
        direction: Direction,
        request_time: NaiveTime,
        request_type: RequestType,
    ) -> Request {
        Request {
            floor_number,
            elevator_number,
            direction,
            request_time,
            request_type,
        }
    }

    /// Wire form of the request. The encoding starts with the floor number,
    /// so receivers tell requests from tag frames by payload length alone.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("request serialization cannot fail")
    }

    pub fn from_bytes(buffer: &[u8]) -> Option<Request> {
        bincode::deserialize(buffer).ok()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Floor: {}, Elevator: {}, Direction: {:?}, Time of request: {}, Type of request: {:?}",
            self.floor_number,
            self.elevator_number,
            self.direction,
            self.request_time,
            self.request_type
        )
    }
}
