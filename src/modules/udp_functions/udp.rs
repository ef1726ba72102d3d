//! ## UDP Module
//! This module provides the wire format and the sending half of the
//! datagram plumbing between the subsystems.
//!
//! ## The module includes:
//! - **Message tags**: one byte per message kind, lower tag = higher
//!   priority in the ingress queue.
//! - **UdpMsg**: the ten tag-framed messages exchanged between the
//!   scheduler, the elevator subsystems, the floor subsystem and the view.
//! - **SystemAddresses**: where each subsystem listens.
//! - **UdpHandler**: a bound sender socket with helpers for the common
//!   destinations.
//!
//! ## The functions include:
//! - 'msg_serialize'    turns a UdpMsg into its tag-prefixed payload.
//! - 'msg_deserialize'  parses a payload, None on unknown tag or bad length.
//!
//! Serialized `Request`s travel without a tag byte; they are recognized by
//! their length (always more than 3 bytes, see `Request::to_bytes`).
//!
//! ## Dependencies
//! **The following dependencies have to be included in `Cargo.toml`:**
//!
//! ```toml
//! [dependencies]
//! serde = { version = "1", features = ["derive"] }
//! bincode = "1"
//! ```

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use log::{debug, error};

use crate::modules::config;
use crate::modules::request_object::request_init::Request;

//----------------------------------------------Message tags

// Lower number gives a higher priority
pub const ELEVATOR_STUCK: u8 = 0;
pub const DOOR_ISSUE: u8 = 1;
pub const GET_ELEVATOR_REQUEST: u8 = 2;
pub const ISSUE_FIXED: u8 = 3;
pub const FIX_ELEVATOR_ERROR: u8 = 4;
pub const ELEVATOR_ARRIVAL: u8 = 5;
pub const REQUEST_ELEVATOR: u8 = 6;
pub const ACKNOWLEDGE: u8 = 7;
pub const AVERAGE_TRAVEL_TIME: u8 = 8;
pub const TOTAL_SIMULATION_TIME: u8 = 9;

//----------------------------------------------Enum

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UdpMsg {
    ElevatorStuck { car: u8 },
    DoorIssue { car: u8 },
    GetElevatorRequest,
    IssueFixed { car: u8 },
    FixElevatorError { car: u8 },
    ElevatorArrival { car: u8, floor: u8 },
    RequestElevator { car: u8, floor: u8 },
    Acknowledge,
    AverageTravelTime { car: u8, seconds: u8 },
    TotalSimulationTime { seconds: u8 },
}

impl UdpMsg {
    pub fn tag(&self) -> u8 {
        match self {
            UdpMsg::ElevatorStuck { .. } => ELEVATOR_STUCK,
            UdpMsg::DoorIssue { .. } => DOOR_ISSUE,
            UdpMsg::GetElevatorRequest => GET_ELEVATOR_REQUEST,
            UdpMsg::IssueFixed { .. } => ISSUE_FIXED,
            UdpMsg::FixElevatorError { .. } => FIX_ELEVATOR_ERROR,
            UdpMsg::ElevatorArrival { .. } => ELEVATOR_ARRIVAL,
            UdpMsg::RequestElevator { .. } => REQUEST_ELEVATOR,
            UdpMsg::Acknowledge => ACKNOWLEDGE,
            UdpMsg::AverageTravelTime { .. } => AVERAGE_TRAVEL_TIME,
            UdpMsg::TotalSimulationTime { .. } => TOTAL_SIMULATION_TIME,
        }
    }
}

//----------------------------------------------Functions

pub fn msg_serialize(msg: &UdpMsg) -> Vec<u8> {
    match *msg {
        UdpMsg::ElevatorStuck { car } => vec![ELEVATOR_STUCK, car],
        UdpMsg::DoorIssue { car } => vec![DOOR_ISSUE, car],
        UdpMsg::GetElevatorRequest => vec![GET_ELEVATOR_REQUEST],
        UdpMsg::IssueFixed { car } => vec![ISSUE_FIXED, car],
        UdpMsg::FixElevatorError { car } => vec![FIX_ELEVATOR_ERROR, car],
        UdpMsg::ElevatorArrival { car, floor } => vec![ELEVATOR_ARRIVAL, car, floor],
        UdpMsg::RequestElevator { car, floor } => vec![REQUEST_ELEVATOR, car, floor],
        UdpMsg::Acknowledge => vec![ACKNOWLEDGE],
        UdpMsg::AverageTravelTime { car, seconds } => vec![AVERAGE_TRAVEL_TIME, car, seconds],
        UdpMsg::TotalSimulationTime { seconds } => vec![TOTAL_SIMULATION_TIME, seconds],
    }
}

/// Parses a tag-framed payload. Unknown tags and length mismatches give
/// None, the caller decides whether that is worth more than a debug log.
pub fn msg_deserialize(buffer: &[u8]) -> Option<UdpMsg> {
    match (buffer.first().copied()?, buffer.len()) {
        (ELEVATOR_STUCK, 2) => Some(UdpMsg::ElevatorStuck { car: buffer[1] }),
        (DOOR_ISSUE, 2) => Some(UdpMsg::DoorIssue { car: buffer[1] }),
        (GET_ELEVATOR_REQUEST, 1) => Some(UdpMsg::GetElevatorRequest),
        (ISSUE_FIXED, 2) => Some(UdpMsg::IssueFixed { car: buffer[1] }),
        (FIX_ELEVATOR_ERROR, 2) => Some(UdpMsg::FixElevatorError { car: buffer[1] }),
        (ELEVATOR_ARRIVAL, 3) => Some(UdpMsg::ElevatorArrival {
            car: buffer[1],
            floor: buffer[2],
        }),
        (REQUEST_ELEVATOR, 3) => Some(UdpMsg::RequestElevator {
            car: buffer[1],
            floor: buffer[2],
        }),
        (ACKNOWLEDGE, 1) => Some(UdpMsg::Acknowledge),
        (AVERAGE_TRAVEL_TIME, 3) => Some(UdpMsg::AverageTravelTime {
            car: buffer[1],
            seconds: buffer[2],
        }),
        (TOTAL_SIMULATION_TIME, 2) => Some(UdpMsg::TotalSimulationTime { seconds: buffer[1] }),
        _ => None,
    }
}

//----------------------------------------------Structs

/// Where each subsystem listens. The default set is the well-known
/// loopback ports; tests build their own table from ephemeral sockets.
#[derive(Clone, Debug)]
pub struct SystemAddresses {
    pub scheduler: SocketAddr,
    pub floor: SocketAddr,
    pub view: SocketAddr,
    pub elevators: Vec<SocketAddr>,
}

impl SystemAddresses {
    pub fn local_default() -> SystemAddresses {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let elevators = (0..config::TOTAL_ELEVATORS)
            .map(|car| {
                SocketAddr::new(localhost, config::ELEVATOR_SUBSYSTEM_BASE_PORT + car as u16)
            })
            .collect();

        SystemAddresses {
            scheduler: SocketAddr::new(localhost, config::SCHEDULER_PORT),
            floor: SocketAddr::new(localhost, config::FLOOR_SUBSYSTEM_PORT),
            view: SocketAddr::new(localhost, config::ELEVATOR_VIEW_PORT),
            elevators,
        }
    }

    pub fn elevator(&self, car: u8) -> Option<SocketAddr> {
        self.elevators.get(car as usize).copied()
    }
}

#[derive(Debug)]
pub struct UdpHandler {
    sender_socket: UdpSocket,
    pub addresses: SystemAddresses,
}

pub fn init_udp_handler(addresses: SystemAddresses) -> io::Result<UdpHandler> {
    let sender_socket = UdpSocket::bind("127.0.0.1:0")?;
    Ok(UdpHandler {
        sender_socket,
        addresses,
    })
}

impl UdpHandler {
    /// Sends a UDP message, transport errors are logged and swallowed
    pub fn send(&self, target_address: SocketAddr, msg: &UdpMsg) -> bool {
        let sent = self.send_raw(target_address, &msg_serialize(msg));
        if sent {
            debug!("message tag {} sent to {}", msg.tag(), target_address);
        }
        sent
    }

    pub fn send_raw(&self, target_address: SocketAddr, payload: &[u8]) -> bool {
        match self.sender_socket.send_to(payload, target_address) {
            Ok(_) => true,
            Err(e) => {
                error!("error sending message to {}: {}", target_address, e);
                false
            }
        }
    }

    /// Sends a serialized request to the scheduler
    pub fn send_request(&self, request: &Request) -> bool {
        self.send_raw(self.addresses.scheduler, &request.to_bytes())
    }
}
