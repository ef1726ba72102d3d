//! # config.rs – Building and simulation parameters
//!
//! All static parameters used across the subsystems live here, so tuning a
//! simulation run means touching exactly one file. Functions that embody
//! tunable math (kinematics, nearest-car selection) also take their
//! parameters explicitly, which is what the tests use.

use std::time::Duration;

//
// ──────────────────────────────────────────────────────────────
//   1. BUILDING GEOMETRY
// ──────────────────────────────────────────────────────────────
//

/// Number of floors, numbered 0..=21
pub const TOTAL_FLOORS: u8 = 22;

/// Number of elevator cars, numbered 0..=3
pub const TOTAL_ELEVATORS: u8 = 4;

//
// ──────────────────────────────────────────────────────────────
//   2. CAR PHYSICS & TIMING
// ──────────────────────────────────────────────────────────────
//

/// Top speed of a car in floors per second
pub const MAX_SPEED: f64 = 1.71;

/// Car acceleration in floors per second squared
pub const ACCELERATION: f64 = 0.182;

/// Time for one door movement (open or close)
pub const DOOR_MOVE_TIME: Duration = Duration::from_secs(1);

/// Probability that a door issue can be repaired remotely
pub const REPAIR_PROBABILITY: f64 = 0.6;

/// Slack added to every arrival estimate to cover send/receive delay
pub const NETWORK_DELAY_SLACK: Duration = Duration::from_secs(3);

//
// ──────────────────────────────────────────────────────────────
//   3. MESSAGE QUEUE & NETWORK SETTINGS
// ──────────────────────────────────────────────────────────────
//

/// Upper bound on queued ingress messages per subsystem
pub const MAX_QUEUED_MESSAGES: usize = 10;

/// Size of the UDP receive buffer in bytes
pub const UDP_BUFFER: usize = 1024;

/// Scheduler ingress port
pub const SCHEDULER_PORT: u16 = 23;

/// Elevator subsystem ingress port for car k is BASE + k
pub const ELEVATOR_SUBSYSTEM_BASE_PORT: u16 = 69;

/// Floor subsystem ingress port
pub const FLOOR_SUBSYSTEM_PORT: u16 = 667;

/// Visualization ingress port
pub const ELEVATOR_VIEW_PORT: u16 = 22;

//
// ──────────────────────────────────────────────────────────────
//   4. LOOP CADENCE
// ──────────────────────────────────────────────────────────────
//

/// How long the floor subsystem waits on its queue before replaying
/// the next scenario event
pub const POLL_PERIOD: Duration = Duration::from_millis(10);

/// Grace period at floor subsystem startup so peers can bind their ports
pub const PEER_BIND_GRACE: Duration = Duration::from_secs(5);

//
// ──────────────────────────────────────────────────────────────
//   5. SCENARIO INPUT
// ──────────────────────────────────────────────────────────────
//

/// Scenario file replayed by the floor subsystem
pub const SIMULATION_FILE: &str = "simulations.txt";
