//! Socket-level tests wiring real subsystem instances to fake peers bound
//! on ephemeral loopback ports.

use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use chrono::NaiveTime;

use heissim::modules::cab_object::cab::{Cab, Health};
use heissim::modules::elevator_functions::elevator_subsystem::ElevatorSubsystem;
use heissim::modules::floor_functions::floor_subsystem::FloorSubsystem;
use heissim::modules::request_object::request_init::{Direction, Request, RequestType};
use heissim::modules::scheduler_functions::scheduler::{Scheduler, SchedulerState};
use heissim::modules::udp_functions::receiver::MessageReceiver;
use heissim::modules::udp_functions::udp::{
    init_udp_handler, SystemAddresses, DOOR_ISSUE, ELEVATOR_ARRIVAL, ELEVATOR_STUCK,
    FIX_ELEVATOR_ERROR, GET_ELEVATOR_REQUEST, ISSUE_FIXED, REQUEST_ELEVATOR,
};

fn bind_peer() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("failed to bind test socket");
    socket
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();
    socket
}

fn recv_payload(socket: &UdpSocket) -> Vec<u8> {
    let mut buffer = [0u8; 256];
    let (size, _) = socket.recv_from(&mut buffer).expect("no datagram received");
    buffer[..size].to_vec()
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap()
}

/// An external call flows scheduler -> elevator/floor, the lamp follows
/// the dispatch and the arrival.
#[test]
fn test_external_call_dispatch_and_lamp_cycle() {
    let floor_peer = bind_peer();
    let view_peer = bind_peer();
    let elevator_peer = bind_peer();

    let addresses = SystemAddresses {
        scheduler: floor_peer.local_addr().unwrap(), // unused here
        floor: floor_peer.local_addr().unwrap(),
        view: view_peer.local_addr().unwrap(),
        elevators: vec![elevator_peer.local_addr().unwrap()],
    };

    let scheduler_handler = init_udp_handler(addresses.clone()).unwrap();
    let scheduler_receiver = MessageReceiver::init(0).unwrap();
    let mut scheduler = Scheduler::init(scheduler_handler, scheduler_receiver);

    let floor_handler = init_udp_handler(addresses).unwrap();
    let floor_receiver = MessageReceiver::init(0).unwrap();
    let mut floor_subsystem =
        FloorSubsystem::init(floor_handler, floor_receiver, Vec::new(), Vec::new());

    // The floor subsystem hands an external call for floor 3 to the scheduler
    let request = Request::init(3, 0, Direction::Up, noon(), RequestType::External);
    scheduler.check_message(&request.to_bytes());
    assert_eq!(scheduler.state, SchedulerState::Scheduling);
    scheduler.update_state();

    // Car 0 and the floor subsystem both see the dispatch
    assert_eq!(recv_payload(&elevator_peer), vec![REQUEST_ELEVATOR, 0, 3]);
    let dispatch = recv_payload(&floor_peer);
    assert_eq!(dispatch, vec![REQUEST_ELEVATOR, 0, 3]);

    // The dispatch turns the request lamp on
    floor_subsystem.check_message(&dispatch);
    assert!(floor_subsystem.floors[3].lamp.is_on(0));

    // The car reports its arrival; the scheduler forwards it to the floor
    scheduler.check_message(&[ELEVATOR_ARRIVAL, 0, 3]);
    assert_eq!(scheduler.current_floors[0], 3);

    let arrival = recv_payload(&floor_peer);
    assert_eq!(arrival, vec![ELEVATOR_ARRIVAL, 0, 3]);

    floor_subsystem.check_message(&arrival);
    assert!(!floor_subsystem.floors[3].lamp.is_on(0));
}

fn test_elevator_subsystem(car: u8) -> (ElevatorSubsystem, UdpSocket, UdpSocket) {
    let scheduler_peer = bind_peer();
    let view_peer = bind_peer();

    let receiver = MessageReceiver::init(0).unwrap();
    let addresses = SystemAddresses {
        scheduler: scheduler_peer.local_addr().unwrap(),
        floor: scheduler_peer.local_addr().unwrap(),
        view: view_peer.local_addr().unwrap(),
        elevators: vec![receiver.local_address()],
    };
    let handler = init_udp_handler(addresses).unwrap();

    let subsystem = ElevatorSubsystem::init(Cab::init(car, 22), handler, receiver);
    (subsystem, scheduler_peer, view_peer)
}

/// A dispatched stop is served: travel, door cycle, arrival report and
/// travel-time telemetry.
#[test]
fn test_elevator_services_a_stop() {
    let (mut subsystem, scheduler_peer, view_peer) = test_elevator_subsystem(0);

    subsystem.receiver.submit(vec![REQUEST_ELEVATOR, 0, 1]);

    subsystem.update_state(); // absorbs the stop
    subsystem.update_state(); // drives to floor 1
    subsystem.update_state(); // door cycle + reports

    assert_eq!(subsystem.cab.current_floor, 1);
    assert_eq!(recv_payload(&scheduler_peer), vec![ELEVATOR_ARRIVAL, 0, 1]);

    // One 1-floor trip takes a bit over 3 seconds, truncated to whole seconds
    let telemetry = recv_payload(&view_peer);
    assert_eq!(telemetry[0], 8);
    assert_eq!(telemetry[1], 0);
    assert_eq!(telemetry[2], 3);
}

/// Door issue: the car goes out of service, reports to the view and asks
/// the scheduler for a fix; the fix restores it.
#[test]
fn test_elevator_door_fault_and_fix() {
    let (mut subsystem, scheduler_peer, view_peer) = test_elevator_subsystem(0);

    subsystem.receiver.submit(vec![DOOR_ISSUE, 0]);
    subsystem.update_state();

    assert_eq!(subsystem.cab.health, Health::OutOfService);
    assert_eq!(recv_payload(&view_peer), vec![DOOR_ISSUE, 0]);
    assert_eq!(recv_payload(&scheduler_peer), vec![FIX_ELEVATOR_ERROR, 0]);

    subsystem.receiver.submit(vec![ISSUE_FIXED, 0]);
    subsystem.update_state();

    assert_eq!(subsystem.cab.health, Health::InService);
    assert_eq!(recv_payload(&view_peer), vec![ISSUE_FIXED, 0]);
}

/// A car that stays broken hands its pending stops back as fresh external
/// requests.
#[test]
fn test_elevator_resurfaces_orphaned_stops() {
    let (mut subsystem, scheduler_peer, _view_peer) = test_elevator_subsystem(1);

    subsystem.cab.set_health(Health::OutOfService);
    subsystem.cab.pending_stops = vec![4];

    subsystem.receiver.submit(vec![GET_ELEVATOR_REQUEST]);
    subsystem.update_state();

    assert!(subsystem.cab.pending_stops.is_empty());

    let payload = recv_payload(&scheduler_peer);
    assert!(payload.len() > 3);
    let request = Request::from_bytes(&payload).expect("expected a serialized request");
    assert_eq!(request.floor_number, 4);
    assert_eq!(request.elevator_number, 1);
    assert_eq!(request.request_type, RequestType::External);
}

/// Fault traffic sent over the wire overtakes dispatch traffic that was
/// queued before it.
#[test]
fn test_priority_preemption_over_sockets() {
    let receiver = MessageReceiver::init(0).unwrap();
    let sender = bind_peer();

    sender
        .send_to(&[REQUEST_ELEVATOR, 0, 3], receiver.local_address())
        .unwrap();
    sender
        .send_to(&[DOOR_ISSUE, 1], receiver.local_address())
        .unwrap();
    sender
        .send_to(&[ELEVATOR_STUCK, 1], receiver.local_address())
        .unwrap();

    // Let the reader thread drain the socket
    thread::sleep(Duration::from_millis(300));

    assert_eq!(receiver.poll()[0], ELEVATOR_STUCK);
    assert_eq!(receiver.poll()[0], DOOR_ISSUE);
    assert_eq!(receiver.poll()[0], REQUEST_ELEVATOR);
}
