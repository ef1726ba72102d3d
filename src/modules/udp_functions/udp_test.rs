//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::net::UdpSocket;
    use std::time::Duration;

    use chrono::NaiveTime;

    use crate::modules::config;
    use crate::modules::request_object::request_init::{Direction, Request, RequestType};
    use crate::modules::udp_functions::receiver::MessageReceiver;
    use crate::modules::udp_functions::udp::*;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_msg_round_trip() {
        let messages = vec![
            UdpMsg::ElevatorStuck { car: 2 },
            UdpMsg::DoorIssue { car: 1 },
            UdpMsg::GetElevatorRequest,
            UdpMsg::IssueFixed { car: 3 },
            UdpMsg::FixElevatorError { car: 0 },
            UdpMsg::ElevatorArrival { car: 1, floor: 20 },
            UdpMsg::RequestElevator { car: 0, floor: 3 },
            UdpMsg::Acknowledge,
            UdpMsg::AverageTravelTime { car: 2, seconds: 9 },
            UdpMsg::TotalSimulationTime { seconds: 40 },
        ];

        for msg in messages {
            let payload = msg_serialize(&msg);
            assert_eq!(payload[0], msg.tag());
            assert_eq!(msg_deserialize(&payload), Some(msg));
        }
    }

    #[test]
    fn test_msg_deserialize_rejects_garbage() {
        // Unknown tag
        assert_eq!(msg_deserialize(&[42, 0]), None);
        // Length mismatch
        assert_eq!(msg_deserialize(&[ELEVATOR_STUCK]), None);
        assert_eq!(msg_deserialize(&[ELEVATOR_ARRIVAL, 1]), None);
        assert_eq!(msg_deserialize(&[GET_ELEVATOR_REQUEST, 0]), None);
        // Empty payload
        assert_eq!(msg_deserialize(&[]), None);
    }

    #[test]
    fn test_request_round_trip() {
        let request = Request::init(3, 0, Direction::Up, noon(), RequestType::External);
        let payload = request.to_bytes();

        // Requests are told apart from tag frames by their length, and the
        // first byte is the floor number
        assert!(payload.len() > 3);
        assert_eq!(payload[0], 3);

        let decoded = Request::from_bytes(&payload).expect("request should decode");
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_rejects_tag_frames() {
        assert!(Request::from_bytes(&[ELEVATOR_ARRIVAL, 1, 2]).is_none());
    }

    #[test]
    fn test_priority_ordering() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");

        // Enqueued in the wrong order on purpose
        receiver.submit(vec![REQUEST_ELEVATOR, 0, 3]);
        receiver.submit(vec![DOOR_ISSUE, 1]);
        receiver.submit(vec![ELEVATOR_STUCK, 1]);

        assert_eq!(receiver.poll()[0], ELEVATOR_STUCK);
        assert_eq!(receiver.poll()[0], DOOR_ISSUE);
        assert_eq!(receiver.poll()[0], REQUEST_ELEVATOR);
        assert!(receiver.is_empty());
    }

    #[test]
    fn test_fifo_within_tag() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");

        receiver.submit(vec![REQUEST_ELEVATOR, 0, 1]);
        receiver.submit(vec![REQUEST_ELEVATOR, 0, 2]);
        receiver.submit(vec![REQUEST_ELEVATOR, 0, 3]);

        assert_eq!(receiver.poll(), vec![REQUEST_ELEVATOR, 0, 1]);
        assert_eq!(receiver.poll(), vec![REQUEST_ELEVATOR, 0, 2]);
        assert_eq!(receiver.poll(), vec![REQUEST_ELEVATOR, 0, 3]);
    }

    #[test]
    fn test_queue_capacity_drops_overflow() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");

        for floor in 0..(config::MAX_QUEUED_MESSAGES as u8 + 5) {
            receiver.submit(vec![REQUEST_ELEVATOR, 0, floor]);
        }

        let mut drained = 0;
        while receiver.poll_timeout(Duration::from_millis(10)).is_some() {
            drained += 1;
        }
        assert_eq!(drained, config::MAX_QUEUED_MESSAGES);
    }

    #[test]
    fn test_poll_except_leaves_requests_queued() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");

        receiver.submit(vec![REQUEST_ELEVATOR, 0, 3]);
        assert_eq!(receiver.poll_except(REQUEST_ELEVATOR), None);
        assert!(!receiver.is_empty());

        receiver.submit(vec![ISSUE_FIXED, 0]);
        assert_eq!(
            receiver.poll_except(REQUEST_ELEVATOR),
            Some(vec![ISSUE_FIXED, 0])
        );
        assert_eq!(receiver.poll(), vec![REQUEST_ELEVATOR, 0, 3]);
    }

    #[test]
    fn test_take_matching_only_removes_requests() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");

        receiver.submit(vec![REQUEST_ELEVATOR, 0, 3]);
        receiver.submit(vec![DOOR_ISSUE, 0]);
        receiver.submit(vec![REQUEST_ELEVATOR, 0, 7]);

        let requests = receiver.take_matching(REQUEST_ELEVATOR);
        assert_eq!(
            requests,
            vec![vec![REQUEST_ELEVATOR, 0, 3], vec![REQUEST_ELEVATOR, 0, 7]]
        );
        assert_eq!(receiver.poll(), vec![DOOR_ISSUE, 0]);
        assert!(receiver.is_empty());
    }

    #[test]
    fn test_poll_timeout_on_empty_queue() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");
        assert_eq!(receiver.poll_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn test_receiver_acknowledges_datagrams() {
        let receiver = MessageReceiver::init(0).expect("failed to bind receiver");

        let sender = UdpSocket::bind("127.0.0.1:0").expect("failed to bind sender");
        sender
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        sender
            .send_to(&[ELEVATOR_STUCK, 1], receiver.local_address())
            .expect("send failed");

        // The payload arrives through the reader thread
        assert_eq!(
            receiver.poll_timeout(Duration::from_secs(2)),
            Some(vec![ELEVATOR_STUCK, 1])
        );

        // And the sender gets an acknowledgement back
        let mut buffer = [0u8; 16];
        let (size, _) = sender.recv_from(&mut buffer).expect("no ack received");
        assert_eq!(&buffer[..size], &[ACKNOWLEDGE]);
    }
}
