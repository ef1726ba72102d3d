use std::fmt;

use chrono::NaiveTime;

use crate::modules::udp_functions::udp::UdpMsg;

/// A simulated fault scheduled against one car. Issues are replayed by the
/// floor subsystem at their scheduled time, not program errors.
#[derive(Clone, Debug, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    pub elevator_number: u8,
    pub scheduled_time: NaiveTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueKind {
    DoorIssue,
    ElevatorStuck,
}

impl Issue {
    pub fn init(kind: IssueKind, elevator_number: u8, scheduled_time: NaiveTime) -> Issue {
        Issue {
            kind,
            elevator_number,
            scheduled_time,
        }
    }

    /// The 2-byte fault frame sent to the scheduler when the issue fires.
    pub fn to_msg(&self) -> UdpMsg {
        match self.kind {
            IssueKind::DoorIssue => UdpMsg::DoorIssue {
                car: self.elevator_number,
            },
            IssueKind::ElevatorStuck => UdpMsg::ElevatorStuck {
                car: self.elevator_number,
            },
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::DoorIssue => write!(
                f,
                "Issue: Door Issue, Elevator Number: {}, Time of issue: {}",
                self.elevator_number, self.scheduled_time
            ),
            IssueKind::ElevatorStuck => write!(
                f,
                "Issue: Elevator Stuck, Elevator Number: {}, Time of issue: {}",
                self.elevator_number, self.scheduled_time
            ),
        }
    }
}
