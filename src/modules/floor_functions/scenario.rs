//! Scenario file parsing. One whitespace-separated record per line:
//!
//! - Call:  `HH:MM:SS.mmm  floor  UP|DOWN  elevatorNumber  INTERNAL|EXTERNAL`
//! - Fault: `HH:MM:SS.mmm  elevatorNumber  DOOR_ISSUE|ELEVATOR_STUCK`
//!
//! Malformed lines are fatal at startup, before any socket is bound.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use chrono::NaiveTime;
use log::info;

use crate::modules::request_object::issue_init::{Issue, IssueKind};
use crate::modules::request_object::request_init::{Direction, Request, RequestType};

pub enum ScenarioLine {
    Call(Request),
    Fault(Issue),
}

/// Reads the whole scenario into chronologically sorted calls and faults
pub fn read_scenario(path: &Path) -> io::Result<(Vec<Request>, Vec<Issue>)> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut requests = Vec::new();
    let mut issues = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(ScenarioLine::Call(request)) => {
                info!("floor subsystem: request generated - {}", request);
                requests.push(request);
            }
            Ok(ScenarioLine::Fault(issue)) => {
                info!("floor subsystem: issue generated - {}", issue);
                issues.push(issue);
            }
            Err(reason) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("scenario line {}: {}", line_number + 1, reason),
                ));
            }
        }
    }

    requests.sort_by_key(|request| request.request_time);
    issues.sort_by_key(|issue| issue.scheduled_time);
    Ok((requests, issues))
}

pub fn parse_line(line: &str) -> Result<ScenarioLine, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(format!("expected at least 3 fields, got {}", tokens.len()));
    }

    let time = NaiveTime::parse_from_str(tokens[0], "%H:%M:%S%.3f")
        .map_err(|e| format!("bad time '{}': {}", tokens[0], e))?;

    match tokens[2] {
        "DOOR_ISSUE" | "ELEVATOR_STUCK" => {
            if tokens.len() != 3 {
                return Err(format!("expected 3 fields for a fault, got {}", tokens.len()));
            }
            let elevator_number = parse_number(tokens[1], "elevator number")?;
            let kind = if tokens[2] == "DOOR_ISSUE" {
                IssueKind::DoorIssue
            } else {
                IssueKind::ElevatorStuck
            };
            Ok(ScenarioLine::Fault(Issue::init(kind, elevator_number, time)))
        }
        "UP" | "DOWN" => {
            if tokens.len() != 5 {
                return Err(format!("expected 5 fields for a call, got {}", tokens.len()));
            }
            let floor_number = parse_number(tokens[1], "floor number")?;
            let direction = if tokens[2] == "UP" {
                Direction::Up
            } else {
                Direction::Down
            };
            let elevator_number = parse_number(tokens[3], "elevator number")?;
            let request_type = match tokens[4] {
                "INTERNAL" => RequestType::Internal,
                "EXTERNAL" => RequestType::External,
                other => return Err(format!("unknown request type '{}'", other)),
            };
            Ok(ScenarioLine::Call(Request::init(
                floor_number,
                elevator_number,
                direction,
                time,
                request_type,
            )))
        }
        other => Err(format!("unknown record type '{}'", other)),
    }
}

fn parse_number(token: &str, what: &str) -> Result<u8, String> {
    token
        .parse::<u8>()
        .map_err(|e| format!("bad {} '{}': {}", what, token, e))
}
