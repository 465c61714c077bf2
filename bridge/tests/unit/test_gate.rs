//! Gate state derivation unit tests

use gatelink::gate::{
    direction_of, is_moving, position_of, state_from_code, Direction, GateState, CODE_CLOSED,
    CODE_CLOSING, CODE_OPEN, CODE_OPENING, CODE_STOPPED,
};

#[test]
fn test_endpoint_codes_carry_positions() {
    let open = state_from_code(Some(CODE_OPEN), false);
    assert_eq!(open, GateState::Open);
    assert_eq!(position_of(open), Some(100));
    assert!(!is_moving(open, false));
    assert_eq!(direction_of(open), Direction::Unknown);

    let closed = state_from_code(Some(CODE_CLOSED), false);
    assert_eq!(closed, GateState::Closed);
    assert_eq!(position_of(closed), Some(0));
    assert!(!is_moving(closed, false));
}

#[test]
fn test_travel_codes_carry_directions() {
    let opening = state_from_code(Some(CODE_OPENING), false);
    assert_eq!(opening, GateState::Opening);
    assert_eq!(direction_of(opening), Direction::Opening);
    assert!(is_moving(opening, false));
    assert_eq!(position_of(opening), None);

    let closing = state_from_code(Some(CODE_CLOSING), false);
    assert_eq!(closing, GateState::Closing);
    assert_eq!(direction_of(closing), Direction::Closing);
    assert!(is_moving(closing, false));
    assert_eq!(position_of(closing), None);
}

#[test]
fn test_stopped_code_is_stationary_with_a_direction() {
    let stopped = state_from_code(Some(CODE_STOPPED), false);
    assert_eq!(stopped, GateState::Stopped);
    assert_eq!(direction_of(stopped), Direction::Stopped);
    assert!(!is_moving(stopped, false));
    assert_eq!(position_of(stopped), None);
}

#[test]
fn test_unmapped_codes_degrade_to_unknown() {
    assert_eq!(state_from_code(Some(99), false), GateState::Unknown);
    assert_eq!(state_from_code(Some(-1), false), GateState::Unknown);
    assert_eq!(state_from_code(None, false), GateState::Unknown);
    assert_eq!(direction_of(GateState::Unknown), Direction::Unknown);
    assert_eq!(position_of(GateState::Unknown), None);
}

#[test]
fn test_motion_flag_rescues_an_unmapped_code() {
    assert_eq!(state_from_code(Some(99), true), GateState::Moving);
    assert_eq!(state_from_code(None, true), GateState::Moving);
    assert!(is_moving(GateState::Moving, true));
    assert_eq!(direction_of(GateState::Moving), Direction::Unknown);
    assert_eq!(position_of(GateState::Moving), None);
}

#[test]
fn test_motion_flag_does_not_override_a_mapped_code() {
    assert_eq!(state_from_code(Some(CODE_OPEN), true), GateState::Open);
    assert_eq!(state_from_code(Some(CODE_CLOSED), true), GateState::Closed);

    // The flag still marks the gate as moving even when the code is terminal
    assert!(is_moving(GateState::Open, true));
}
