//! Canonical gate state model
//!
//! Vendor status codes map onto a small controller-facing vocabulary. Anything
//! the vendor reports outside that vocabulary degrades to `Unknown` instead of
//! failing the request.

use serde::{Deserialize, Serialize};

/// Vendor status code for a fully open gate
pub const CODE_OPEN: i64 = 16;
/// Vendor status code for a fully closed gate
pub const CODE_CLOSED: i64 = 17;
/// Vendor status code for a gate stopped mid-travel
pub const CODE_STOPPED: i64 = 19;
/// Vendor status code for a gate travelling open
pub const CODE_OPENING: i64 = 32;
/// Vendor status code for a gate travelling closed
pub const CODE_CLOSING: i64 = 33;

/// Canonical gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    /// Fully open
    Open,

    /// Fully closed
    Closed,

    /// Travelling open
    Opening,

    /// Travelling closed
    Closing,

    /// Stopped mid-travel
    Stopped,

    /// Code unmapped but the motion flag is set
    Moving,

    /// Nothing usable reported
    Unknown,
}

/// Direction of travel derived from the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Opening,
    Closing,
    Stopped,
    Unknown,
}

/// Map a vendor status code to the canonical state.
///
/// An unmapped or absent code with the motion flag set becomes `Moving`;
/// without the flag it stays `Unknown`.
pub fn state_from_code(code: Option<i64>, moving_flag: bool) -> GateState {
    let mapped = match code {
        Some(CODE_OPEN) => GateState::Open,
        Some(CODE_CLOSED) => GateState::Closed,
        Some(CODE_STOPPED) => GateState::Stopped,
        Some(CODE_OPENING) => GateState::Opening,
        Some(CODE_CLOSING) => GateState::Closing,
        _ => GateState::Unknown,
    };

    if mapped == GateState::Unknown && moving_flag {
        GateState::Moving
    } else {
        mapped
    }
}

/// Direction is only known while travelling or explicitly stopped.
pub fn direction_of(state: GateState) -> Direction {
    match state {
        GateState::Opening => Direction::Opening,
        GateState::Closing => Direction::Closing,
        GateState::Stopped => Direction::Stopped,
        _ => Direction::Unknown,
    }
}

/// Position is only known at the endpoints: 100 when open, 0 when closed.
pub fn position_of(state: GateState) -> Option<u8> {
    match state {
        GateState::Open => Some(100),
        GateState::Closed => Some(0),
        _ => None,
    }
}

/// The gate counts as moving when travelling in either direction, or whenever
/// the vendor's motion flag is set regardless of the mapped state.
pub fn is_moving(state: GateState, moving_flag: bool) -> bool {
    matches!(state, GateState::Opening | GateState::Closing) || moving_flag
}
