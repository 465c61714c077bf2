//! Status fetch and normalization
//!
//! Vendor status payloads are treated as untrusted input: fields may be
//! missing, numbers may arrive as strings, entries may not be objects.
//! Normalization never fails; whatever cannot be read degrades the snapshot
//! toward `unknown` while the raw payload is passed through for debugging.

use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::came::client::VendorClient;
use crate::errors::{AttemptRecord, BridgeError};
use crate::gate::{self, Direction, GateState};

/// `States` entry carrying the gate status code
const STATUS_COMMAND_ID: i64 = 1;

/// `States` entry carrying the motion flag
const MOTION_COMMAND_ID: i64 = 3;

/// Normalized device status
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub ok: bool,
    pub base: String,
    pub url: String,
    pub state: GateState,
    pub position: Option<u8>,
    pub moving: bool,
    pub direction: Direction,
    pub online: bool,
    pub raw_code: Option<i64>,
    pub updated_at: Option<String>,
    pub raw: Value,
}

/// Fetch a device's status and normalize it.
///
/// Only a non-200 status endpoint response is an error; any payload that
/// parses as JSON normalizes.
pub async fn fetch_status(
    client: &VendorClient,
    base: &str,
    device_id: i64,
) -> Result<StatusSnapshot, BridgeError> {
    let url = format!("{}/automations/{}/status", base, device_id);
    let response = client.request(Method::GET, &url, None).await?;

    if response.status != 200 {
        return Err(BridgeError::UpstreamError(AttemptRecord {
            method: Method::GET.to_string(),
            url,
            status: Some(response.status),
            body: Some(response.body),
            error: None,
        }));
    }

    let raw = response.json()?;
    Ok(normalize_status(base.to_string(), url, raw))
}

/// Reduce a raw status payload to the canonical snapshot.
pub fn normalize_status(base: String, url: String, raw: Value) -> StatusSnapshot {
    let ok = raw.get("Success").map(truthy).unwrap_or(false);
    let payload = raw.get("Data");

    // Online defaults to true when absent; an explicit null counts as false
    let online = payload
        .and_then(|p| p.get("Online"))
        .map(truthy)
        .unwrap_or(true);

    let states: Vec<&Value> = payload
        .and_then(|p| p.get("States"))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().collect())
        .unwrap_or_default();

    let status_entry = entry_for(&states, STATUS_COMMAND_ID);
    let motion_entry = entry_for(&states, MOTION_COMMAND_ID);

    let code = status_entry.and_then(first_data).and_then(lossy_i64);
    let moving_flag = motion_entry
        .and_then(first_data)
        .and_then(lossy_i64)
        .map(|flag| flag == 1)
        .unwrap_or(false);

    let state = gate::state_from_code(code, moving_flag);

    let mut stamps: Vec<String> = Vec::new();
    for entry in [status_entry, motion_entry].into_iter().flatten() {
        if let Some(stamp) = entry.get("UpdatedAt").and_then(Value::as_str) {
            if !stamp.is_empty() {
                stamps.push(stamp.to_string());
            }
        }
    }
    let updated_at = stamps.into_iter().max().or_else(|| {
        payload
            .and_then(|p| p.get("ConfiguredLastUpdate"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    StatusSnapshot {
        ok,
        base,
        url,
        state,
        position: gate::position_of(state),
        moving: gate::is_moving(state, moving_flag),
        direction: gate::direction_of(state),
        online,
        raw_code: code,
        updated_at,
        raw,
    }
}

/// Find the entry for a command id. Non-object entries are skipped; when ids
/// repeat, the last entry wins.
fn entry_for<'a>(
    states: &[&'a Value],
    command_id: i64,
) -> Option<&'a serde_json::Map<String, Value>> {
    let mut found = None;
    for entry in states {
        if let Some(map) = entry.as_object() {
            if map.get("CommandId").and_then(lossy_i64) == Some(command_id) {
                found = Some(map);
            }
        }
    }
    found
}

/// First element of an entry's `Data` list
fn first_data<'a>(entry: &'a serde_json::Map<String, Value>) -> Option<&'a Value> {
    entry.get("Data").and_then(Value::as_array).and_then(|data| data.first())
}

/// Accept integers in Number or String form
fn lossy_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Python-style truthiness, for the vendor's loose `Success`/`Online` flags
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(entries) => !entries.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
