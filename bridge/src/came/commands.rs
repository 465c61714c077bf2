//! Command dispatch against the vendor's drifting endpoint shapes

use http::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::came::client::VendorClient;
use crate::errors::{AttemptRecord, BridgeError};

/// Statuses the vendor answers with on an accepted command
const ACCEPTED_STATUSES: [u16; 3] = [200, 202, 204];

/// The endpoint shapes a command may live under. Vendor firmware revisions
/// moved commands between these three; the bridge walks them in a fixed
/// order and stops at the first accepted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandShape {
    /// POST /automations/{device}/commands/{command}
    AutomationPost,

    /// POST /devices/{device}/commands/{command}
    DevicePost,

    /// GET /devices/{device}/command/{command}
    DeviceGet,
}

impl CommandShape {
    /// Dispatch order. Not configurable per request.
    pub const ORDERED: [CommandShape; 3] = [
        CommandShape::AutomationPost,
        CommandShape::DevicePost,
        CommandShape::DeviceGet,
    ];

    pub fn method(&self) -> Method {
        match self {
            CommandShape::AutomationPost | CommandShape::DevicePost => Method::POST,
            CommandShape::DeviceGet => Method::GET,
        }
    }

    pub fn url(&self, base: &str, device_id: i64, command_id: i64) -> String {
        match self {
            CommandShape::AutomationPost => {
                format!("{}/automations/{}/commands/{}", base, device_id, command_id)
            }
            CommandShape::DevicePost => {
                format!("{}/devices/{}/commands/{}", base, device_id, command_id)
            }
            CommandShape::DeviceGet => {
                format!("{}/devices/{}/command/{}", base, device_id, command_id)
            }
        }
    }
}

/// The shape that accepted a command
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub method: String,
    pub url: String,
    pub status: u16,
}

/// A device's command listing, from whichever listing endpoint answered 200
#[derive(Debug, Clone)]
pub struct CommandListing {
    pub url: String,
    pub data: Option<Value>,
    pub raw: Option<String>,
}

/// Send a command, walking the endpoint shapes in order.
///
/// Transport failures are caught per attempt so one dead shape cannot mask a
/// later working one. When nothing accepts, the last attempt's record comes
/// back as the error detail.
pub async fn execute_command(
    client: &VendorClient,
    base: &str,
    device_id: i64,
    command_id: i64,
) -> Result<CommandOutcome, BridgeError> {
    let mut last: Option<AttemptRecord> = None;

    for shape in CommandShape::ORDERED {
        let method = shape.method();
        let url = shape.url(base, device_id, command_id);

        match client.request(method.clone(), &url, None).await {
            Ok(response) if ACCEPTED_STATUSES.contains(&response.status) => {
                debug!("Command accepted: {} {} -> {}", method, url, response.status);
                return Ok(CommandOutcome {
                    method: method.to_string(),
                    url,
                    status: response.status,
                });
            }
            Ok(response) => {
                debug!("Command rejected: {} {} -> {}", method, url, response.status);
                last = Some(AttemptRecord {
                    method: method.to_string(),
                    url,
                    status: Some(response.status),
                    body: Some(response.body),
                    error: None,
                });
            }
            Err(e) => {
                warn!("Command attempt failed: {} {}: {}", method, url, e);
                last = Some(AttemptRecord {
                    method: method.to_string(),
                    url,
                    status: None,
                    body: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Err(BridgeError::UpstreamError(last.unwrap_or_else(|| {
        AttemptRecord {
            method: String::new(),
            url: String::new(),
            status: None,
            body: None,
            error: Some("no command endpoints attempted".to_string()),
        }
    })))
}

/// List a device's commands. The listing moved between the automations and
/// devices prefixes across firmware revisions; first 200 wins. A 200 body
/// that is not JSON is passed along raw rather than dropped.
pub async fn list_commands(
    client: &VendorClient,
    base: &str,
    device_id: i64,
) -> Result<CommandListing, BridgeError> {
    let urls = [
        format!("{}/automations/{}/commands", base, device_id),
        format!("{}/devices/{}/commands", base, device_id),
    ];

    let mut last: Option<AttemptRecord> = None;

    for url in urls {
        match client.request(Method::GET, &url, None).await {
            Ok(response) if response.status == 200 => {
                return Ok(match response.json() {
                    Ok(data) => CommandListing {
                        url,
                        data: Some(data),
                        raw: None,
                    },
                    Err(_) => CommandListing {
                        url,
                        data: None,
                        raw: Some(response.body),
                    },
                });
            }
            Ok(response) => {
                debug!("Listing rejected: GET {} -> {}", url, response.status);
                last = Some(AttemptRecord {
                    method: Method::GET.to_string(),
                    url,
                    status: Some(response.status),
                    body: Some(response.body),
                    error: None,
                });
            }
            Err(e) => {
                warn!("Listing attempt failed: GET {}: {}", url, e);
                last = Some(AttemptRecord {
                    method: Method::GET.to_string(),
                    url,
                    status: None,
                    body: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Err(BridgeError::UpstreamError(last.unwrap_or_else(|| {
        AttemptRecord {
            method: Method::GET.to_string(),
            url: String::new(),
            status: None,
            body: None,
            error: Some("no listing endpoints attempted".to_string()),
        }
    })))
}
