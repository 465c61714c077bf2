//! CAME Connect vendor API module

pub mod client;
pub mod commands;
pub mod status;

/// Candidate API hosts, tried in order until one completes the OAuth exchange.
pub const API_BASE_CANDIDATES: [&str; 2] = [
    "https://app.cameconnect.net/api",
    "https://beta.cameconnect.net/api",
];

/// Redirect URI the vendor's authorization endpoint expects.
pub const REDIRECT_URI: &str = "https://beta.cameconnect.net/role";
