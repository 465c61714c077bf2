//! Vendor token record and claim inspection

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims surfaced by the debug endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration timestamp
    pub exp: Option<i64>,
}

/// The persisted vendor token record.
///
/// Everything the token endpoint returned is kept as-is; the bound API host
/// rides along under the `_base` key so a single file survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default)]
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// API base the exchange succeeded against
    #[serde(rename = "_base", default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Remaining token endpoint fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenRecord {
    /// A record is usable only with a non-empty access token
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Decode JWT claims without validating the signature.
///
/// The bridge never verifies vendor tokens; it only peeks at `exp` for
/// diagnostics. Returns `None` for anything that does not parse as a JWT.
pub fn peek_claims(raw: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(raw, &DecodingKey::from_secret(b""), &validation)
        .map(|data| data.claims)
        .ok()
}
