//! PKCE verifier and challenge generation

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A verifier/challenge pair for one authorization attempt
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

/// Generate a fresh verifier and its S256 challenge.
///
/// The verifier starts from 32 bytes of entropy; the url-safe alphabet's
/// `-` and `_` are stripped so the value stays plain alphanumeric, which is
/// the form the vendor's authorization endpoint accepts.
pub fn pkce_pair() -> PkcePair {
    let mut random = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random);

    let verifier: String = URL_SAFE_NO_PAD
        .encode(random)
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    let challenge = challenge_for(&verifier);

    PkcePair {
        verifier,
        challenge,
    }
}

/// Compute the padding-free base64url S256 challenge for a verifier
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
