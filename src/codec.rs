//! Key encodings used between the page, the push platform and the server.
//!
//! The page receives the VAPID public key as unpadded base64url and the
//! platform hands back subscription keys as raw bytes, which travel to the
//! server as standard base64.

use base64::{
    DecodeError, Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};

/// Number of `=` characters needed to bring `len` up to a multiple of four.
#[inline]
pub fn padding_len(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Decode a base64url VAPID key into the raw bytes the push API expects.
///
/// Existing padding is tolerated, so `"AQ"` and `"AQ=="` decode alike.
pub fn decode_vapid_key(key: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = key.trim().trim_end_matches('=');
    let mut standard = String::with_capacity(trimmed.len() + 3);
    standard.extend(trimmed.chars().map(|c| match c {
        '-' => '+',
        '_' => '/',
        other => other,
    }));
    standard.push_str(&"=".repeat(padding_len(trimmed.len())));
    STANDARD.decode(standard)
}

/// Standard base64 with padding, as the page posts subscription keys.
pub fn encode_key(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

/// Accept a subscription key in either alphabet and return its raw bytes.
pub fn decode_subscription_key(key: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD
        .decode(key)
        .or_else(|_| STANDARD.decode(key))
}

/// Re-encode a subscription key as unpadded base64url for storage.
pub fn normalize_subscription_key(key: &str) -> Result<String, DecodeError> {
    decode_subscription_key(key).map(|raw| URL_SAFE_NO_PAD.encode(raw))
}
