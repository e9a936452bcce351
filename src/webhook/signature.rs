//! Request signature verification.
//!
//! The platform signs every callback body with HMAC-SHA1 keyed by the app
//! secret and sends it as `X-Hub-Signature: sha1=<hex>`.

use ring::hmac;

use crate::error::WebhookError;

/// Verify a callback body against its signature header.
pub fn verify_signature(
    app_secret: &str,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let hex_sig = header
        .strip_prefix("sha1=")
        .ok_or(WebhookError::BadSignature)?;
    let sig = decode_hex(hex_sig).ok_or(WebhookError::BadSignature)?;

    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, app_secret.as_bytes());
    hmac::verify(&key, body, &sig).map_err(|_| WebhookError::BadSignature)
}

/// Produce the header value for a body — the counterpart of
/// `verify_signature`, used by tests and tooling.
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, app_secret.as_bytes());
    let tag = hmac::sign(&key, body);
    let mut out = String::with_capacity(5 + tag.as_ref().len() * 2);
    out.push_str("sha1=");
    for byte in tag.as_ref() {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
