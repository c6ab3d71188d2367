use crate::error::RelayError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs the exact body bytes with HMAC-SHA256 and returns the lowercase hex
/// digest. An empty secret is a valid (if weak) key.
pub fn sign_body(secret: &str, body: &[u8]) -> Result<String, RelayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| RelayError::Signing(e.to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
