//! Signed tokens for local file links.
//!
//! Payload: expires_at_ms (u64 BE) || storage key bytes.
//! Token = base64url(payload || HMAC-SHA256(secret, payload)).

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::traits::{StorageError, StorageResult};

const EXPIRY_LEN: usize = 8;
const MAC_LEN: usize = 32; // SHA256

fn mac_for(secret: &[u8]) -> StorageResult<Hmac<Sha256>> {
    Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| StorageError::SigningFailed(e.to_string()))
}

/// Build a token granting GET access to `storage_key` until `expires_at_ms`.
pub fn create(storage_key: &str, expires_at_ms: i64, secret: &[u8]) -> StorageResult<String> {
    let expiry = u64::try_from(expires_at_ms).unwrap_or(0);

    let mut payload = Vec::with_capacity(EXPIRY_LEN + storage_key.len() + MAC_LEN);
    payload.extend_from_slice(&expiry.to_be_bytes());
    payload.extend_from_slice(storage_key.as_bytes());

    let mut mac = mac_for(secret)?;
    mac.update(&payload);
    let tag = mac.finalize().into_bytes();
    payload.extend_from_slice(&tag);

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload))
}

/// Verify a token and return the storage key it grants.
///
/// A malformed or tampered token is `InvalidToken`; a genuine token whose
/// expiry has passed is `NotFound`, since the object is gone by then.
pub fn verify(token: &str, secret: &[u8], now_ms: i64) -> StorageResult<String> {
    let invalid = || StorageError::InvalidToken("Invalid file token".to_string());

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| invalid())?;
    if decoded.len() <= EXPIRY_LEN + MAC_LEN {
        return Err(invalid());
    }

    let (payload, tag) = decoded.split_at(decoded.len() - MAC_LEN);
    let mut mac = mac_for(secret)?;
    mac.update(payload);
    mac.verify_slice(tag).map_err(|_| invalid())?;

    let mut expiry_bytes = [0u8; EXPIRY_LEN];
    expiry_bytes.copy_from_slice(&payload[..EXPIRY_LEN]);
    let expires_at_ms = i64::try_from(u64::from_be_bytes(expiry_bytes)).unwrap_or(i64::MAX);

    let storage_key = String::from_utf8(payload[EXPIRY_LEN..].to_vec()).map_err(|_| invalid())?;

    if now_ms >= expires_at_ms {
        return Err(StorageError::NotFound(storage_key));
    }

    Ok(storage_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_token_round_trip() {
        let token = create("downloads/abc/clip.mp4", 10_000, SECRET).unwrap();
        assert_eq!(
            verify(&token, SECRET, 9_999).unwrap(),
            "downloads/abc/clip.mp4"
        );
    }

    #[test]
    fn test_expired_token_is_not_found() {
        let token = create("downloads/abc/clip.mp4", 10_000, SECRET).unwrap();
        assert!(matches!(
            verify(&token, SECRET, 10_000),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = create("downloads/abc/clip.mp4", 10_000, SECRET).unwrap();
        let mut bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&token)
            .unwrap();
        // Point the token at a different key.
        bytes[EXPIRY_LEN] ^= 0x01;
        let forged = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        assert!(matches!(
            verify(&forged, SECRET, 0),
            Err(StorageError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_secret_and_garbage_are_rejected() {
        let token = create("downloads/abc/clip.mp4", 10_000, SECRET).unwrap();
        assert!(matches!(
            verify(&token, b"another-secret", 0),
            Err(StorageError::InvalidToken(_))
        ));
        assert!(matches!(
            verify("not*base64", SECRET, 0),
            Err(StorageError::InvalidToken(_))
        ));
        assert!(matches!(
            verify("AAAA", SECRET, 0),
            Err(StorageError::InvalidToken(_))
        ));
    }
}
