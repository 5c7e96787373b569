//! Salted password hashing.
//!
//! Stored form: `sha256$<salt-hex>$<digest-hex>`. The scheme tag is kept in
//! the stored value so the format can be migrated without a schema change.

use crate::error::{Error, Result};
use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!(
        "{SCHEME}${}${}",
        hex::encode(salt),
        hex::encode(digest(&salt, password))
    )
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(false)` for a wrong password; errors only when the stored
/// value itself is malformed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let mut parts = stored.splitn(3, '$');
    let (scheme, salt_hex, digest_hex) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(salt), Some(digest)) => (scheme, salt, digest),
        _ => return Err(Error::InvalidPasswordHash("missing fields".to_string())),
    };

    if scheme != SCHEME {
        return Err(Error::InvalidPasswordHash(format!(
            "unknown scheme: {scheme}"
        )));
    }

    let salt = hex::decode(salt_hex)
        .ok_or_else(|| Error::InvalidPasswordHash("invalid salt encoding".to_string()))?;
    let expected = hex::decode(digest_hex)
        .ok_or_else(|| Error::InvalidPasswordHash("invalid digest encoding".to_string()))?;

    let actual = digest(&salt, password);

    // Length is fixed by the scheme; compare without short-circuiting.
    if expected.len() != actual.len() {
        return Ok(false);
    }
    let mut diff = 0u8;
    for (a, b) in expected.iter().zip(actual.iter()) {
        diff |= a ^ b;
    }
    Ok(diff == 0)
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

// Note: hex is a simple utility, we'll inline it
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}
