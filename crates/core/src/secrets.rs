//! Partner secret generation, hashing, and webhook HMAC signing.
//!
//! Partners authenticate with an opaque secret presented in `X-Api-Key`.
//! Only the SHA-256 hash is ever stored; the plaintext is returned exactly
//! once at creation or rotation and never again.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated partner secret (alphanumeric characters).
pub const SECRET_LENGTH: usize = 48;

/// Number of leading characters kept as a human-visible prefix for
/// identifying a secret without revealing it.
pub const SECRET_PREFIX_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Secret generation
// ---------------------------------------------------------------------------

/// The result of generating a new partner secret.
pub struct GeneratedSecret {
    /// The plaintext secret (shown to the administrator exactly once).
    pub plaintext: String,
    /// The first [`SECRET_PREFIX_LENGTH`] characters, safe to display.
    pub prefix: String,
    /// The SHA-256 hex digest stored in the database.
    pub hash: String,
}

/// Generate a new random partner secret.
///
/// Returns the plaintext (shown once), prefix (for identification), and
/// SHA-256 hash (for storage). The plaintext must never be persisted.
pub fn generate_secret() -> GeneratedSecret {
    let secret: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    let prefix = secret[..SECRET_PREFIX_LENGTH].to_string();
    let hash = hash_secret(&secret);

    GeneratedSecret {
        plaintext: secret,
        prefix,
        hash,
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the SHA-256 hex digest of a partner secret.
///
/// Used both when storing a new secret and when authenticating an inbound
/// request (look up the partner by hash).
pub fn hash_secret(secret: &str) -> String {
    crate::hashing::sha256_hex(secret.as_bytes())
}

// ---------------------------------------------------------------------------
// Notification HMAC signing
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Compute an HMAC-SHA256 signature for an outbound notification payload.
///
/// The `secret` is the partner's notification signing secret; the `payload`
/// is the JSON body being delivered. Returns the hex-encoded signature.
pub fn compute_notification_hmac(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    let result = mac.finalize();
    hex_encode(result.into_bytes())
}

/// Encode bytes as a lowercase hex string.
fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
