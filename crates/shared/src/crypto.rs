//! Random token generation for public share links.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind a share token (encodes to 32 characters).
pub const SHARE_TOKEN_BYTES: usize = 24;

/// Shortest encoded token accepted as a share token.
pub const MIN_SHARE_TOKEN_LEN: usize = 22;

/// Longest encoded token accepted as a share token.
pub const MAX_SHARE_TOKEN_LEN: usize = 128;

/// Generates a new URL-safe share token from the OS random source.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Checks that a token has the shape of a share token before it is looked up.
///
/// Rejects obviously malformed input early so it never reaches the store.
pub fn is_well_formed_share_token(token: &str) -> bool {
    (MIN_SHARE_TOKEN_LEN..=MAX_SHARE_TOKEN_LEN).contains(&token.len())
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
