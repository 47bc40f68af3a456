use rand::{rngs::OsRng, RngCore};

/// Random bytes behind an API token.
const TOKEN_BYTES: usize = 32;

/// Fresh opaque API token: 32 random bytes, hex-encoded.
pub fn generate_api_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Cheap shape check before a token hits the database.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}
