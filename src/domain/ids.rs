// src/domain/ids.rs
use base64::Engine;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

pub const ID_SUFFIX_BYTES: usize = 6;

/// Generate a new opaque id such as `bid-18c2f3a1b2c-Zk3x9QaB`.
/// Time-based prefix keeps ids roughly sortable; the random suffix keeps them unique.
pub fn new_id(prefix: &str) -> String {
    let mut rng = OsRng;
    new_id_with(&mut rng, prefix, Utc::now().timestamp_millis())
}

pub fn new_id_with<R: RngCore>(rng: &mut R, prefix: &str, millis: i64) -> String {
    format!(
        "{prefix}-{millis:x}-{}",
        generate_token(rng, ID_SUFFIX_BYTES)
    )
}

/// Generate a URL-safe token from random bytes.
/// Base64 URL-safe, no padding: never contains `/`, which the kanban cell ids rely on.
pub fn generate_token<R: RngCore>(rng: &mut R, nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buf)
}
