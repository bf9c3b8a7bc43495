//! String identifier generation.
//!
//! Ids look like `{prefix}-{millis_hex}-{random_hex}`. The random part comes
//! from a v4 UUID, so collisions within one local dataset are negligible.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const DEFAULT_ID_PREFIX: &str = "id";
const RANDOM_SUFFIX_BITS: u32 = 52;

/// Prefix used for schema ids.
pub const SCHEMA_ID_PREFIX: &str = "schema";
/// Prefix used for note ids.
pub const NOTE_ID_PREFIX: &str = "note";

/// Generates a new id starting with `{prefix}-`.
///
/// A blank prefix falls back to `id`.
pub fn generate_id(prefix: &str) -> String {
    let prefix = match prefix.trim() {
        "" => DEFAULT_ID_PREFIX,
        trimmed => trimmed,
    };
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let random = Uuid::new_v4().as_u128() & ((1u128 << RANDOM_SUFFIX_BITS) - 1);
    format!("{prefix}-{millis:x}-{random:x}")
}
