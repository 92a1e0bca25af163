//! Compact, time-ordered record identifiers.
//!
//! An identifier is 32 lowercase hex characters: 8 for the Unix timestamp
//! (seconds) at creation, followed by 24 random ones (12 bytes from the OS
//! entropy source).

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::datamodel::DataModelError;
use crate::record::DomainEntity;

/// Total length of a valid identifier
pub const IDENTIFIER_LEN: usize = 32;

const TIMESTAMP_LEN: usize = 8;
const RANDOM_BYTES: usize = 12;

/// Generate a fresh identifier for the current second
pub fn generate() -> Result<String, DataModelError> {
    generate_at(Utc::now())
}

fn generate_at(now: DateTime<Utc>) -> Result<String, DataModelError> {
    let mut bytes = [0u8; RANDOM_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(DataModelError::Entropy)?;

    let mut id = String::with_capacity(IDENTIFIER_LEN);
    // Timestamps past 2106 wrap; the prefix only ever holds 32 bits.
    id.push_str(&format!("{:08x}", now.timestamp() as u32));
    for byte in bytes {
        id.push_str(&format!("{:02x}", byte));
    }
    Ok(id)
}

/// Read the creation time embedded in the first 8 characters
pub fn extract_time(id: &str) -> Result<DateTime<Utc>, DataModelError> {
    let prefix = id.get(..TIMESTAMP_LEN).ok_or_else(|| DataModelError::MalformedId {
        id: id.to_string(),
        reason: "too short to hold a timestamp".to_string(),
    })?;

    if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DataModelError::MalformedId {
            id: id.to_string(),
            reason: format!("timestamp prefix '{}' is not hexadecimal", prefix),
        });
    }

    let seconds = i64::from_str_radix(prefix, 16).map_err(|e| DataModelError::MalformedId {
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    DateTime::from_timestamp(seconds, 0).ok_or_else(|| DataModelError::MalformedId {
        id: id.to_string(),
        reason: format!("timestamp {} is out of range", seconds),
    })
}

/// Make sure an entity carries a usable identifier.
///
/// Anything exactly 32 characters long is accepted as-is, whoever minted it.
/// Empty identifiers are filled in, identifiers of any other length are
/// replaced.
pub fn ensure_identifier<E: DomainEntity + ?Sized>(entity: &mut E) -> Result<(), DataModelError> {
    let current = entity.uuid();
    if current.len() == IDENTIFIER_LEN {
        return Ok(());
    }
    if !current.is_empty() {
        tracing::info!("Invalid uuid '{}', a new value will be generated", current);
    }

    let id = generate()?;
    entity.set_uuid(id);
    Ok(())
}
