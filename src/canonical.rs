//! Canonical serialization for snapshot fingerprints.
//!
//! A fingerprint is the xxh64 of the compact JSON of the flat snapshot
//! form together with [`SNAPSHOT_SCHEMA_VERSION`](crate::SNAPSHOT_SCHEMA_VERSION).
//! The bytes are stable because:
//!
//! - struct fields serialize in declaration order
//! - the library table comes from a post-order walk over the roots in
//!   order and holds each library once
//! - every other sequence keeps resolver order; nothing hashed is a map

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Error produced when a value cannot be serialized canonically.
#[derive(Debug, thiserror::Error)]
#[error("Canonical serialization failed: {0}")]
pub struct CanonicalError(#[from] serde_json::Error);

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    Ok(serde_json::to_vec(value)?)
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<u64, CanonicalError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(xxh64(&bytes, 0))
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    Ok(format!("{:016x}", canonical_hash(value)?))
}
