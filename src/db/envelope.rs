// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Versioned encoding of persisted slices.
//!
//! Every value is written as `{"version": N, "data": ...}`. Values written
//! before versioning existed are bare JSON and are read as version 0, then
//! migrated forward.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::db::{keys, StoreError};

/// Current slice format version. Bump this and add a migration step whenever
/// a persisted shape changes.
pub const CURRENT_VERSION: u64 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u64,
    data: &'a T,
}

/// Encode a slice in the current versioned format.
pub fn encode<T: Serialize>(data: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&Envelope {
        version: CURRENT_VERSION,
        data,
    })?)
}

/// Decode a stored slice, migrating older formats.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StoreError> {
    let value: Value = serde_json::from_str(raw)?;
    let (version, data) = split_envelope(value);

    if version > CURRENT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }

    let data = migrate(key, version, data);
    Ok(serde_json::from_value(data)?)
}

/// Separate the version tag from the payload. Anything that is not exactly an
/// envelope object is an unversioned (version 0) payload.
fn split_envelope(value: Value) -> (u64, Value) {
    match value {
        Value::Object(mut map) if map.len() == 2 && map.contains_key("data") => {
            match map.get("version").and_then(Value::as_u64) {
                Some(version) => {
                    let data = map.remove("data").unwrap_or(Value::Null);
                    (version, data)
                }
                None => (0, Value::Object(map)),
            }
        }
        other => (0, other),
    }
}

/// Bring a payload from `version` up to [`CURRENT_VERSION`].
fn migrate(key: &str, version: u64, mut data: Value) -> Value {
    if version < 1 {
        tracing::info!(key, from = version, to = 1, "Migrating stored slice");
        data = v001_drop_cached_group_impact(key, data);
    }

    data
}

/// v0 groups carried a cached `impact` total next to their members; group
/// impact is now always derived from the members.
fn v001_drop_cached_group_impact(key: &str, mut data: Value) -> Value {
    if key != keys::ACTIVITY_GROUPS {
        return data;
    }

    if let Value::Array(groups) = &mut data {
        for group in groups.iter_mut() {
            if let Value::Object(fields) = group {
                fields.remove("impact");
            }
        }
    }

    data
}
