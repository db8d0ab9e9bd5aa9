//! Versioned JSON records on top of a [`KeyValueStore`].

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{KeyValueStore, StoreError};

/// A value persisted under a fixed key with a schema version.
///
/// Records are written as `{"v": VERSION, "data": ...}`. Anything read back
/// without that envelope is treated as version 0, the shape written before
/// versioning existed.
pub trait StoredRecord: Serialize + DeserializeOwned {
    /// Storage key.
    const KEY: &'static str;

    /// Current schema version. Must be at least 1.
    const VERSION: u32;

    /// Upgrade a payload written at version `from` to the current shape.
    ///
    /// The default refuses every older version.
    fn migrate(from: u32, data: Value) -> Result<Value, StoreError> {
        let _ = data;
        Err(StoreError::UnsupportedVersion {
            key: Self::KEY,
            found: from,
            expected: Self::VERSION,
        })
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    v: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    v: u32,
    data: Value,
}

/// Typed access to a shared [`KeyValueStore`].
#[derive(Clone)]
pub struct TypedStore {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TypedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedStore").finish_non_exhaustive()
    }
}

impl TypedStore {
    /// Wrap a backend.
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// The underlying backend.
    pub fn raw(&self) -> &dyn KeyValueStore {
        self.inner.as_ref()
    }

    /// Load a record, migrating older shapes.
    ///
    /// A migrated value is written back at the current version.
    pub fn load<R: StoredRecord>(&self) -> Result<Option<R>, StoreError> {
        let Some(raw) = self.inner.get(R::KEY)? else {
            return Ok(None);
        };

        let (version, data) = split_envelope(&raw);

        if version == R::VERSION {
            return Ok(Some(serde_json::from_value(data)?));
        }
        if version > R::VERSION {
            return Err(StoreError::UnsupportedVersion {
                key: R::KEY,
                found: version,
                expected: R::VERSION,
            });
        }

        let migrated = R::migrate(version, data)?;
        let record: R = serde_json::from_value(migrated)?;
        tracing::debug!(key = R::KEY, from = version, to = R::VERSION, "migrated stored record");
        self.save(&record)?;
        Ok(Some(record))
    }

    /// Persist a record at the current version.
    pub fn save<R: StoredRecord>(&self, record: &R) -> Result<(), StoreError> {
        let json = serde_json::to_string(&EnvelopeRef {
            v: R::VERSION,
            data: record,
        })?;
        self.inner.set(R::KEY, &json)
    }

    /// Remove a record.
    pub fn remove<R: StoredRecord>(&self) -> Result<(), StoreError> {
        self.inner.delete(R::KEY)
    }

    /// Load a record and remove it, so it is consumed exactly once.
    pub fn take<R: StoredRecord>(&self) -> Result<Option<R>, StoreError> {
        let record = self.load::<R>();
        self.inner.delete(R::KEY)?;
        record
    }

    /// Get a plain string value.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    /// Set a plain string value.
    pub fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    /// Delete a plain key.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

/// Split a raw stored value into (version, payload).
fn split_envelope(raw: &str) -> (u32, Value) {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => match serde_json::from_value::<Envelope>(value.clone()) {
            Ok(envelope) => (envelope.v, envelope.data),
            Err(_) => (0, value),
        },
        // Bare strings were stored without JSON encoding.
        Err(_) => (0, Value::String(raw.to_string())),
    }
}
