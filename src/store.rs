//! State store - flat key/value mirror of the installation state
//!
//! The store is mutated only by applying deltas received on the sync channel.
//! Keys are never removed; a later write to the same key replaces the value.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde_json::{Map, Value};

use crate::error::StoreError;

/// One batch of key/value updates as received from the server
pub type Delta = Map<String, Value>;

/// Decode an inbound sync message into a delta
///
/// The whole message is rejected when it is not a JSON object, so a failed
/// decode never leaves the store half-applied.
pub fn decode_delta(payload: &str) -> Result<Delta, StoreError> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Object(map) => Ok(map),
        Value::Null => Err(StoreError::NotAnObject("null")),
        Value::Bool(_) => Err(StoreError::NotAnObject("bool")),
        Value::Number(_) => Err(StoreError::NotAnObject("number")),
        Value::String(_) => Err(StoreError::NotAnObject("string")),
        Value::Array(_) => Err(StoreError::NotAnObject("array")),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateStore {
    entries: BTreeMap<String, Value>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every key of the delta, last write wins
    pub fn apply(&mut self, delta: Delta) {
        for (key, value) in delta {
            self.entries.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Entries whose key starts with `prefix`, in key order
    pub fn scan_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
