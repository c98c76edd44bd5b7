//! Store - the versioned in-memory record container.
//!
//! Every key maps to exactly one value plus its [`Metadata`]. Writes replace
//! the whole value, bump the version and derive a new [`ChangeToken`];
//! reads can be short-circuited with a previously observed token.
//!
//! Entries live in a sharded concurrent map. Operations on one key are
//! serialized by its shard lock, so readers never observe a half-applied
//! write, while operations on other keys proceed independently. No operation
//! spans several keys atomically.

use crate::{error::Result, ChangeToken, Key, Metadata, Record, Timestamp, Version};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Version and token assigned by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReceipt {
    pub version: Version,
    pub change_token: ChangeToken,
}

/// Result of a (possibly conditional) read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<V> {
    /// Current value; `metadata` carries its version and change token
    Found { value: V, metadata: Metadata },
    /// The caller's token is current, so the value is not returned
    NotModified { change_token: ChangeToken },
    NotFound,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Result of an insert that must not overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(WriteReceipt),
    /// Nothing was written; the existing entry is described
    AlreadyExists {
        version: Version,
        change_token: ChangeToken,
    },
}

/// Listing projection of a stored plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub key: Key,
    pub object_id: String,
    #[serde(rename = "_org")]
    pub org: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug)]
struct Slot<V> {
    /// Insertion sequence, fixed for the lifetime of the entry
    seq: u64,
    value: V,
    metadata: Metadata,
}

/// Versioned key-value store with change tokens.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug)]
pub struct VersionedStore<V = Record> {
    entries: DashMap<Key, Slot<V>>,
    next_seq: AtomicU64,
}

impl<V> Default for VersionedStore<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }
}

/// Current wall-clock time in milliseconds since epoch.
pub fn now_millis() -> Timestamp {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

impl<V: Serialize + Clone> VersionedStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Write `value` under `key`, overwriting any previous entry.
    pub fn put(&self, key: impl Into<Key>, value: V) -> Result<WriteReceipt> {
        self.put_at(key, value, now_millis())
    }

    /// [`put`](Self::put) with an explicit timestamp.
    ///
    /// The value is serialized before the key is locked, so a serialization
    /// failure leaves the existing entry untouched.
    pub fn put_at(&self, key: impl Into<Key>, value: V, timestamp: Timestamp) -> Result<WriteReceipt> {
        let serialized = serde_json::to_vec(&value)?;

        let metadata = match self.entries.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                let token = ChangeToken::derive(&serialized, slot.metadata.version + 1);
                slot.metadata = slot.metadata.successor(timestamp, token);
                slot.value = value;
                slot.metadata.clone()
            }
            Entry::Vacant(vacant) => self.insert_vacant(vacant, value, &serialized, timestamp),
        };

        Ok(WriteReceipt {
            version: metadata.version,
            change_token: metadata.change_token,
        })
    }

    /// Write `value` only if `key` is absent, atomically.
    pub fn insert_if_absent(&self, key: impl Into<Key>, value: V) -> Result<InsertOutcome> {
        self.insert_if_absent_at(key, value, now_millis())
    }

    /// [`insert_if_absent`](Self::insert_if_absent) with an explicit timestamp.
    pub fn insert_if_absent_at(
        &self,
        key: impl Into<Key>,
        value: V,
        timestamp: Timestamp,
    ) -> Result<InsertOutcome> {
        let serialized = serde_json::to_vec(&value)?;

        match self.entries.entry(key.into()) {
            Entry::Occupied(occupied) => {
                let metadata = &occupied.get().metadata;
                Ok(InsertOutcome::AlreadyExists {
                    version: metadata.version,
                    change_token: metadata.change_token.clone(),
                })
            }
            Entry::Vacant(vacant) => {
                let metadata = self.insert_vacant(vacant, value, &serialized, timestamp);
                Ok(InsertOutcome::Created(WriteReceipt {
                    version: metadata.version,
                    change_token: metadata.change_token,
                }))
            }
        }
    }

    fn insert_vacant(
        &self,
        vacant: dashmap::mapref::entry::VacantEntry<'_, Key, Slot<V>>,
        value: V,
        serialized: &[u8],
        timestamp: Timestamp,
    ) -> Metadata {
        let metadata = Metadata::initial(timestamp, ChangeToken::derive(serialized, 1));
        vacant.insert(Slot {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            value,
            metadata: metadata.clone(),
        });
        metadata
    }

    /// Read `key`.
    ///
    /// When `if_none_match` equals the current change token the value is
    /// withheld and [`ReadOutcome::NotModified`] is returned.
    pub fn get(&self, key: &str, if_none_match: Option<&ChangeToken>) -> ReadOutcome<V> {
        let Some(slot) = self.entries.get(key) else {
            return ReadOutcome::NotFound;
        };

        if if_none_match == Some(&slot.metadata.change_token) {
            return ReadOutcome::NotModified {
                change_token: slot.metadata.change_token.clone(),
            };
        }

        ReadOutcome::Found {
            value: slot.value.clone(),
            metadata: slot.metadata.clone(),
        }
    }

    /// Remove `key` and its metadata.
    pub fn delete(&self, key: &str) -> DeleteOutcome {
        match self.entries.remove(key) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        }
    }

    /// Check if a key is present.
    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project every entry, in insertion order.
    ///
    /// Overwrites keep a key's position; a deleted and re-created key moves
    /// to the end. `projection` runs while a shard is read-locked and must
    /// not call back into the store.
    pub fn list_with<T, F>(&self, projection: F) -> Vec<T>
    where
        F: Fn(&str, &V, &Metadata) -> T,
    {
        let mut rows: Vec<(u64, T)> = self
            .entries
            .iter()
            .map(|entry| {
                let slot = entry.value();
                (slot.seq, projection(entry.key().as_str(), &slot.value, &slot.metadata))
            })
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

impl VersionedStore<Record> {
    /// Summaries of every stored plan, in insertion order.
    pub fn list(&self) -> Vec<RecordSummary> {
        self.list_with(|key, record, metadata| RecordSummary {
            key: key.to_string(),
            object_id: record.object_id.clone(),
            org: record.org.clone(),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            metadata: metadata.clone(),
        })
    }
}
