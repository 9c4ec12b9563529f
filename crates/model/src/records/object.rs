//! Encoding of string objects into the key/value layout of the data store.
//!
//! Every object lives under a meta key `{namespace}:{db}:M:{key}`. The value
//! starts with a fixed-size header followed by the raw payload:
//!
//! | field      | bytes | notes                      |
//! |------------|-------|----------------------------|
//! | created_at | 8     | unix nanos, big endian     |
//! | updated_at | 8     | unix nanos, big endian     |
//! | expire_at  | 8     | unix nanos, 0 means never  |
//! | id         | 16    | random object id           |
//! | type       | 1     | [`ObjectType`]             |
//! | encoding   | 1     | [`ObjectEncoding`]         |

use crate::records::kv::{KvPair, Rows};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const OBJECT_HEADER_LEN: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectType {
    String = 0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectEncoding {
    Raw = 0,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    pub created_at: i64,
    pub updated_at: i64,
    pub expire_at: i64,
    pub id: Uuid,
    pub kind: ObjectType,
    pub encoding: ObjectEncoding,
}

impl ObjectHeader {
    /// Header of a freshly created, non-expiring raw string.
    pub fn string(now: DateTime<Utc>) -> Self {
        // timestamp_nanos_opt only fails far outside any realistic clock range
        let ts = now.timestamp_nanos_opt().unwrap_or(0);
        Self {
            created_at: ts,
            updated_at: ts,
            expire_at: 0,
            id: Uuid::new_v4(),
            kind: ObjectType::String,
            encoding: ObjectEncoding::Raw,
        }
    }

    pub fn encode(&self) -> [u8; OBJECT_HEADER_LEN] {
        let mut buf = [0u8; OBJECT_HEADER_LEN];
        buf[0..8].copy_from_slice(&self.created_at.to_be_bytes());
        buf[8..16].copy_from_slice(&self.updated_at.to_be_bytes());
        buf[16..24].copy_from_slice(&self.expire_at.to_be_bytes());
        buf[24..40].copy_from_slice(self.id.as_bytes());
        buf[40] = self.kind as u8;
        buf[41] = self.encoding as u8;
        buf
    }
}

/// Logical database a record is written into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbRef {
    pub namespace: String,
    pub id: u32,
}

impl DbRef {
    pub fn new(namespace: impl Into<String>, id: u32) -> Self {
        Self {
            namespace: namespace.into(),
            id,
        }
    }

    pub fn meta_key(&self, key: &[u8]) -> Vec<u8> {
        let prefix = format!("{}:{}:M:", self.namespace, self.id);
        let mut out = Vec::with_capacity(prefix.len() + key.len());
        out.extend_from_slice(prefix.as_bytes());
        out.extend_from_slice(key);
        out
    }
}

impl Default for DbRef {
    fn default() -> Self {
        Self::new("default", 0)
    }
}

/// Input record: a plain string key holding a string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRecord {
    pub key: String,
    pub value: String,
}

impl StringRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn encode(&self, db: &DbRef, now: DateTime<Utc>) -> KvPair {
        let header = ObjectHeader::string(now).encode();
        let mut value = Vec::with_capacity(OBJECT_HEADER_LEN + self.value.len());
        value.extend_from_slice(&header);
        value.extend_from_slice(self.value.as_bytes());
        KvPair::new(db.meta_key(self.key.as_bytes()), value)
    }
}

/// Encodes records in input order, stamping all of them with the same time.
pub fn encode_string_records(db: &DbRef, records: &[StringRecord], now: DateTime<Utc>) -> Rows {
    records.iter().map(|r| r.encode(db, now)).collect()
}
