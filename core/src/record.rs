use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A synthetic row for the entity table, generated from its sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based position in the generated range.
    pub sequence: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Store-assigned primary key. Only ever read back from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn get(&self) -> i64 { self.0 }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self { RecordId(id) }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
