use bincode::{deserialize, serialize};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rate_counter::Bucket;

/// A point-in-time copy of a counter's ring, for logging and debugging.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub buckets: Vec<Bucket>,
    pub head: usize,
    pub tail: usize,
    /// Clock reading, in Unix seconds, when the snapshot was taken.
    pub taken_at: i64,
}

impl Snapshot {
    /// Number of slots that have been written at least once.
    #[inline]
    pub fn occupied(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// The most recently written bucket, if any.
    #[inline]
    pub fn latest(&self) -> Option<&Bucket> {
        self.buckets.get(self.head).filter(|b| !b.is_empty())
    }

    #[inline]
    pub fn encode(&self) -> Result<Vec<u8>> {
        serialize(self).map_err(|e| Error::Encode(e.to_string()))
    }

    #[inline]
    pub fn decode(data: &[u8]) -> Result<Self> {
        deserialize(data).map_err(|e| Error::Decode(e.to_string()))
    }
}
