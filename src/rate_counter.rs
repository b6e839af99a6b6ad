//! A per-second event counter over a fixed ring of buckets.
//!
//! Each bucket holds the number of marks seen during one Unix second. Marks within the
//! same second coalesce into the bucket at `head`; the first mark of a new second moves
//! `head` forward and overwrites whatever that slot held. Once the ring is full the slot
//! being overwritten is the oldest one, and `tail` moves along with it.
//!
//! Seconds without marks get no bucket at all, so the ring stores the last `capacity`
//! *active* seconds, not the last `capacity` seconds of wall time. [`RateCounter::histogram`]
//! fills the gaps back in with zeros.
//!
//! ```text
//!   capacity = 5, marks at t=101 (x3), t=102 (x2), t=103 (x1)
//!
//!   slot:   0       1       2       3       4
//!         [empty] [101:3] [102:2] [103:1] [empty]
//!    tail ---^                       ^--- head
//!
//!   histogram(5) at t=104 => [0, 0, 3, 2, 1]   // seconds 99..=103
//! ```
//!
//! The counter is not synchronized. It is meant to be owned by a single thread or task
//! (a rate-limiting filter, a connection handler); share it behind a lock if you must.

use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::snapshot::Snapshot;
use crate::Config;

/// Marks observed during one second.
///
/// `timestamp` is `None` for a slot that has never been written, which keeps an
/// empty slot apart from a real second at the Unix epoch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub timestamp: Option<i64>,
    pub count: u64,
}

impl Bucket {
    #[inline]
    fn first_mark(timestamp: i64) -> Self {
        Bucket {
            timestamp: Some(timestamp),
            count: 1,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RateCounter<C = SystemClock> {
    buckets: Vec<Bucket>,
    head: usize,
    tail: usize,
    total_marks: u64,
    clock: C,
}

impl RateCounter<SystemClock> {
    /// Creates a counter with `max_buckets` slots that reads the system clock.
    pub fn new(max_buckets: usize) -> Result<Self> {
        Self::with_clock(max_buckets, SystemClock)
    }
}

impl<C: Clock> RateCounter<C> {
    /// Creates a counter with `max_buckets` slots that reads time from `clock`.
    ///
    /// Fails with [`Error::InvalidBucketCount`] when `max_buckets` is zero.
    pub fn with_clock(max_buckets: usize, clock: C) -> Result<Self> {
        if max_buckets == 0 {
            return Err(Error::InvalidBucketCount(max_buckets));
        }
        debug!("new rate counter, buckets: {}", max_buckets);
        Ok(RateCounter {
            buckets: vec![Bucket::default(); max_buckets],
            head: 0,
            tail: 0,
            total_marks: 0,
            clock,
        })
    }

    #[inline]
    pub fn from_config(cfg: &Config, clock: C) -> Result<Self> {
        Self::with_clock(cfg.bucket_count, clock)
    }

    /// Records one event at the current second.
    pub fn mark(&mut self) {
        let now = self.clock.now_secs();
        self.total_marks += 1;

        let head = self.head;
        if self.buckets[head].timestamp == Some(now) {
            self.buckets[head].count += 1;
            return;
        }
        self.open_bucket(now);
    }

    /// Moves `head` to a fresh bucket for `now`.
    ///
    /// Returns the second that lost its slot, or `None` when the overwritten slot was
    /// never written.
    fn open_bucket(&mut self, now: i64) -> Option<Bucket> {
        let capacity = self.buckets.len();
        self.head = (self.head + 1) % capacity;
        let overwritten = std::mem::replace(&mut self.buckets[self.head], Bucket::first_mark(now));

        // The ring has wrapped onto the oldest retained slot.
        if self.head == self.tail {
            self.tail = (self.tail + 1) % capacity;
        }

        if overwritten.is_empty() {
            return None;
        }
        trace!(
            "bucket evicted, timestamp: {:?}, count: {}, head: {}, tail: {}",
            overwritten.timestamp,
            overwritten.count,
            self.head,
            self.tail
        );
        Some(overwritten)
    }

    /// Returns the counts for the `num_seconds` seconds before the current one.
    ///
    /// Element `i` is the count for second `now - num_seconds + i`, so the last element
    /// is the most recently completed second. The in-progress second is never included.
    /// Seconds with no bucket, including those older than the ring can hold, read as zero.
    ///
    /// Fails with [`Error::InvalidWindow`] when `num_seconds` is zero or does not fit
    /// in an `i64`.
    pub fn histogram(&self, num_seconds: usize) -> Result<Vec<u64>> {
        if num_seconds == 0 {
            return Err(Error::InvalidWindow(num_seconds));
        }
        let window = i64::try_from(num_seconds).map_err(|_| Error::InvalidWindow(num_seconds))?;

        // Key: timestamp, value: count. Later slots win on duplicate keys.
        let index = self
            .buckets
            .iter()
            .filter_map(|b| b.timestamp.map(|ts| (ts, b.count)))
            .collect::<HashMap<_, _>>();

        let start = self.clock.now_secs().saturating_sub(window);
        let hist = (0..window)
            .map(|i| index.get(&(start + i)).copied().unwrap_or(0))
            .collect::<Vec<_>>();
        Ok(hist)
    }

    /// Sum of the counts [`histogram`](Self::histogram) would return for the same window.
    #[inline]
    pub fn total(&self, num_seconds: usize) -> Result<u64> {
        Ok(self.histogram(num_seconds)?.iter().sum())
    }

    /// Average marks per second over the last `num_seconds` completed seconds.
    #[inline]
    pub fn rate_per_second(&self, num_seconds: usize) -> Result<f64> {
        let total = self.total(num_seconds)?;
        Ok(total as f64 / num_seconds as f64)
    }

    /// Marks recorded so far in the current, still open, second.
    #[inline]
    pub fn current_count(&self) -> u64 {
        let bucket = &self.buckets[self.head];
        if bucket.timestamp == Some(self.clock.now_secs()) {
            bucket.count
        } else {
            0
        }
    }

    /// Every mark recorded since construction, evicted seconds included.
    #[inline]
    pub fn total_marks(&self) -> u64 {
        self.total_marks
    }

    /// Empties every bucket. `total_marks` is left untouched.
    pub fn reset(&mut self) {
        self.buckets.fill(Bucket::default());
        self.head = 0;
        self.tail = 0;
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            buckets: self.buckets.clone(),
            head: self.head,
            tail: self.tail,
            taken_at: self.clock.now_secs(),
        }
    }
}
