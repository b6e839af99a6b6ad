//! Per-second event counting for rate limiters and activity monitors.
//!
//! A [`RateCounter`] records "mark" events and answers "how many events happened in each
//! of the last N seconds?" from a fixed ring of per-second buckets, without storing
//! individual events.
//!
//! ## Example
//! ```rust
//! use rate_counter::{ManualClock, RateCounter};
//!
//! let clock = ManualClock::new(1_000);
//! let mut counter = RateCounter::with_clock(5, clock.clone())?;
//! counter.mark();
//! counter.mark();
//! clock.advance_secs(1);
//! counter.mark();
//! clock.advance_secs(1);
//!
//! assert_eq!(counter.histogram(3)?, vec![0, 2, 1]);
//! # Ok::<(), rate_counter::Error>(())
//! ```

use serde::{Deserialize, Serialize};

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{Error, Result};
pub use crate::rate_counter::{Bucket, RateCounter};
pub use crate::snapshot::Snapshot;

mod clock;
mod error;
mod rate_counter;
mod snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    //Number of distinct active seconds kept in the ring
    pub bucket_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { bucket_count: 60 }
    }
}
