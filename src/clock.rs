//! Time sources for [`RateCounter`](crate::RateCounter).
//!
//! A counter never reads ambient time directly; it asks the [`Clock`] it was built with.
//! Production code uses [`SystemClock`], tests drive a [`ManualClock`] forward explicitly.

use std::rc::Rc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Supplies the current Unix time in whole seconds.
pub trait Clock {
    fn now_secs(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so one handle can be given to a counter
/// while another stays with the test that advances time.
///
/// Counters are single-threaded, but the instant sits behind an `Arc<AtomicI64>`
/// rather than an `Rc<Cell<_>>` so the clock stays `Send + Sync` and can be moved
/// into a spawned test thread or a task along with its counter.
///
/// ## Example
/// ```rust
/// use rate_counter::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// let handle = clock.clone();
/// handle.advance_secs(5);
/// assert_eq!(clock.now_secs(), 1_005);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_secs: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_secs)),
        }
    }

    #[inline]
    pub fn set(&self, secs: i64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    #[inline]
    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    #[inline]
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    #[inline]
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new(42);
        assert_eq!(clock.now_secs(), 42);
        assert_eq!(clock.now_secs(), 42);

        clock.advance_secs(3);
        assert_eq!(clock.now_secs(), 45);

        clock.set(7);
        assert_eq!(clock.now_secs(), 7);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();

        handle.advance_secs(10);
        assert_eq!(clock.now_secs(), 110);
    }

    #[test]
    fn manual_clock_crosses_threads() {
        let clock = ManualClock::new(1);
        let handle = clock.clone();
        std::thread::spawn(move || handle.advance_secs(4))
            .join()
            .unwrap();
        assert_eq!(clock.now_secs(), 5);
    }

    #[test]
    fn system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_secs() > 1_577_836_800);
    }

    fn read<C: Clock>(clock: C) -> i64 {
        clock.now_secs()
    }

    #[test]
    fn clock_through_pointers() {
        let clock = ManualClock::new(9);
        let boxed: Box<dyn Clock> = Box::new(clock.clone());
        let shared = Rc::new(clock.clone());

        clock.advance_secs(1);
        assert_eq!(read(&clock), 10);
        assert_eq!(boxed.now_secs(), 10);
        assert_eq!(shared.now_secs(), 10);
    }
}
