//! Time-bounded record of recently delivered event ids.
//!
//! The platform redelivers events it considers unacknowledged, possibly on
//! a different connection of the pool. An id stays in the window until its
//! `event_time` falls more than [`DEDUP_WINDOW_SECS`] behind the current
//! time; pruning is amortized over inbound event frames.

use rustc_hash::FxHashMap;

/// Window length in seconds of `event_time`.
pub const DEDUP_WINDOW_SECS: i64 = 600;

/// Map from event id to the event's `event_time`.
#[derive(Debug, Clone)]
pub struct EventDeduplicator {
    window_secs: i64,
    events: FxHashMap<String, i64>,
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDeduplicator {
    /// Creates an empty window of [`DEDUP_WINDOW_SECS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEDUP_WINDOW_SECS)
    }

    /// Creates an empty window of custom length.
    #[must_use]
    pub fn with_window(window_secs: i64) -> Self {
        Self {
            window_secs,
            events: FxHashMap::default(),
        }
    }

    /// Returns `true` if `event_id` is recorded.
    #[inline]
    #[must_use]
    pub fn seen(&self, event_id: &str) -> bool {
        self.events.contains_key(event_id)
    }

    /// Records `event_id` with its `event_time`.
    #[inline]
    pub fn record(&mut self, event_id: impl Into<String>, event_time: i64) {
        self.events.insert(event_id.into(), event_time);
    }

    /// Drops every entry whose `event_time` is older than `now - window`.
    pub fn prune(&mut self, now: i64) {
        let expired = now.saturating_sub(self.window_secs);
        self.events.retain(|_, event_time| *event_time >= expired);
    }

    /// Prunes, then records `event_id` unless it is still in the window.
    ///
    /// Returns `true` if the event is new and should be delivered.
    pub fn observe(&mut self, event_id: &str, event_time: i64, now: i64) -> bool {
        self.prune(now);
        if self.seen(event_id) {
            return false;
        }
        self.record(event_id, event_time);
        true
    }

    /// Number of recorded ids.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
