//! Time-bounded geometry cache
//!
//! Layout reads are the expensive part of scroll tracking. Readings are kept
//! per item index for a short freshness window and evicted lazily the next
//! time they are looked up after expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::dom::Rect;

/// How long a geometry reading is trusted by default.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_millis(500);

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One layout reading, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedGeometry {
    pub top: f64,
    pub bottom: f64,
    pub captured_at: Instant,
}

/// Item index to geometry reading, valid for `freshness` after capture.
#[derive(Debug, Clone)]
pub struct GeometryCache {
    entries: HashMap<usize, CachedGeometry>,
    freshness: Duration,
}

impl GeometryCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            freshness,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh reading for `index`; an expired entry is dropped and `None` returned.
    pub fn get(&mut self, index: usize, now: Instant) -> Option<CachedGeometry> {
        let entry = *self.entries.get(&index)?;
        if now.saturating_duration_since(entry.captured_at) > self.freshness {
            self.entries.remove(&index);
            return None;
        }
        Some(entry)
    }

    /// Store a document-space rect for `index`.
    pub fn insert(&mut self, index: usize, rect: Rect, now: Instant) {
        self.entries.insert(
            index,
            CachedGeometry {
                top: rect.top,
                bottom: rect.bottom(),
                captured_at: now,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}
