//! Cache Statistics Module
//!
//! Tracks store loads, label lookups and resets.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::StoreId;

// == Cache Stats ==
/// Point-in-time snapshot of option cache activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of completed store loads
    pub loads: u64,
    /// Number of store loads whose fetch failed
    pub load_failures: u64,
    /// Number of option label lookups that found a label
    pub label_hits: u64,
    /// Number of option label lookups for unknown ids
    pub label_misses: u64,
    /// Number of resets
    pub resets: u64,
    /// Stores currently loaded
    pub loaded_stores: Vec<StoreId>,
    /// When the most recent store load was published
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the label lookup hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.label_hits + self.label_misses;
        if total == 0 {
            0.0
        } else {
            self.label_hits as f64 / total as f64
        }
    }
}

/// Lock-free counters shared by concurrent readers and loaders.
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    loads: AtomicU64,
    load_failures: AtomicU64,
    label_hits: AtomicU64,
    label_misses: AtomicU64,
    resets: AtomicU64,
}

impl CacheCounters {
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.label_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.label_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(
        &self,
        loaded_stores: Vec<StoreId>,
        last_loaded_at: Option<DateTime<Utc>>,
    ) -> CacheStats {
        CacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            label_hits: self.label_hits.load(Ordering::Relaxed),
            label_misses: self.label_misses.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            loaded_stores,
            last_loaded_at,
        }
    }
}
