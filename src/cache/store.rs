//! Option Cache Module
//!
//! Store-scoped cache of attribute options. The first access for a store
//! fetches every option of that store in one pass and indexes it two ways:
//! option lists per attribute, and labels per option id.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::cache::stats::CacheCounters;
use crate::cache::{CacheKey, CacheStats, LabelKind};
use crate::error::{OptionError, Result};
use crate::models::{AttributeId, OptionId, OptionItem, OptionRow, StoreId};
use crate::repository::{OptionCriteria, OptionRepository, PreloadFilter};

/// Indexed contents of the cache. A store is either fully present or
/// absent: loads are indexed off-lock and published in one write.
#[derive(Debug, Default)]
struct CacheState {
    loaded: HashSet<StoreId>,
    options: HashMap<CacheKey, Arc<[OptionItem]>>,
    labels: HashMap<CacheKey, String>,
    last_loaded_at: Option<DateTime<Utc>>,
}

impl CacheState {
    fn publish(&mut self, store_id: StoreId, index: StoreIndex) {
        self.options.extend(
            index
                .options
                .into_iter()
                .map(|(key, items)| (key, Arc::<[OptionItem]>::from(items))),
        );
        self.labels.extend(index.labels);
        self.loaded.insert(store_id);
        self.last_loaded_at = Some(Utc::now());
    }
}

/// One store's rows, indexed but not yet visible to readers.
#[derive(Debug, Default)]
struct StoreIndex {
    options: HashMap<CacheKey, Vec<OptionItem>>,
    labels: HashMap<CacheKey, String>,
}

impl StoreIndex {
    fn build(store_id: StoreId, rows: Vec<OptionRow>) -> Self {
        let mut index = Self::default();
        for row in rows {
            index
                .options
                .entry(CacheKey::attribute(store_id, row.attribute_id, LabelKind::Store))
                .or_default()
                .push(OptionItem::new(row.option_id, row.store_label.clone()));
            index
                .options
                .entry(CacheKey::attribute(store_id, row.attribute_id, LabelKind::Default))
                .or_default()
                .push(OptionItem::new(row.option_id, row.default_label));
            index
                .labels
                .insert(CacheKey::option(store_id, row.option_id), row.store_label);
        }
        index
    }
}

/// Per-store load coordination. The mutex serializes fetches of one store
/// and holds the message of the last failed fetch; `attempts` counts
/// finished fetches so callers queued behind a failure share its outcome.
#[derive(Debug, Default)]
struct LoadSlot {
    attempts: AtomicU64,
    last_failure: Mutex<Option<String>>,
}

// == Option Cache ==
/// Shared, store-scoped option cache.
///
/// Each store is fetched at most once until [`OptionCache::reset`]. Loads of
/// the same store are serialized behind a per-store guard; loads of
/// different stores run independently. Share it as `Arc<OptionCache>`.
pub struct OptionCache {
    repository: Arc<dyn OptionRepository>,
    preload_filter: Option<Arc<dyn PreloadFilter>>,
    state: RwLock<CacheState>,
    load_slots: Mutex<HashMap<StoreId, Arc<LoadSlot>>>,
    /// Held shared by loads and reads, exclusively by `reset`
    lifecycle: RwLock<()>,
    counters: CacheCounters,
}

impl OptionCache {
    // == Constructor ==
    /// Creates an empty cache over the given option repository.
    pub fn new(repository: Arc<dyn OptionRepository>) -> Self {
        Self {
            repository,
            preload_filter: None,
            state: RwLock::new(CacheState::default()),
            load_slots: Mutex::new(HashMap::new()),
            lifecycle: RwLock::new(()),
            counters: CacheCounters::default(),
        }
    }

    /// Installs a hook that may narrow the criteria of every store load.
    pub fn with_preload_filter(mut self, filter: impl PreloadFilter + 'static) -> Self {
        self.preload_filter = Some(Arc::new(filter));
        self
    }

    pub fn repository(&self) -> &Arc<dyn OptionRepository> {
        &self.repository
    }

    // == Ensure Loaded ==
    /// Loads every option of `store_id` unless the store is already loaded.
    ///
    /// A store that returned no rows still counts as loaded. A failed fetch
    /// leaves the store unloaded and returns [`OptionError::Repository`] to
    /// every caller that was waiting on it; a later call fetches again.
    pub async fn ensure_loaded(&self, store_id: StoreId) -> Result<()> {
        let _lifecycle = self.lifecycle.read().await;
        self.load_store(store_id).await
    }

    async fn load_store(&self, store_id: StoreId) -> Result<()> {
        if self.state.read().await.loaded.contains(&store_id) {
            return Ok(());
        }

        let slot = {
            let mut slots = self.load_slots.lock().await;
            slots.entry(store_id).or_default().clone()
        };
        let seen_attempts = slot.attempts.load(Ordering::Acquire);
        let mut last_failure = slot.last_failure.lock().await;

        // Another caller may have finished the load while we waited.
        if self.state.read().await.loaded.contains(&store_id) {
            return Ok(());
        }
        if slot.attempts.load(Ordering::Acquire) != seen_attempts {
            let message = last_failure.clone().unwrap_or_default();
            debug!(store = %store_id, "sharing failed option fetch");
            return Err(OptionError::Repository(anyhow!(message)));
        }

        let mut criteria = OptionCriteria::for_store(store_id);
        if let Some(filter) = &self.preload_filter {
            filter.adjust(&mut criteria);
            criteria.store_id = store_id;
        }

        debug!(store = %store_id, "loading options");
        let rows = match self.repository.fetch_options(&criteria).await {
            Ok(rows) => rows,
            Err(err) => {
                self.counters.record_load_failure();
                warn!(store = %store_id, error = %err, "option fetch failed");
                *last_failure = Some(format!("{err:#}"));
                slot.attempts.fetch_add(1, Ordering::Release);
                return Err(OptionError::Repository(err));
            }
        };

        let row_count = rows.len();
        let index = StoreIndex::build(store_id, rows);
        self.state.write().await.publish(store_id, index);
        *last_failure = None;
        slot.attempts.fetch_add(1, Ordering::Release);
        self.counters.record_load();
        debug!(store = %store_id, rows = row_count, "options loaded");
        Ok(())
    }

    // == Options For ==
    /// Returns the option list of an attribute in a store.
    ///
    /// An attribute without options yields an empty list. The returned
    /// slice is shared with the cache and cannot be modified.
    pub async fn options_for(
        &self,
        store_id: StoreId,
        attribute_id: AttributeId,
        kind: LabelKind,
    ) -> Result<Arc<[OptionItem]>> {
        let _lifecycle = self.lifecycle.read().await;
        self.load_store(store_id).await?;

        let key = CacheKey::attribute(store_id, attribute_id, kind);
        let state = self.state.read().await;
        Ok(state
            .options
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new())))
    }

    // == Label ==
    /// Returns the store label of an option, or `None` if the option was
    /// not loaded for that store.
    pub async fn label(&self, store_id: StoreId, option_id: OptionId) -> Result<Option<String>> {
        let mut labels = self.labels(store_id, &[option_id]).await?;
        Ok(labels.pop().flatten())
    }

    /// Resolves several option ids at once; the result is aligned with
    /// `option_ids`.
    pub async fn labels(
        &self,
        store_id: StoreId,
        option_ids: &[OptionId],
    ) -> Result<Vec<Option<String>>> {
        let _lifecycle = self.lifecycle.read().await;
        self.load_store(store_id).await?;

        let state = self.state.read().await;
        let labels = option_ids
            .iter()
            .map(|&option_id| {
                let label = state
                    .labels
                    .get(&CacheKey::option(store_id, option_id))
                    .cloned();
                match label {
                    Some(_) => self.counters.record_hit(),
                    None => {
                        self.counters.record_miss();
                        trace!(store = %store_id, option = %option_id, "option label not found");
                    }
                }
                label
            })
            .collect();
        Ok(labels)
    }

    // == Reset ==
    /// Forgets every loaded store. Waits for in-flight loads and reads to
    /// finish; the next access to any store fetches it again.
    pub async fn reset(&self) {
        let _lifecycle = self.lifecycle.write().await;
        let dropped = {
            let mut state = self.state.write().await;
            let dropped = state.loaded.len();
            *state = CacheState::default();
            dropped
        };
        self.load_slots.lock().await.clear();
        self.counters.record_reset();
        info!(stores = dropped, "option cache reset");
    }

    // == Introspection ==
    pub async fn is_loaded(&self, store_id: StoreId) -> bool {
        self.state.read().await.loaded.contains(&store_id)
    }

    /// Loaded stores in ascending order.
    pub async fn loaded_stores(&self) -> Vec<StoreId> {
        let state = self.state.read().await;
        let mut stores: Vec<StoreId> = state.loaded.iter().copied().collect();
        stores.sort();
        stores
    }

    pub async fn stats(&self) -> CacheStats {
        let last_loaded_at = self.state.read().await.last_loaded_at;
        self.counters
            .snapshot(self.loaded_stores().await, last_loaded_at)
    }
}

impl fmt::Debug for OptionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionCache")
            .field("has_preload_filter", &self.preload_filter.is_some())
            .finish_non_exhaustive()
    }
}
