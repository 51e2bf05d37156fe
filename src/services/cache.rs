//! Process-local page cache keyed by the normalized list query.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::domain::filter::{ClaimStatus, DateRange, FilterState, PointsRange};
use crate::domain::page::PageResult;

/// Deterministic key for one page under one filter state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

#[derive(Debug, Serialize)]
struct KeyParts<'a> {
    search: &'a str,
    date_range: &'a DateRange,
    points_range: &'a PointsRange,
    claim_status: &'a ClaimStatus,
    page: usize,
    page_size: usize,
}

impl CacheKey {
    /// Serializes the query with a fixed field order, so structurally equal
    /// inputs always produce byte-identical keys.
    pub fn build(filters: &FilterState, page: usize, page_size: usize) -> Self {
        let parts = KeyParts {
            search: filters.search.trim(),
            date_range: &filters.date_range,
            points_range: &filters.points_range,
            claim_status: &filters.claim_status,
            page: page.max(1),
            page_size,
        };
        let key = serde_json::to_string(&parts).unwrap_or_else(|_| format!("{parts:?}"));
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cache generation observed before a remote call was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Generation(u64);

/// Page results by [`CacheKey`]. Never expires; emptied by [`ListCache::invalidate_all`].
#[derive(Debug, Default)]
pub struct ListCache {
    pages: DashMap<CacheKey, Arc<PageResult>>,
    generation: AtomicU64,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<PageResult>> {
        self.pages.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.pages.contains_key(key)
    }

    /// Unconditional insert. Overwriting an existing key is harmless.
    pub fn put(&self, key: CacheKey, page: Arc<PageResult>) {
        self.pages.insert(key, page);
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::Acquire))
    }

    /// Inserts `page` only if no invalidation happened since `seen` was taken.
    ///
    /// Returns whether the entry was kept.
    pub fn put_if_current(&self, seen: Generation, key: CacheKey, page: Arc<PageResult>) -> bool {
        if self.generation() != seen {
            return false;
        }
        self.pages.insert(key.clone(), page);
        // An invalidation may have slipped in between the check and the insert.
        if self.generation() != seen {
            self.pages.remove(&key);
            return false;
        }
        true
    }

    /// Drops every cached page. Called after each confirmed mutation.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
