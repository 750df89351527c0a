//! The cache store
//!
//! Holds, per query identity, the last-fetched value, its fetch timestamp,
//! and any in-flight fetch. Reads never block on staleness: a stale value
//! stays servable while its refetch is pending. Concurrent readers of one
//! identity share a single outstanding fetch.

use crate::error::GatewayError;
use crate::key::{QueryKind, QuerySpec};
use crate::policy::CachePolicy;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use kardex_types::{DiseaseInfo, Tag, Template, TemplateTypeInfo};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A shared in-flight fetch; late callers attach instead of re-fetching
pub type FetchFuture = Shared<BoxFuture<'static, Result<CachedValue, GatewayError>>>;

/// Value stored under a query identity
#[derive(Debug, Clone)]
pub enum CachedValue {
    Templates(Arc<Vec<Template>>),
    Template(Option<Arc<Template>>),
    Diseases(Arc<Vec<DiseaseInfo>>),
    TemplateTypes(Arc<Vec<TemplateTypeInfo>>),
    Tags(Arc<Vec<Tag>>),
    SearchResults(Arc<Vec<Template>>),
}

impl CachedValue {
    pub fn as_templates(&self) -> Option<Arc<Vec<Template>>> {
        match self {
            CachedValue::Templates(t) | CachedValue::SearchResults(t) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<Arc<Template>> {
        match self {
            CachedValue::Template(t) => t.clone(),
            _ => None,
        }
    }

    pub fn as_diseases(&self) -> Option<Arc<Vec<DiseaseInfo>>> {
        match self {
            CachedValue::Diseases(d) => Some(d.clone()),
            _ => None,
        }
    }

    pub fn as_template_types(&self) -> Option<Arc<Vec<TemplateTypeInfo>>> {
        match self {
            CachedValue::TemplateTypes(t) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<Arc<Vec<Tag>>> {
        match self {
            CachedValue::Tags(t) => Some(t.clone()),
            _ => None,
        }
    }
}

/// How current an entry's value is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Inside its fresh-for window
    Fresh,
    /// Servable, but a refetch is due
    Stale,
    /// No value cached
    Missing,
}

/// Immutable view of an entry handed to readers
///
/// A fetch error is surfaced alongside any stale-but-displayable value,
/// never instead of it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub value: Option<CachedValue>,
    pub error: Option<GatewayError>,
    pub freshness: Freshness,
    pub refreshing: bool,
}

impl Snapshot {
    fn missing() -> Self {
        Snapshot {
            value: None,
            error: None,
            freshness: Freshness::Missing,
            refreshing: false,
        }
    }
}

struct Entry {
    value: Option<CachedValue>,
    fetched_at: Option<Instant>,
    stale: bool,
    error: Option<GatewayError>,
    in_flight: Option<FetchFuture>,
    pins: u32,
    /// Bumped by write/invalidate/remove so an in-flight result that
    /// predates a mutation installs as stale rather than fresh
    generation: u64,
}

impl Entry {
    fn new(generation: u64) -> Self {
        Entry {
            value: None,
            fetched_at: None,
            stale: false,
            error: None,
            in_flight: None,
            pins: 0,
            generation,
        }
    }
}

/// Statistics about cache usage
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Get cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        writeln!(
            f,
            "  Hits: {} | Misses: {} | Hit Rate: {:.1}%",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )?;
        writeln!(f, "  Refreshes: {}", self.refreshes)?;
        writeln!(f, "  Entries: {}", self.entries)?;
        Ok(())
    }
}

/// In-memory staleness-aware cache keyed by query identity
pub struct CacheStore {
    entries: DashMap<QueryKind, Entry>,
    policy: CachePolicy,

    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    generations: AtomicU64,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::default())
    }

    pub fn with_policy(policy: CachePolicy) -> Self {
        CacheStore {
            entries: DashMap::new(),
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            generations: AtomicU64::new(0),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Current state of an entry without triggering any fetch
    pub fn snapshot(&self, kind: &QueryKind) -> Snapshot {
        let Some(entry) = self.entries.get(kind) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Snapshot::missing();
        };

        let freshness = match (&entry.value, entry.fetched_at) {
            (None, _) | (_, None) => Freshness::Missing,
            (Some(_), Some(at)) => {
                let fresh_for = self.policy.windows(kind).fresh_for;
                if entry.stale || at.elapsed() > fresh_for {
                    Freshness::Stale
                } else {
                    Freshness::Fresh
                }
            }
        };

        match freshness {
            Freshness::Missing => self.misses.fetch_add(1, Ordering::Relaxed),
            _ => self.hits.fetch_add(1, Ordering::Relaxed),
        };

        Snapshot {
            value: entry.value.clone(),
            error: entry.error.clone(),
            freshness,
            refreshing: entry.in_flight.is_some(),
        }
    }

    /// Non-blocking read: returns the current snapshot immediately and, for
    /// an active spec whose entry is missing or stale, spawns a background
    /// refetch. Staleness never blocks a read.
    pub fn read<F>(self: &Arc<Self>, spec: &QuerySpec, fetch: F) -> Snapshot
    where
        F: FnOnce() -> BoxFuture<'static, Result<CachedValue, GatewayError>>,
    {
        let snapshot = self.snapshot(spec.kind());
        if !spec.is_active() {
            return snapshot;
        }

        if snapshot.freshness != Freshness::Fresh && !snapshot.refreshing {
            let flight = self.join_or_start(spec.kind(), fetch());
            tokio::spawn(async move {
                let _ = flight.await;
            });
        }

        snapshot
    }

    /// Awaitable read: serves a fresh cached value directly, otherwise joins
    /// or starts the single in-flight fetch for this identity and awaits it
    pub async fn fetch<F>(
        self: &Arc<Self>,
        kind: &QueryKind,
        fetch: F,
    ) -> Result<CachedValue, GatewayError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<CachedValue, GatewayError>>,
    {
        let snapshot = self.snapshot(kind);
        if snapshot.freshness == Freshness::Fresh {
            if let Some(value) = snapshot.value {
                return Ok(value);
            }
        }

        self.join_or_start(kind, fetch()).await
    }

    fn join_or_start(
        self: &Arc<Self>,
        kind: &QueryKind,
        fetch: BoxFuture<'static, Result<CachedValue, GatewayError>>,
    ) -> FetchFuture {
        let mut entry = self
            .entries
            .entry(kind.clone())
            .or_insert_with(|| Entry::new(self.next_generation()));

        if let Some(flight) = &entry.in_flight {
            return flight.clone();
        }

        let store = Arc::downgrade(self);
        let key = kind.clone();
        let started_at = entry.generation;
        tracing::debug!(query = %key, "starting fetch");

        let flight: FetchFuture = async move {
            let result = fetch.await;
            if let Some(store) = store.upgrade() {
                store.install(&key, &result, started_at);
            }
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(flight.clone());
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        flight
    }

    /// Install a completed fetch. Last-fetch-wins per identity; a result
    /// that predates a mutation (generation mismatch) lands already stale,
    /// and a result for a removed entry is dropped.
    fn install(&self, kind: &QueryKind, result: &Result<CachedValue, GatewayError>, started_at: u64) {
        let Some(mut entry) = self.entries.get_mut(kind) else {
            tracing::debug!(query = %kind, "entry removed mid-flight, dropping result");
            return;
        };

        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.fetched_at = Some(Instant::now());
                entry.stale = entry.generation != started_at;
                entry.error = None;
            }
            Err(err) => {
                // Keep the previous value; surface the failure alongside it
                tracing::warn!(query = %kind, error = %err, "fetch failed");
                entry.error = Some(err.clone());
            }
        }
    }

    /// Install a fresh value directly
    pub fn write(&self, kind: &QueryKind, value: CachedValue) {
        let generation = self.next_generation();
        let mut entry = self
            .entries
            .entry(kind.clone())
            .or_insert_with(|| Entry::new(generation));
        entry.value = Some(value);
        entry.fetched_at = Some(Instant::now());
        entry.stale = false;
        entry.error = None;
        entry.generation = generation;
    }

    /// Mark an entry stale without deleting its value
    pub fn invalidate(&self, kind: &QueryKind) {
        if let Some(mut entry) = self.entries.get_mut(kind) {
            entry.stale = true;
            entry.generation = self.next_generation();
            tracing::debug!(query = %kind, "invalidated");
        }
    }

    /// Delete an entry outright (entity known deleted; serving the stale
    /// value would be actively wrong)
    pub fn remove(&self, kind: &QueryKind) {
        if self.entries.remove(kind).is_some() {
            tracing::debug!(query = %kind, "removed");
        }
    }

    /// Mark an active subscriber; pinned entries survive eviction
    pub fn pin(&self, kind: &QueryKind) {
        let mut entry = self
            .entries
            .entry(kind.clone())
            .or_insert_with(|| Entry::new(self.next_generation()));
        entry.pins += 1;
    }

    pub fn unpin(&self, kind: &QueryKind) {
        if let Some(mut entry) = self.entries.get_mut(kind) {
            entry.pins = entry.pins.saturating_sub(1);
        }
    }

    /// Background sweep: drop entries with no pin, no in-flight fetch, and
    /// an age past their keep-for window. Returns the number dropped.
    pub fn evict(&self) -> usize {
        let doomed: Vec<QueryKind> = self
            .entries
            .iter()
            .filter(|entry| {
                if entry.pins > 0 || entry.in_flight.is_some() {
                    return false;
                }
                match entry.fetched_at {
                    Some(at) => at.elapsed() > self.policy.windows(entry.key()).keep_for,
                    // A husk with nothing fetched and nothing pending
                    None => true,
                }
            })
            .map(|entry| entry.key().clone())
            .collect();

        for kind in &doomed {
            self.entries.remove(kind);
        }
        if !doomed.is_empty() {
            tracing::debug!(evicted = doomed.len(), "cache sweep");
        }
        doomed.len()
    }

    /// Drop every entry and reset statistics (full store reset)
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.refreshes.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::CacheWindows;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn templates_value() -> CachedValue {
        CachedValue::Templates(Arc::new(Vec::new()))
    }

    fn counting_fetch(
        calls: Arc<AtomicU32>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<CachedValue, GatewayError>> {
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(templates_value())
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_fetch_populates_and_reuses() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicU32::new(0));

        store
            .fetch(&QueryKind::AllTemplates, counting_fetch(calls.clone()))
            .await
            .unwrap();
        store
            .fetch(&QueryKind::AllTemplates, counting_fetch(calls.clone()))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.snapshot(&QueryKind::AllTemplates).freshness,
            Freshness::Fresh
        );
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_flight() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicU32::new(0));
        let kind = QueryKind::AllTemplates;

        let (a, b, c) = tokio::join!(
            store.fetch(&kind, counting_fetch(calls.clone())),
            store.fetch(&kind, counting_fetch(calls.clone())),
            store.fetch(&kind, counting_fetch(calls.clone())),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_value_stays_servable() {
        let store = Arc::new(CacheStore::new());
        let kind = QueryKind::AllTemplates;

        store.write(&kind, templates_value());
        store.invalidate(&kind);

        let snapshot = store.snapshot(&kind);
        assert_eq!(snapshot.freshness, Freshness::Stale);
        assert!(snapshot.value.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let policy = CachePolicy::uniform(CacheWindows::new(
            Duration::ZERO,
            Duration::from_secs(600),
        ));
        let store = Arc::new(CacheStore::with_policy(policy));
        let kind = QueryKind::AllTemplates;

        store.write(&kind, templates_value());

        // fresh_for is zero, so this forces a refetch that fails
        let result = store
            .fetch(&kind, || {
                async { Err(GatewayError::Transport("unreachable".into())) }.boxed()
            })
            .await;
        assert!(result.is_err());

        let snapshot = store.snapshot(&kind);
        assert!(snapshot.value.is_some(), "good data survived the failure");
        assert_eq!(
            snapshot.error,
            Some(GatewayError::Transport("unreachable".into()))
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_invalidation_during_flight_lands_stale() {
        let store = Arc::new(CacheStore::new());
        let kind = QueryKind::AllTemplates;
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let fetcher = store.clone();
        let fetch_kind = kind.clone();
        let handle = tokio::spawn(async move {
            fetcher
                .fetch(&fetch_kind, move || {
                    async move {
                        let _ = rx.await;
                        Ok(templates_value())
                    }
                    .boxed()
                })
                .await
        });

        // Let the flight register, then invalidate behind its back
        tokio::task::yield_now().await;
        store.invalidate(&kind);
        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        let snapshot = store.snapshot(&kind);
        assert!(snapshot.value.is_some());
        assert_eq!(snapshot.freshness, Freshness::Stale);
    }

    #[tokio::test]
    async fn test_remove_deletes_value() {
        let store = Arc::new(CacheStore::new());
        let kind = QueryKind::TemplateById(kardex_types::TemplateId::new("1"));

        store.write(&kind, CachedValue::Template(None));
        store.remove(&kind);

        assert_eq!(store.snapshot(&kind).freshness, Freshness::Missing);
    }

    #[tokio::test]
    async fn test_eviction_respects_pins() {
        let policy = CachePolicy::uniform(CacheWindows::new(
            Duration::from_secs(600),
            Duration::ZERO,
        ));
        let store = Arc::new(CacheStore::with_policy(policy));
        let pinned = QueryKind::AllTemplates;
        let loose = QueryKind::AllTags;

        store.write(&pinned, templates_value());
        store.write(&loose, CachedValue::Tags(Arc::new(Vec::new())));
        store.pin(&pinned);

        assert_eq!(store.evict(), 1);
        assert!(store.snapshot(&pinned).value.is_some());
        assert_eq!(store.snapshot(&loose).freshness, Freshness::Missing);

        store.unpin(&pinned);
        assert_eq!(store.evict(), 1);
    }

    #[tokio::test]
    async fn test_inactive_spec_never_fetches() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicU32::new(0));
        let spec = QuerySpec::disabled(QueryKind::Search(String::new()));

        let snapshot = store.read(&spec, counting_fetch(calls.clone()));
        tokio::task::yield_now().await;

        assert_eq!(snapshot.freshness, Freshness::Missing);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let store = Arc::new(CacheStore::new());
        let kind = QueryKind::AllTemplates;

        store.snapshot(&kind); // miss
        store.write(&kind, templates_value());
        store.snapshot(&kind); // hit

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!(stats.hit_rate() > 0.49 && stats.hit_rate() < 0.51);
    }
}
