//! Freshness and retention windows
//!
//! Queries are tiered by how fast their data churns. Collections and facet
//! vocabularies stay warm for minutes; ad-hoc search results churn faster
//! and are cheaper to recompute than to keep around.

use crate::key::QueryKind;
use std::time::Duration;

/// Staleness and garbage-collection horizons for one query tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheWindows {
    /// Age after which a read still serves the value but triggers a refetch
    pub fresh_for: Duration,

    /// Age after which an unpinned entry is dropped by the sweep
    pub keep_for: Duration,
}

impl CacheWindows {
    pub const fn new(fresh_for: Duration, keep_for: Duration) -> Self {
        Self { fresh_for, keep_for }
    }
}

/// Per-tier window configuration
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// The template collection
    pub collection: CacheWindows,

    /// Facet vocabularies (diseases, types, tags)
    pub vocabulary: CacheWindows,

    /// Single templates by id
    pub by_id: CacheWindows,

    /// Ad-hoc search results
    pub search: CacheWindows,
}

impl CachePolicy {
    /// Windows for a given query identity
    pub fn windows(&self, kind: &QueryKind) -> CacheWindows {
        match kind {
            QueryKind::AllTemplates => self.collection,
            QueryKind::AllDiseases | QueryKind::AllTemplateTypes | QueryKind::AllTags => {
                self.vocabulary
            }
            QueryKind::TemplateById(_) => self.by_id,
            QueryKind::Search(_) => self.search,
        }
    }

    /// Uniform windows for every tier, handy in tests
    pub fn uniform(windows: CacheWindows) -> Self {
        Self {
            collection: windows,
            vocabulary: windows,
            by_id: windows,
            search: windows,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            collection: CacheWindows::new(Duration::from_secs(5 * 60), Duration::from_secs(30 * 60)),
            vocabulary: CacheWindows::new(Duration::from_secs(10 * 60), Duration::from_secs(30 * 60)),
            by_id: CacheWindows::new(Duration::from_secs(5 * 60), Duration::from_secs(10 * 60)),
            search: CacheWindows::new(Duration::from_secs(2 * 60), Duration::from_secs(5 * 60)),
        }
    }
}
