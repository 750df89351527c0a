//! Kardex reactive cache
//!
//! A staleness-aware mirror of backend entities, keyed by query identity.
//! The store guarantees that a committed write is reflected consistently
//! across every cached view that depends on the written entity, while reads
//! keep serving stale-but-displayable data until the refetch lands.
//!
//! # Architecture
//!
//! - [`QueryKind`] names what is cached: an entity collection, an entity by
//!   id, or a search. [`QuerySpec`] pairs an identity with an explicit
//!   tri-state status instead of a boolean "enabled" flag.
//! - [`CacheStore`] owns the entry table. Reads are non-blocking and
//!   stale-while-revalidate; concurrent readers of one identity share a
//!   single in-flight fetch.
//! - [`invalidation_plan`] is the static table from mutation kind to the
//!   identities that must go stale once that mutation commits.
//! - [`CachePolicy`] tiers entries by churn rate: collections and
//!   vocabularies stay warm for minutes, search results age out fast.
//!
//! ## Ordering guarantees
//!
//! For one identity, a write or invalidate causally after a fetch start is
//! observed by the next read, never retroactively: a fetch result that
//! predates a mutation installs already-stale. Last-fetch-wins; there is no
//! cancellation.

pub mod error;
pub mod invalidation;
pub mod key;
pub mod policy;
pub mod store;

pub use error::GatewayError;
pub use invalidation::{invalidation_plan, InvalidationPlan, Mutation};
pub use key::{QueryKind, QuerySpec, QueryStatus};
pub use policy::{CachePolicy, CacheWindows};
pub use store::{CacheStats, CacheStore, CachedValue, FetchFuture, Freshness, Snapshot};
