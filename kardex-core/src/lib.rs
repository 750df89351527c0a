//! Core engine for the kardex template catalog
//!
//! Brings together the pure pieces (phonetic matching, facet counting, the
//! filter pipeline) with the async ones (the gateway boundary, the cache,
//! the state controller). The [`controller::Controller`] is the intended
//! entry point; everything else is usable on its own.

pub mod controller;
pub mod facets;
pub mod filter;
pub mod gateway;
pub mod memory;
pub mod pinyin;
pub mod sample;

pub use controller::Controller;
pub use filter::SearchState;
pub use gateway::{Gateway, GatewayResult, RetryPolicy};
pub use kardex_cache::GatewayError;
pub use memory::MemoryGateway;
