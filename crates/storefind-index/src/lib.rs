//! Geo-indexed store search.
//!
//! [`GeoIndex`] is the seam between the locator and whichever backend holds
//! the store documents: [`ElasticsearchIndex`] talks to a search engine over
//! HTTP, [`MemoryIndex`] answers the same query in-process.

pub mod client;
pub mod distance;
pub mod error;
pub mod ingest;
pub mod memory;
pub mod query;
pub mod schema;

pub use client::ElasticsearchIndex;
pub use error::IndexError;
pub use ingest::{read_store_csv, IngestError, IngestReport};
pub use memory::MemoryIndex;
pub use query::{NearestHit, NearestStoreQuery, QueryResult, DEFAULT_COUNT};

use async_trait::async_trait;

/// A store collection that can answer scored nearest-neighbour queries.
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Runs `query`, returning at most `query.count()` hits nearest first.
    ///
    /// An index with no documents yields an empty result, not an error.
    async fn nearest(&self, query: &NearestStoreQuery) -> Result<QueryResult, IndexError>;

    /// Cheap reachability probe used by health checks.
    async fn ping(&self) -> Result<(), IndexError>;
}
