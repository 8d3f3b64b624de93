//! In-process [`GeoIndex`] with the search engine's scoring arithmetic.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use storefind_core::{CoreError, StoreRecord};

use crate::distance::{arc_distance_meters, gauss_decay, quantize_latitude, quantize_longitude};
use crate::query::DECAY_SCALE_METERS;
use crate::{GeoIndex, IndexError, NearestHit, NearestStoreQuery, QueryResult};

#[derive(Debug, Clone)]
struct IndexedStore {
    record: StoreRecord,
    lat: f64,
    lon: f64,
}

/// Stores kept in insertion order, with coordinates quantized on insert.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    docs: RwLock<Vec<IndexedStore>>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from `records`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] for the first record whose
    /// coordinate is out of range.
    pub fn from_records(records: impl IntoIterator<Item = StoreRecord>) -> Result<Self, CoreError> {
        let index = Self::new();
        for record in records {
            index.insert(record)?;
        }
        Ok(index)
    }

    /// Adds one store.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when the record is not geo-searchable.
    pub fn insert(&self, record: StoreRecord) -> Result<(), CoreError> {
        record.validate()?;
        let lat = quantize_latitude(record.coordinate.latitude());
        let lon = quantize_longitude(record.coordinate.longitude());
        self.docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(IndexedStore { record, lat, lon });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn search(&self, query: &NearestStoreQuery) -> QueryResult {
        let origin = query.origin();
        let unit = query.unit();
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);

        let mut scored: Vec<(usize, f64, f64)> = docs
            .iter()
            .enumerate()
            .map(|(position, doc)| {
                let meters =
                    arc_distance_meters(doc.lat, doc.lon, origin.latitude(), origin.longitude());
                (position, gauss_decay(meters, DECAY_SCALE_METERS), meters)
            })
            .collect();

        // Highest score first; equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(query.count());

        let hits = scored
            .into_iter()
            .map(|(position, score, meters)| NearestHit {
                store: docs[position].record.clone(),
                score,
                distance: meters * unit.meters_factor(),
            })
            .collect();

        QueryResult { unit, hits }
    }
}

#[async_trait]
impl GeoIndex for MemoryIndex {
    async fn nearest(&self, query: &NearestStoreQuery) -> Result<QueryResult, IndexError> {
        let result = self.search(query);
        tracing::debug!(
            hits = result.len(),
            indexed = self.len(),
            "in-memory nearest-store query"
        );
        Ok(result)
    }

    async fn ping(&self) -> Result<(), IndexError> {
        Ok(())
    }
}
