//! The nearest-store query and the hits it produces.

use serde::Serialize;
use serde_json::{json, Value};
use storefind_core::{Coordinate, CoreError, StoreRecord, Unit};

use crate::distance::METERS_PER_MILE;

/// Number of stores returned when the caller does not ask for more.
pub const DEFAULT_COUNT: usize = 1;

/// Bandwidth of the distance-decay score. Fixed at one mile for every output
/// unit: it shapes ranking only, never the reported distance.
pub const DECAY_SCALE: &str = "1mi";

/// [`DECAY_SCALE`] in meters, for backends that score in-process.
pub const DECAY_SCALE_METERS: f64 = METERS_PER_MILE;

/// Name of the computed per-hit field carrying the distance in the requested unit.
pub const DISTANCE_FIELD: &str = "distance";

const DISTANCE_SCRIPT: &str = "doc[params.field].arcDistance(params.lat, params.lon) * params.factor";

/// A scored nearest-neighbour query around `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStoreQuery {
    origin: Coordinate,
    unit: Unit,
    count: usize,
}

impl NearestStoreQuery {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCount`] when `count` is zero.
    pub fn new(origin: Coordinate, unit: Unit, count: usize) -> Result<Self, CoreError> {
        if count == 0 {
            return Err(CoreError::InvalidCount(count));
        }
        Ok(Self {
            origin,
            unit,
            count,
        })
    }

    #[must_use]
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Builds the search request body for a geo-point field named `field`.
    ///
    /// Origin and conversion factor are passed as script parameters rather
    /// than spliced into the script source.
    #[must_use]
    pub fn to_search_body(&self, field: &str) -> Value {
        let origin = json!({
            "lat": self.origin.latitude(),
            "lon": self.origin.longitude(),
        });

        json!({
            "query": {
                "function_score": {
                    "functions": [{
                        "gauss": {
                            field: {
                                "origin": origin,
                                "scale": DECAY_SCALE,
                            }
                        }
                    }]
                }
            },
            "script_fields": {
                DISTANCE_FIELD: {
                    "script": {
                        "lang": "painless",
                        "source": DISTANCE_SCRIPT,
                        "params": {
                            "field": field,
                            "lat": self.origin.latitude(),
                            "lon": self.origin.longitude(),
                            "factor": self.unit.meters_factor(),
                        }
                    }
                }
            },
            "_source": true,
            "size": self.count,
        })
    }
}

/// One store returned by a nearest-store query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestHit {
    pub store: StoreRecord,
    /// Relevance score assigned by the decay function.
    pub score: f64,
    /// Exact arc distance from the origin, in the query's unit.
    pub distance: f64,
}

/// Hits ordered nearest first. Never longer than the requested count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub unit: Unit,
    pub hits: Vec<NearestHit>,
}

impl QueryResult {
    #[must_use]
    pub fn empty(unit: Unit) -> Self {
        Self {
            unit,
            hits: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(34.0, -81.0).unwrap()
    }

    #[test]
    fn rejects_zero_count() {
        assert_eq!(
            NearestStoreQuery::new(origin(), Unit::Miles, 0),
            Err(CoreError::InvalidCount(0))
        );
    }

    #[test]
    fn body_uses_one_mile_decay_scale_for_both_units() {
        for unit in [Unit::Miles, Unit::Kilometers] {
            let body = NearestStoreQuery::new(origin(), unit, 1)
                .unwrap()
                .to_search_body("latlong");
            let gauss = &body["query"]["function_score"]["functions"][0]["gauss"]["latlong"];
            assert_eq!(gauss["scale"], "1mi");
            assert_eq!(gauss["origin"], json!({ "lat": 34.0, "lon": -81.0 }));
        }
    }

    #[test]
    fn body_binds_origin_and_factor_as_script_params() {
        let body = NearestStoreQuery::new(origin(), Unit::Kilometers, 4)
            .unwrap()
            .to_search_body("latlong");
        let script = &body["script_fields"]["distance"]["script"];
        assert_eq!(script["params"]["lat"], 34.0);
        assert_eq!(script["params"]["lon"], -81.0);
        assert_eq!(script["params"]["factor"], 0.001);
        assert_eq!(script["params"]["field"], "latlong");

        let source = script["source"].as_str().unwrap();
        assert!(!source.contains("34"), "origin must not be interpolated: {source}");
        assert!(!source.contains("0.001"), "factor must not be interpolated: {source}");
    }

    #[test]
    fn body_requests_source_and_bounded_size() {
        let body = NearestStoreQuery::new(origin(), Unit::Miles, 7)
            .unwrap()
            .to_search_body("latlong");
        assert_eq!(body["_source"], true);
        assert_eq!(body["size"], 7);
    }
}
