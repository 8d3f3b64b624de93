//! The locate pipeline: validate, resolve origin, query, render.

use std::sync::Arc;
use std::time::Duration;

use storefind_core::{AppConfig, Coordinate, CoreError, LocationQuery, Unit};
use storefind_geocode::{
    resolve_with_retry, Geocoder, GoogleGeocoder, RetryPolicy, Sleep, TokioSleep,
};
use storefind_index::{
    ElasticsearchIndex, GeoIndex, NearestStoreQuery, QueryResult, DEFAULT_COUNT,
};
use tracing::Instrument;

use crate::error::LocateError;
use crate::format::{FormattedStores, OutputMode};

/// A validated locate call: where to search from, in which unit, how many.
#[derive(Debug, Clone, PartialEq)]
pub struct LocateRequest {
    pub origin: LocationQuery,
    pub unit: Unit,
    pub count: usize,
}

impl LocateRequest {
    #[must_use]
    pub fn new(origin: LocationQuery, unit: Unit) -> Self {
        Self {
            origin,
            unit,
            count: DEFAULT_COUNT,
        }
    }

    /// Builds a request from loose caller input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the origin is ambiguous or out of range, or
    /// `unit` is neither `mi` nor `km`.
    pub fn from_parts(
        location: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        unit: &str,
    ) -> Result<Self, CoreError> {
        let origin = LocationQuery::from_parts(location, latitude, longitude)?;
        let unit = unit.parse::<Unit>()?;
        Ok(Self::new(origin, unit))
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Answers locate requests against one index and one geocoder.
///
/// Cheap to clone; clones share the index, geocoder and sleeper.
#[derive(Clone)]
pub struct StoreLocator {
    index: Arc<dyn GeoIndex>,
    geocoder: Arc<dyn Geocoder>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleep>,
}

impl StoreLocator {
    #[must_use]
    pub fn new(index: Arc<dyn GeoIndex>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            index,
            geocoder,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleep),
        }
    }

    /// Wires the configured search backend and geocoder.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Query`] or [`LocateError::Geocoding`] when
    /// either HTTP client cannot be built from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, LocateError> {
        let index = ElasticsearchIndex::new(
            &config.search_url,
            &config.index_name,
            config.search_timeout_secs,
            &config.user_agent,
        )?;
        Self::from_config_with_index(Arc::new(index), config)
    }

    /// Uses `index` as-is and wires the configured geocoder and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Geocoding`] when the geocoder client cannot be built.
    pub fn from_config_with_index(
        index: Arc<dyn GeoIndex>,
        config: &AppConfig,
    ) -> Result<Self, LocateError> {
        let geocoder = GoogleGeocoder::with_base_url(
            config.geocoder_api_key.as_deref(),
            config.geocoder_timeout_secs,
            &config.user_agent,
            &config.geocoder_url,
        )?;
        let retry = RetryPolicy::new(
            config.geocoder_max_attempts,
            Duration::from_secs(config.geocoder_backoff_secs),
        );
        Ok(Self::new(index, Arc::new(geocoder)).with_retry_policy(retry))
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleep>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Turns the request origin into a coordinate, geocoding free text.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Geocoding`] when the provider cannot resolve the
    /// location within the retry policy.
    pub async fn resolve_origin(&self, origin: &LocationQuery) -> Result<Coordinate, LocateError> {
        match origin {
            LocationQuery::ByCoordinate(coordinate) => Ok(*coordinate),
            LocationQuery::ByLocation(location) => {
                let coordinate = resolve_with_retry(
                    self.geocoder.as_ref(),
                    location,
                    self.retry,
                    self.sleeper.as_ref(),
                )
                .await?;
                Ok(coordinate)
            }
        }
    }

    /// Runs the request and returns the raw hits, nearest first.
    ///
    /// # Errors
    ///
    /// - [`LocateError::InvalidArgument`] for a zero count.
    /// - [`LocateError::Geocoding`] if the origin cannot be resolved.
    /// - [`LocateError::Query`] if the index cannot answer.
    pub async fn locate(&self, request: &LocateRequest) -> Result<QueryResult, LocateError> {
        let span = tracing::info_span!("locate", unit = %request.unit, count = request.count);
        async {
            // Reject before spending geocoder quota.
            if request.count == 0 {
                return Err(LocateError::InvalidArgument(CoreError::InvalidCount(0)));
            }

            let origin = self.resolve_origin(&request.origin).await?;
            tracing::debug!(%origin, "resolved origin");

            let query = NearestStoreQuery::new(origin, request.unit, request.count)?;
            let result = self.index.nearest(&query).await?;
            tracing::info!(hits = result.len(), "nearest stores found");
            Ok::<_, LocateError>(result)
        }
        .instrument(span)
        .await
    }

    /// Runs the request and renders the hits in `mode`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::locate`].
    pub async fn locate_formatted(
        &self,
        request: &LocateRequest,
        mode: OutputMode,
    ) -> Result<FormattedStores, LocateError> {
        let result = self.locate(request).await?;
        Ok(FormattedStores::render(&result, mode))
    }

    /// Reachability probe for the underlying index.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Query`] when the index does not answer.
    pub async fn check_index(&self) -> Result<(), LocateError> {
        self.index.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_defaults_to_single_result() {
        let request = LocateRequest::from_parts(Some("29201"), None, None, "mi").unwrap();
        assert_eq!(request.count, 1);
        assert_eq!(request.unit, Unit::Miles);
        assert_eq!(
            request.origin,
            LocationQuery::ByLocation("29201".to_string())
        );
    }

    #[test]
    fn from_parts_rejects_unknown_unit() {
        assert_eq!(
            LocateRequest::from_parts(None, Some(1.0), Some(2.0), "ft"),
            Err(CoreError::InvalidUnit("ft".to_string()))
        );
    }

    #[test]
    fn from_parts_rejects_missing_origin_with_cli_message() {
        let err = LocateRequest::from_parts(None, None, None, "mi").unwrap_err();
        assert_eq!(
            err.to_string(),
            "provide either a location string or a latlong combination"
        );
    }

    #[test]
    fn with_count_overrides_default() {
        let request = LocateRequest::from_parts(None, Some(1.0), Some(2.0), "km")
            .unwrap()
            .with_count(4);
        assert_eq!(request.count, 4);
        assert_eq!(request.unit, Unit::Kilometers);
    }
}
