//! HTTP client for the Google Geocoding API.
//!
//! Every response carries a `"status"` field in its JSON envelope; non-`OK`
//! statuses surface as [`GeocodeError::Provider`] or
//! [`GeocodeError::NoResults`], flagged transient where a later retry can
//! succeed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use storefind_core::Coordinate;

use crate::error::GeocodeError;
use crate::types::GeocodeResponse;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Statuses that mean "try again later" rather than "this request is wrong".
///
/// `OVER_DAILY_LIMIT` is absent: it signals a missing key, disabled billing,
/// or a spent daily cap, none of which clears within a backoff window.
const TRANSIENT_STATUSES: [&str; 2] = ["OVER_QUERY_LIMIT", "UNKNOWN_ERROR"];

/// Resolves a free-text location to a single coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, location: &str) -> Result<Coordinate, GeocodeError>;
}

/// Client for the Google Geocoding API.
///
/// Use [`GoogleGeocoder::new`] for production or
/// [`GoogleGeocoder::with_base_url`] to point at a mock server in tests.
pub struct GoogleGeocoder {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl GoogleGeocoder {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_owned),
            base_url,
        })
    }

    /// Builds the request URL with a percent-encoded `address` and, when
    /// configured, the API key.
    fn build_url(&self, location: &str) -> Result<Url, GeocodeError> {
        let mut url =
            self.base_url
                .join(GEOCODE_PATH)
                .map_err(|e| GeocodeError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("address", location);
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        Ok(url)
    }

    /// Maps the response envelope onto a coordinate or a typed error.
    fn interpret(location: &str, response: GeocodeResponse) -> Result<Coordinate, GeocodeError> {
        match response.status.as_str() {
            "OK" => {
                let first = response.results.into_iter().next().ok_or_else(|| {
                    GeocodeError::MalformedResult("status OK with empty results".to_string())
                })?;
                let point = first.geometry.location;
                Coordinate::new(point.lat, point.lng)
                    .map_err(|e| GeocodeError::MalformedResult(e.to_string()))
            }
            "ZERO_RESULTS" => Err(GeocodeError::NoResults {
                location: location.to_string(),
            }),
            status => Err(GeocodeError::Provider {
                status: status.to_string(),
                message: response
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
                transient: TRANSIENT_STATUSES.contains(&status),
            }),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, location: &str) -> Result<Coordinate, GeocodeError> {
        let url = self.build_url(location)?;
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let envelope: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={location})"),
                source: e,
            })?;

        let coordinate = Self::interpret(location, envelope)?;
        tracing::debug!(location, %coordinate, "geocoded location");
        Ok(coordinate)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
