use thiserror::Error;

/// Errors returned while resolving a location to a coordinate.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-`OK` status.
    #[error("geocoder returned {status}: {message}")]
    Provider {
        status: String,
        message: String,
        transient: bool,
    },

    #[error("no geocoding results for \"{location}\"")]
    NoResults { location: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider said `OK` but the first result carries no usable coordinate.
    #[error("unusable geocoding result: {0}")]
    MalformedResult(String),

    #[error("invalid geocoder URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("geocoding failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<GeocodeError>,
    },
}

impl GeocodeError {
    /// Returns `true` for errors worth retrying after the back-off delay.
    ///
    /// **Retriable:**
    /// - Provider rate-limit and temporary-failure statuses.
    /// - Network timeouts and connection failures.
    /// - HTTP 5xx and 429 responses.
    ///
    /// Everything else (denied or invalid requests, zero results, malformed
    /// bodies) is final.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                    })
            }
            Self::Provider { transient, .. } => *transient,
            Self::NoResults { .. }
            | Self::Deserialize { .. }
            | Self::MalformedResult(_)
            | Self::InvalidBaseUrl { .. }
            | Self::RetriesExhausted { .. } => false,
        }
    }
}
