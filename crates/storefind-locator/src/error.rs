use storefind_core::CoreError;
use storefind_geocode::GeocodeError;
use storefind_index::IndexError;
use thiserror::Error;

/// Everything a locate call can fail with, grouped by who is at fault.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CoreError),

    #[error("geocoding failed: {0}")]
    Geocoding(#[from] GeocodeError),

    #[error("store query failed: {0}")]
    Query(#[from] IndexError),
}

/// Coarse failure category, stable across the variants underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    GeocodingFailure,
    QueryFailure,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::GeocodingFailure => "GeocodingFailure",
            Self::QueryFailure => "QueryFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LocateError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Geocoding(_) => ErrorKind::GeocodingFailure,
            Self::Query(_) => ErrorKind::QueryFailure,
        }
    }
}
