//! Domain types and configuration shared by every `storefind` crate.
//!
//! Nothing in here performs I/O beyond reading environment variables; the
//! search backend and the geocoder live in their own crates.

pub mod app_config;
pub mod config;
pub mod geo;
pub mod store;
pub mod units;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Coordinate, LocationQuery};
pub use store::StoreRecord;
pub use units::{convert_from_meters, Unit};

use thiserror::Error;

/// Invalid caller input. Never retried; surfaced straight to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unit can only be mi or km, got: {0}")]
    InvalidUnit(String),

    #[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
    InvalidCoordinate {
        latitude: f64,
        longitude: f64,
        reason: &'static str,
    },

    #[error("result count must be at least 1, got {0}")]
    InvalidCount(usize),

    #[error("output can only be text or json, got: {0}")]
    InvalidOutputMode(String),

    #[error("provide either a location string or a latlong combination")]
    AmbiguousOrigin,

    #[error("location string must not be blank")]
    EmptyLocation,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
