//! Free-text location → coordinate resolution.
//!
//! [`Geocoder`] is the provider seam; [`GoogleGeocoder`] is the HTTP
//! implementation and [`resolve_with_retry`] wraps any provider in the
//! fixed-interval retry loop.

pub mod client;
pub mod error;
pub mod retry;
pub(crate) mod types;

pub use client::{Geocoder, GoogleGeocoder};
pub use error::GeocodeError;
pub use retry::{resolve_with_retry, RetryPolicy, Sleep, TokioSleep};
