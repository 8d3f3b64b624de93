//! Nearest-store lookup: origin resolution, index query, and result rendering.

pub mod error;
pub mod format;
pub mod locator;

pub use error::{ErrorKind, LocateError};
pub use format::{format_structured, format_text, FormattedStores, OutputMode, StoreDistance};
pub use locator::{LocateRequest, StoreLocator};
