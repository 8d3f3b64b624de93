use serde::{Deserialize, Serialize};

use crate::{Coordinate, CoreError};

/// One indexed store document.
///
/// Every field except the coordinate is free text; `zip_code` in particular
/// stays a string so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    pub store_location: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Geo-point field the nearest-store query is keyed on.
    #[serde(rename = "latlong")]
    pub coordinate: Coordinate,
    pub county: String,
}

impl StoreRecord {
    /// Confirms the record is searchable by geo query.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when the coordinate is out of range.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.coordinate.validate()
    }
}
