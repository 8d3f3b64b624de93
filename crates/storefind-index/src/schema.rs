//! Index mapping for store documents.

use serde_json::{json, Value};

/// Geo-point field every nearest-store query is keyed on.
pub const GEO_FIELD: &str = "latlong";

/// Index name used when none is configured.
pub const DEFAULT_INDEX: &str = "stores";

const TEXT_FIELDS: [&str; 7] = [
    "name",
    "store_location",
    "address",
    "city",
    "state",
    "zip_code",
    "county",
];

/// Mapping body for index creation: free-text fields plus one geo-point.
#[must_use]
pub fn store_mappings() -> Value {
    let mut properties = serde_json::Map::new();
    for field in TEXT_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "text" }));
    }
    properties.insert(GEO_FIELD.to_string(), json!({ "type": "geo_point" }));

    json!({ "mappings": { "properties": properties } })
}
