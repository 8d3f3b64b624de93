//! Store records from the tabular export used to seed the index.

use std::io::Read;

use serde::Deserialize;
use storefind_core::{Coordinate, StoreRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of reading an export: the searchable records plus how many rows
/// were dropped for lacking a usable coordinate.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub records: Vec<StoreRecord>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct StoreRow {
    #[serde(rename = "Store Name")]
    name: String,
    #[serde(rename = "Store Location")]
    store_location: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Zip Code")]
    zip_code: String,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
    #[serde(rename = "County")]
    county: String,
}

impl StoreRow {
    fn coordinate(&self) -> Result<Coordinate, String> {
        let lat: f64 = self
            .latitude
            .parse()
            .map_err(|_| format!("latitude {:?} is not a number", self.latitude))?;
        let lon: f64 = self
            .longitude
            .parse()
            .map_err(|_| format!("longitude {:?} is not a number", self.longitude))?;
        Coordinate::new(lat, lon).map_err(|e| e.to_string())
    }
}

/// Reads a store export with a header row.
///
/// Cells are trimmed; `Zip Code` stays text. Rows whose coordinate is
/// missing, unparsable or out of range are logged and skipped.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] for I/O failures, invalid UTF-8, missing
/// columns, or rows with the wrong number of fields.
pub fn read_store_csv<R: Read>(reader: R) -> Result<IngestReport, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = IngestReport::default();
    for (index, row) in csv_reader.deserialize::<StoreRow>().enumerate() {
        let row = row?;
        // Header is line 1.
        let line = index + 2;
        match row.coordinate() {
            Ok(coordinate) => report.records.push(StoreRecord {
                name: row.name,
                store_location: row.store_location,
                address: row.address,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
                coordinate,
                county: row.county,
            }),
            Err(reason) => {
                tracing::warn!(line, store = %row.name, reason, "skipping store without usable coordinate");
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        records = report.records.len(),
        skipped = report.skipped,
        "read store export"
    );
    Ok(report)
}
