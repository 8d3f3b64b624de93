//! The `find` command: one locate request, printed to stdout.

use clap::{ArgGroup, Args};
use storefind_core::AppConfig;
use storefind_locator::{LocateRequest, OutputMode, StoreLocator};

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("origin")
        .required(true)
        .args(["address", "zip", "lat"])
))]
pub struct FindArgs {
    /// Street address or place name to search from
    #[arg(long)]
    pub address: Option<String>,
    /// Zip code to search from
    #[arg(long)]
    pub zip: Option<String>,
    /// Latitude of the origin in degrees (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Longitude of the origin in degrees (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
    /// Distance unit; defaults to STOREFIND_DEFAULT_UNIT
    #[arg(long, value_parser = ["mi", "km"])]
    pub unit: Option<String>,
    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub output: String,
    /// Number of stores to return
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

impl FindArgs {
    /// The free-text origin, whichever flag supplied it.
    pub fn location(&self) -> Option<&str> {
        self.address.as_deref().or(self.zip.as_deref())
    }
}

/// Resolves the origin, queries the index, and prints the formatted hits.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the origin cannot be
/// geocoded, or the search backend cannot answer.
pub(crate) async fn run_find(config: &AppConfig, args: &FindArgs) -> anyhow::Result<()> {
    let unit = args
        .unit
        .clone()
        .unwrap_or_else(|| config.default_unit.label().to_string());
    let mode: OutputMode = args.output.parse()?;
    let request = LocateRequest::from_parts(args.location(), args.lat, args.lon, &unit)?
        .with_count(args.count);

    let locator = StoreLocator::from_config(config)?;
    let rendered = locator.locate_formatted(&request, mode).await?;
    println!("{rendered}");
    Ok(())
}
