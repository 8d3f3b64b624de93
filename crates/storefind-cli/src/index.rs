//! Index administration command handlers.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use storefind_core::AppConfig;
use storefind_index::{read_store_csv, ElasticsearchIndex};

/// Sub-commands available under `index`.
#[derive(Debug, Subcommand)]
pub enum IndexCommands {
    /// Create the store index with the geo-point mapping
    Create,
    /// Load stores from a CSV export
    Load {
        /// Path to the CSV export
        #[arg(long)]
        csv: PathBuf,
        /// Add to the existing index instead of recreating it
        #[arg(long)]
        append: bool,
    },
}

fn connect(config: &AppConfig) -> anyhow::Result<ElasticsearchIndex> {
    ElasticsearchIndex::new(
        &config.search_url,
        &config.index_name,
        config.search_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build search client: {e}"))
}

/// Creates the configured index.
///
/// # Errors
///
/// Returns an error if the backend rejects the mapping (for example because
/// the index already exists) or is unreachable.
pub(crate) async fn run_index_create(config: &AppConfig) -> anyhow::Result<()> {
    let index = connect(config)?;
    index.create_index().await?;
    println!("created index {}", index.index_name());
    Ok(())
}

/// Reads `csv`, then bulk-loads the searchable rows.
///
/// Unless `append` is set the index is dropped and recreated first. Rows
/// without a usable coordinate are skipped and counted.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or any backend
/// call fails.
pub(crate) async fn run_index_load(
    config: &AppConfig,
    csv: &Path,
    append: bool,
) -> anyhow::Result<()> {
    let file = std::fs::File::open(csv)
        .with_context(|| format!("failed to open {}", csv.display()))?;
    let report = read_store_csv(file).with_context(|| format!("failed to read {}", csv.display()))?;

    let index = connect(config)?;
    if !append {
        index.recreate_index().await?;
    }
    let loaded = index.bulk_insert(&report.records).await?;
    index.refresh().await?;

    tracing::info!(
        index = index.index_name(),
        loaded,
        skipped = report.skipped,
        append,
        "store load complete"
    );
    println!(
        "loaded {loaded} stores into {} ({} skipped)",
        index.index_name(),
        report.skipped
    );
    Ok(())
}
