//! Enrichment command handlers.
//!
//! Each handler loads a raw dataset, enriches it in place and writes it back.
//! Per-record lookup failures are logged by the scraper and never abort the
//! run; only I/O and client construction errors are propagated.

use std::path::{Path, PathBuf};

use anyhow::Context;
use barrancos_core::{load_dataset, save_dataset, AppConfig};
use barrancos_scraper::{
    add_search_urls, enrich_coordinates, enrich_wikiloc_links, session_headers,
    CoordinateOptions, EnrichSummary, EnrichmentClient, WikilocOptions,
};

/// Default output for `search-links`: a sibling of `source` with a
/// `_con_wikiloc` suffix, so the original file is left untouched.
pub(crate) fn search_links_output(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_owned());
    source.with_file_name(format!("{stem}_con_wikiloc.json"))
}

/// # Errors
///
/// Returns an error if the dataset cannot be read or written.
pub(crate) fn run_search_links(source: &Path, output: &Path, activity: &str) -> anyhow::Result<()> {
    let mut dataset = load_dataset(source)?;
    let updated = add_search_urls(&mut dataset, activity);
    save_dataset(output, &dataset)
        .with_context(|| format!("writing dataset to {}", output.display()))?;
    tracing::info!(updated, output = %output.display(), "search links added");
    Ok(())
}

/// # Errors
///
/// Returns an error if the dataset cannot be read or written, or the HTTP
/// client cannot be built.
pub(crate) async fn run_coordinates(
    config: &AppConfig,
    source: &Path,
    output: &Path,
    options: &CoordinateOptions,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut dataset = load_dataset(source)?;
    let client = EnrichmentClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
        &[],
    )
    .context("failed to build HTTP client")?;

    let summary = enrich_coordinates(&client, &mut dataset, options).await;
    finish(&dataset, output, summary, dry_run)
}

/// # Errors
///
/// Returns an error if the dataset cannot be read or written, or the HTTP
/// client cannot be built.
pub(crate) async fn run_wikiloc_links(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    options: &WikilocOptions,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut dataset = load_dataset(input)?;
    let headers = session_headers(
        config.wikiloc_cookie.as_deref(),
        config.wikiloc_headers.as_deref(),
    );
    let client = EnrichmentClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
        &headers,
    )
    .context("failed to build HTTP client")?;

    let summary = enrich_wikiloc_links(&client, &mut dataset, options).await;
    finish(&dataset, output, summary, dry_run)
}

fn finish(
    dataset: &[serde_json::Value],
    output: &Path,
    summary: EnrichSummary,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        println!(
            "dry-run: {} of {} processed records would be updated; nothing written",
            summary.updated, summary.processed
        );
        return Ok(());
    }

    save_dataset(output, dataset)
        .with_context(|| format!("writing dataset to {}", output.display()))?;
    tracing::info!(
        processed = summary.processed,
        updated = summary.updated,
        output = %output.display(),
        "dataset saved"
    );
    Ok(())
}
