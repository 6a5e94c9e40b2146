//! Catalog command handlers: `build` and `show`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use barrancos_catalog::{build_catalog_from_sources, find_canyon, RawSource};
use barrancos_core::{load_dataset, save_dataset, CanonicalCanyon};
use serde_json::Value;

/// Loads every input and assembles the catalog. Each dataset is tagged with
/// its file stem.
pub(crate) fn assemble(inputs: &[PathBuf]) -> anyhow::Result<Vec<CanonicalCanyon>> {
    let mut datasets: Vec<(String, Vec<Value>)> = Vec::with_capacity(inputs.len());
    for path in inputs {
        let records = load_dataset(path)?;
        tracing::info!(path = %path.display(), records = records.len(), "dataset loaded");
        datasets.push((source_tag(path), records));
    }

    let sources: Vec<RawSource<'_>> = datasets
        .iter()
        .map(|(tag, records)| RawSource { tag, records })
        .collect();
    Ok(build_catalog_from_sources(&sources))
}

/// Builds the catalog from `inputs` and writes it to `output`.
///
/// # Errors
///
/// Returns an error if any input cannot be loaded or the output cannot be
/// written.
pub(crate) fn run_build(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let catalog = assemble(inputs)?;
    save_dataset(output, &catalog)
        .with_context(|| format!("writing catalog to {}", output.display()))?;
    tracing::info!(
        canyons = catalog.len(),
        output = %output.display(),
        "catalog written"
    );
    Ok(())
}

/// Renders the canyon with `id` as pretty JSON.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or no canyon has `id`.
pub(crate) fn run_show(inputs: &[PathBuf], id: &str) -> anyhow::Result<String> {
    let catalog = assemble(inputs)?;
    let canyon =
        find_canyon(&catalog, id).ok_or_else(|| anyhow::anyhow!("canyon '{id}' not found"))?;
    Ok(serde_json::to_string_pretty(canyon)?)
}

fn source_tag(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
