//! Reading and writing the pipeline's JSON artifacts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pricecut_catalog::{CatalogSource, PageWalker};
use pricecut_core::{DiscountRule, DiscountedVariant};

use crate::error::DiscountError;
use crate::merge::{MergedPayload, PayloadArtifacts, PayloadMerger};
use crate::orchestrator::{DiscountOrchestrator, DiscountRun};

pub const COLLECTION_VARIANTS_FILE: &str = "collection-discounts.json";
pub const PRODUCT_VARIANTS_FILE: &str = "product-discounts.json";
pub const DISCOUNTS_FILE: &str = "discounts.json";
pub const DISCOUNTS_MIN_FILE: &str = "discounts-min.json";
pub const SKUS_FILE: &str = "skus.json";
pub const SKUS_MIN_FILE: &str = "skus-min.json";
pub const DISCOUNTS_BY_CODE_FILE: &str = "discounts-by-code.json";

/// Merge inputs, in the order they are absorbed.
pub const MERGE_INPUTS: [&str; 2] = [COLLECTION_VARIANTS_FILE, PRODUCT_VARIANTS_FILE];

/// Runs both passes over `source` and writes the variant files into `dir`.
///
/// Nothing is written unless both passes succeed, so a failed run leaves
/// `dir` as it was.
///
/// # Errors
///
/// - [`DiscountError::Fetch`] if any rule's catalog walk fails.
/// - [`DiscountError::Io`] if the directory or a file cannot be written.
pub async fn generate_to_dir<S: CatalogSource + ?Sized>(
    source: &S,
    rules: &[DiscountRule],
    walker: PageWalker,
    max_concurrent_rules: usize,
    dir: &Path,
) -> Result<DiscountRun, DiscountError> {
    let run = DiscountOrchestrator::new(source, rules)
        .with_walker(walker)
        .with_max_concurrent_rules(max_concurrent_rules)
        .run()
        .await?;
    write_variant_files(dir, &run).await?;
    Ok(run)
}

/// Writes both passes of a completed run as pretty-printed arrays.
///
/// # Errors
///
/// Returns [`DiscountError::Io`] if the directory or a file cannot be written.
pub async fn write_variant_files(dir: &Path, run: &DiscountRun) -> Result<(), DiscountError> {
    create_dir(dir).await?;
    write_variants(&dir.join(COLLECTION_VARIANTS_FILE), &run.collection_variants).await?;
    write_variants(&dir.join(PRODUCT_VARIANTS_FILE), &run.product_variants).await?;
    tracing::info!(
        dir = %dir.display(),
        collection_variants = run.collection_variants.len(),
        product_variants = run.product_variants.len(),
        "wrote variant files"
    );
    Ok(())
}

async fn write_variants(path: &Path, variants: &[DiscountedVariant]) -> Result<(), DiscountError> {
    let json = serde_json::to_string_pretty(variants).map_err(|source| {
        DiscountError::Serialize {
            what: "discounted variants",
            source,
        }
    })?;
    write_file(path, json).await
}

/// Reads a variants file written by [`write_variant_files`].
///
/// A missing file is logged and read as empty, as is a file holding only
/// whitespace.
///
/// # Errors
///
/// - [`DiscountError::Io`] if the file exists but cannot be read.
/// - [`DiscountError::Parse`] if it is not a JSON array of variants.
pub async fn read_variant_file(path: &Path) -> Result<Vec<DiscountedVariant>, DiscountError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "variants file not found; treating as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(DiscountError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|source| DiscountError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every merged artifact into `dir`, returning the paths written.
///
/// # Errors
///
/// Returns [`DiscountError::Io`] if the directory or a file cannot be written.
pub async fn write_payload(
    dir: &Path,
    artifacts: PayloadArtifacts,
) -> Result<Vec<PathBuf>, DiscountError> {
    create_dir(dir).await?;

    let files = [
        (DISCOUNTS_FILE, artifacts.discounts),
        (DISCOUNTS_MIN_FILE, artifacts.discounts_min),
        (SKUS_FILE, artifacts.skus),
        (SKUS_MIN_FILE, artifacts.skus_min),
        (DISCOUNTS_BY_CODE_FILE, artifacts.discounts_by_code),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        write_file(&path, contents).await?;
        written.push(path);
    }
    Ok(written)
}

/// Reads both variants files from `dir` in merge order, merges them, and
/// writes the payload artifacts next to them.
///
/// # Errors
///
/// Propagates read, parse, serialization, and write failures. Nothing is
/// written if either input is malformed.
pub async fn merge_output_dir(dir: &Path) -> Result<MergedPayload, DiscountError> {
    let mut merger = PayloadMerger::new();
    for name in MERGE_INPUTS {
        let variants = read_variant_file(&dir.join(name)).await?;
        tracing::debug!(file = name, variants = variants.len(), "absorbing variants file");
        merger.absorb(name, &variants);
    }

    let merged = merger.finish();
    let artifacts = merged.render()?;
    write_payload(dir, artifacts).await?;

    tracing::info!(
        dir = %dir.display(),
        skus = merged.len(),
        duplicates = merged.conflicts.len(),
        "wrote discount payload"
    );
    Ok(merged)
}

async fn create_dir(dir: &Path) -> Result<(), DiscountError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DiscountError::io(dir, e))
}

async fn write_file(path: &Path, contents: String) -> Result<(), DiscountError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| DiscountError::io(path, e))
}
