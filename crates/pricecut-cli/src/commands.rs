//! Command handlers called from `main` once logging is up.

use std::path::{Path, PathBuf};

use pricecut_catalog::pagination::DEFAULT_MAX_PAGES;
use pricecut_catalog::{CatalogClient, PageWalker};
use pricecut_core::AppConfig;
use pricecut_discounts::output::{generate_to_dir, merge_output_dir};
use pricecut_discounts::{ClaimedCollections, RulePlan};

/// Loads the process configuration, applying command-line overrides.
pub(crate) fn load_config(
    discounts_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<AppConfig> {
    let mut config = pricecut_core::load_app_config()?;
    if let Some(path) = discounts_path {
        config.discounts_path = path;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Runs both passes against the live catalog and writes the variant files.
///
/// The files are only written once both passes have succeeded.
///
/// # Errors
///
/// Returns an error if the rule file is invalid, the client cannot be built,
/// a catalog walk fails, or the files cannot be written.
pub(crate) async fn run_generate(config: &AppConfig) -> anyhow::Result<()> {
    let rules = pricecut_core::load_discounts(&config.discounts_path)?.discounts;
    let client = CatalogClient::from_app_config(config)?;
    let walker = PageWalker::new(DEFAULT_MAX_PAGES, config.inter_page_delay_ms);

    tracing::info!(
        store = %config.shopify_store,
        rules = rules.len(),
        page_size = client.page_size(),
        "generating discounted variants"
    );

    let run = generate_to_dir(
        &client,
        &rules,
        walker,
        config.max_concurrent_rules,
        &config.output_dir,
    )
    .await?;

    println!(
        "generated {} discounted variants ({} collection, {} store-wide) in {}",
        run.total(),
        run.collection_variants.len(),
        run.product_variants.len(),
        config.output_dir.display()
    );
    Ok(())
}

/// Merges the variant files in `output_dir` into the payload artifacts.
///
/// # Errors
///
/// Returns an error if an input file is malformed or an output cannot be written.
pub(crate) async fn run_payload(output_dir: &Path) -> anyhow::Result<()> {
    let merged = merge_output_dir(output_dir).await?;
    println!(
        "wrote payload for {} SKUs ({} duplicates overwritten) to {}",
        merged.len(),
        merged.conflicts.len(),
        output_dir.display()
    );
    Ok(())
}

/// Validates the rule file and prints how each rule will be run.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub(crate) fn run_check_config(path: &Path) -> anyhow::Result<()> {
    let rules = pricecut_core::load_discounts(path)?.discounts;
    let plan = RulePlan::from_rules(&rules);
    let claimed = ClaimedCollections::from_rules(&rules);

    println!("{}: {} rules", path.display(), rules.len());
    for rule in &plan.collection_rules {
        println!(
            "  collection  {:<24} {:>6}%  [{}]",
            rule.code,
            rule.percentage,
            rule.collection_handles().join(", ")
        );
    }
    for rule in &plan.store_wide_rules {
        println!("  store-wide  {:<24} {:>6}%", rule.code, rule.percentage);
    }
    for (rule, reason) in &plan.skipped {
        println!("  skipped     {:<24} {reason}", rule.code);
    }
    if !claimed.is_empty() {
        let handles: Vec<&str> = claimed.iter().collect();
        println!(
            "store-wide rules skip products in: {}",
            handles.join(", ")
        );
    }
    Ok(())
}
