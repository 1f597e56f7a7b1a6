//! Drives every configured rule over the catalog.
//!
//! Collection-scoped rules run first, then store-wide rules. Within a class,
//! rules are issued concurrently from the calling task (bounded by
//! `max_concurrent_rules`) and each returns its own variants; the results are
//! concatenated in configuration order so the output does not depend on which
//! walk finished first.

use futures::stream::{self, StreamExt, TryStreamExt};
use pricecut_catalog::{CatalogError, CatalogSource, PageWalker, WalkSummary};
use pricecut_core::{AppliesTo, CatalogProduct, DiscountRule, DiscountedVariant};

use crate::collector::{CollectorStats, VariantCollector};
use crate::eligibility::ClaimedCollections;
use crate::error::DiscountError;

pub const DEFAULT_MAX_CONCURRENT_RULES: usize = 4;

/// Why a configured rule will not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `specific_collections` with an empty or missing collection list.
    NoCollections,
    /// The rule's scope has no catalog selector.
    UnsupportedScope(AppliesTo),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoCollections => write!(f, "no collections configured"),
            SkipReason::UnsupportedScope(scope) => write!(f, "unsupported scope '{scope}'"),
        }
    }
}

/// Configured rules partitioned by class, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RulePlan<'a> {
    pub collection_rules: Vec<&'a DiscountRule>,
    pub store_wide_rules: Vec<&'a DiscountRule>,
    pub skipped: Vec<(&'a DiscountRule, SkipReason)>,
}

impl<'a> RulePlan<'a> {
    #[must_use]
    pub fn from_rules(rules: &'a [DiscountRule]) -> Self {
        let mut plan = Self::default();
        for rule in rules {
            match rule.applies_to {
                AppliesTo::All => plan.store_wide_rules.push(rule),
                AppliesTo::SpecificCollections if rule.collection_handles().is_empty() => {
                    plan.skipped.push((rule, SkipReason::NoCollections));
                }
                AppliesTo::SpecificCollections => plan.collection_rules.push(rule),
                scope @ AppliesTo::SpecificProductTypes => {
                    plan.skipped.push((rule, SkipReason::UnsupportedScope(scope)));
                }
            }
        }
        plan
    }

    pub fn log_skipped(&self) {
        for (rule, reason) in &self.skipped {
            tracing::warn!(code = %rule.code, %reason, "skipping discount rule");
        }
    }
}

/// Variants produced by both passes, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountRun {
    /// Output of collection-scoped rules.
    pub collection_variants: Vec<DiscountedVariant>,
    /// Output of store-wide rules.
    pub product_variants: Vec<DiscountedVariant>,
}

impl DiscountRun {
    #[must_use]
    pub fn total(&self) -> usize {
        self.collection_variants.len() + self.product_variants.len()
    }
}

pub struct DiscountOrchestrator<'a, S: CatalogSource + ?Sized> {
    source: &'a S,
    rules: &'a [DiscountRule],
    walker: PageWalker,
    max_concurrent_rules: usize,
}

impl<'a, S: CatalogSource + ?Sized> DiscountOrchestrator<'a, S> {
    #[must_use]
    pub fn new(source: &'a S, rules: &'a [DiscountRule]) -> Self {
        Self {
            source,
            rules,
            walker: PageWalker::default(),
            max_concurrent_rules: DEFAULT_MAX_CONCURRENT_RULES,
        }
    }

    #[must_use]
    pub fn with_walker(mut self, walker: PageWalker) -> Self {
        self.walker = walker;
        self
    }

    #[must_use]
    pub fn with_max_concurrent_rules(mut self, max_concurrent_rules: usize) -> Self {
        self.max_concurrent_rules = max_concurrent_rules.max(1);
        self
    }

    /// Runs the collection pass, then the store-wide pass.
    ///
    /// Nothing is written here; the caller persists the returned run only
    /// after both passes succeed.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::Fetch`] for the first rule whose walk fails.
    /// An unknown collection handle is not an error: it is logged and skipped.
    pub async fn run(&self) -> Result<DiscountRun, DiscountError> {
        let plan = RulePlan::from_rules(self.rules);
        plan.log_skipped();

        let claimed = ClaimedCollections::from_rules(self.rules);
        tracing::info!(
            collection_rules = plan.collection_rules.len(),
            store_wide_rules = plan.store_wide_rules.len(),
            skipped = plan.skipped.len(),
            claimed_collections = claimed.len(),
            "starting discount run"
        );

        let collection_variants = self.run_class(&plan.collection_rules, &claimed).await?;
        let product_variants = self.run_class(&plan.store_wide_rules, &claimed).await?;

        tracing::info!(
            collection_variants = collection_variants.len(),
            product_variants = product_variants.len(),
            "discount run complete"
        );

        Ok(DiscountRun {
            collection_variants,
            product_variants,
        })
    }

    async fn run_class(
        &self,
        rules: &[&DiscountRule],
        claimed: &ClaimedCollections,
    ) -> Result<Vec<DiscountedVariant>, DiscountError> {
        let per_rule: Vec<Vec<DiscountedVariant>> = stream::iter(rules.iter().copied())
            .map(|rule| self.run_rule(rule, claimed))
            .buffered(self.max_concurrent_rules)
            .try_collect()
            .await?;

        Ok(per_rule.into_iter().flatten().collect())
    }

    async fn run_rule(
        &self,
        rule: &DiscountRule,
        claimed: &ClaimedCollections,
    ) -> Result<Vec<DiscountedVariant>, DiscountError> {
        let mut collector = VariantCollector::new(rule, claimed);
        let mut walked = WalkSummary::default();
        let source = self.source;

        if rule.is_collection_scoped() {
            for handle in rule.collection_handles() {
                let context = format!("collection '{handle}'");
                let result = self
                    .walker
                    .walk(
                        &context,
                        |cursor: Option<String>| async move {
                            source
                                .collection_products_page(handle, cursor.as_deref())
                                .await
                        },
                        |product: CatalogProduct| collector.visit(&product),
                    )
                    .await;

                match result {
                    Ok(summary) => {
                        walked.pages += summary.pages;
                        walked.items += summary.items;
                    }
                    Err(CatalogError::CollectionNotFound { handle }) => {
                        tracing::warn!(
                            code = %rule.code,
                            %handle,
                            "collection not found; skipping it for this rule"
                        );
                    }
                    Err(source) => {
                        return Err(DiscountError::Fetch {
                            code: rule.code.clone(),
                            source,
                        });
                    }
                }
            }
        } else {
            walked = self
                .walker
                .walk(
                    "products",
                    |cursor: Option<String>| async move {
                        source.products_page(cursor.as_deref()).await
                    },
                    |product: CatalogProduct| collector.visit(&product),
                )
                .await
                .map_err(|source| DiscountError::Fetch {
                    code: rule.code.clone(),
                    source,
                })?;
        }

        let (variants, stats) = collector.into_parts();
        log_rule_summary(rule, walked, stats);
        Ok(variants)
    }
}

fn log_rule_summary(rule: &DiscountRule, walked: WalkSummary, stats: CollectorStats) {
    tracing::info!(
        code = %rule.code,
        applies_to = %rule.applies_to,
        pages = walked.pages,
        products = stats.products,
        variants = stats.variants,
        emitted = stats.emitted,
        excluded_by_flag = stats.excluded_by_flag,
        excluded_by_brand = stats.excluded_by_brand,
        excluded_by_type = stats.excluded_by_type,
        excluded_by_collection = stats.excluded_by_collection,
        missing_sku = stats.missing_sku,
        "discount rule complete"
    );
}
