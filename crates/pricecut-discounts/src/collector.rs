//! Accumulates the discounted variants one rule produces.

use pricecut_core::{CatalogProduct, DiscountRule, DiscountedVariant};

use crate::eligibility::{exclusion_for, ClaimedCollections, Exclusion};
use crate::price::discounted_price;

/// Counts kept while a rule walks the catalog; logged when the rule finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub products: usize,
    pub variants: usize,
    pub emitted: usize,
    pub excluded_by_flag: usize,
    pub excluded_by_brand: usize,
    pub excluded_by_type: usize,
    pub excluded_by_collection: usize,
    /// Eligible variants dropped because they have no SKU to key on.
    pub missing_sku: usize,
}

impl CollectorStats {
    fn record(&mut self, exclusion: Exclusion) {
        match exclusion {
            Exclusion::VariantFlag => self.excluded_by_flag += 1,
            Exclusion::Brand => self.excluded_by_brand += 1,
            Exclusion::ProductType => self.excluded_by_type += 1,
            Exclusion::CollectionPrecedence => self.excluded_by_collection += 1,
        }
    }

    /// Adds another walk's counts, e.g. a second collection of the same rule.
    pub fn absorb(&mut self, other: CollectorStats) {
        self.products += other.products;
        self.variants += other.variants;
        self.emitted += other.emitted;
        self.excluded_by_flag += other.excluded_by_flag;
        self.excluded_by_brand += other.excluded_by_brand;
        self.excluded_by_type += other.excluded_by_type;
        self.excluded_by_collection += other.excluded_by_collection;
        self.missing_sku += other.missing_sku;
    }
}

/// Filters and prices every variant of the products it is shown, for one rule.
///
/// Used as the page walker's visitor: whatever it has collected stays put if
/// a later page fails.
#[derive(Debug)]
pub struct VariantCollector<'a> {
    rule: &'a DiscountRule,
    claimed: &'a ClaimedCollections,
    variants: Vec<DiscountedVariant>,
    stats: CollectorStats,
}

impl<'a> VariantCollector<'a> {
    #[must_use]
    pub fn new(rule: &'a DiscountRule, claimed: &'a ClaimedCollections) -> Self {
        Self {
            rule,
            claimed,
            variants: Vec::new(),
            stats: CollectorStats::default(),
        }
    }

    pub fn visit(&mut self, product: &CatalogProduct) {
        self.stats.products += 1;

        for variant in &product.variants {
            self.stats.variants += 1;

            if let Some(exclusion) = exclusion_for(variant, product, self.rule, self.claimed) {
                self.stats.record(exclusion);
                continue;
            }

            let Some(sku) = variant.sku.as_deref() else {
                self.stats.missing_sku += 1;
                tracing::debug!(
                    code = %self.rule.code,
                    variant_id = %variant.id,
                    "skipping eligible variant without SKU"
                );
                continue;
            };

            self.variants.push(DiscountedVariant {
                product_type: product.product_type.clone(),
                brand: product.vendor.clone(),
                product_id: product.id.clone(),
                product_title: product.title.clone(),
                variant_id: variant.id.clone(),
                sku: sku.to_owned(),
                price: variant.price,
                compare_at_price: variant.compare_at_price,
                discounted_price: discounted_price(variant.price, self.rule.percentage),
                code: self.rule.code.clone(),
            });
            self.stats.emitted += 1;
        }
    }

    #[must_use]
    pub fn variants(&self) -> &[DiscountedVariant] {
        &self.variants
    }

    #[must_use]
    pub fn stats(&self) -> CollectorStats {
        self.stats
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<DiscountedVariant>, CollectorStats) {
        (self.variants, self.stats)
    }
}
