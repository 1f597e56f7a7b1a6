//! Decides whether a variant is excluded from a discount rule.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. The variant's own "exclude from all discounts" flag, for every rule.
//! 2. The product's vendor is in the rule's excluded brands.
//! 3. The product's type is in the rule's excluded product types.
//! 4. Store-wide rules only: the product sits in a collection that a
//!    collection-scoped rule targets. The collection discount takes
//!    precedence, so the store-wide rule must not discount it a second time.

use std::collections::BTreeSet;

use pricecut_core::{CatalogProduct, CatalogVariant, DiscountRule};

/// Collection handles targeted by any collection-scoped rule.
///
/// Built once from configuration before either pass runs, so precedence
/// checks never depend on collector state or on which rules finished first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedCollections {
    handles: BTreeSet<String>,
}

impl ClaimedCollections {
    #[must_use]
    pub fn from_rules(rules: &[DiscountRule]) -> Self {
        let handles = rules
            .iter()
            .filter(|rule| rule.is_collection_scoped())
            .flat_map(|rule| rule.collection_handles().iter().cloned())
            .collect();
        Self { handles }
    }

    #[must_use]
    pub fn contains(&self, handle: &str) -> bool {
        self.handles.contains(handle)
    }

    /// First collection of `product` that a collection rule claims.
    #[must_use]
    pub fn claiming<'p>(&self, product: &'p CatalogProduct) -> Option<&'p str> {
        product
            .collections
            .iter()
            .map(|c| c.handle.as_str())
            .find(|handle| self.contains(handle))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(String::as_str)
    }
}

/// Why a variant was left out of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exclusion {
    VariantFlag,
    Brand,
    ProductType,
    CollectionPrecedence,
}

/// Returns the first exclusion that applies, or `None` if the variant is
/// eligible for `rule`.
#[must_use]
pub fn exclusion_for(
    variant: &CatalogVariant,
    product: &CatalogProduct,
    rule: &DiscountRule,
    claimed: &ClaimedCollections,
) -> Option<Exclusion> {
    if variant.excluded_from_discounts {
        return Some(Exclusion::VariantFlag);
    }
    if rule.excluded_brands.contains(&product.vendor) {
        return Some(Exclusion::Brand);
    }
    if rule.excluded_product_types.contains(&product.product_type) {
        return Some(Exclusion::ProductType);
    }
    if rule.is_store_wide() && claimed.claiming(product).is_some() {
        return Some(Exclusion::CollectionPrecedence);
    }
    None
}

#[must_use]
pub fn is_excluded(
    variant: &CatalogVariant,
    product: &CatalogProduct,
    rule: &DiscountRule,
    claimed: &ClaimedCollections,
) -> bool {
    exclusion_for(variant, product, rule, claimed).is_some()
}
