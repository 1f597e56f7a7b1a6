//! Reconciles the collection and store-wide passes into one SKU-keyed mapping.
//!
//! Inputs are absorbed in a fixed order and the last record seen for a SKU
//! wins. Every overwrite logs exactly one warning. The mapping is kept sorted
//! by SKU, so the same inputs in the same order always render to the same bytes.

use std::collections::BTreeMap;

use pricecut_core::{DiscountedVariant, SkuDiscount};
use serde::Serialize;

use crate::error::DiscountError;

/// One SKU that was discounted more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub sku: String,
    /// Code of the entry that was replaced.
    pub previous_code: String,
    /// Code of the entry that replaced it.
    pub code: String,
    /// Input the winning entry came from.
    pub source: String,
}

#[derive(Debug, Default)]
pub struct PayloadMerger {
    discounts: BTreeMap<String, SkuDiscount>,
    conflicts: Vec<MergeConflict>,
}

impl PayloadMerger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `variants` in order, overwriting any SKU already present.
    ///
    /// Every overwrite logs one warning and appends one [`MergeConflict`],
    /// so `conflicts` holds exactly one entry per warning. `source` names the
    /// input in both (usually its file name).
    pub fn absorb(&mut self, source: &str, variants: &[DiscountedVariant]) {
        for variant in variants {
            let entry = SkuDiscount::from(variant);
            if let Some(previous) = self.discounts.insert(variant.sku.clone(), entry) {
                tracing::warn!(
                    sku = %variant.sku,
                    code = %variant.code,
                    previous_code = %previous.code,
                    source,
                    "duplicate SKU; later discount overwrites earlier one"
                );
                self.conflicts.push(MergeConflict {
                    sku: variant.sku.clone(),
                    previous_code: previous.code,
                    code: variant.code.clone(),
                    source: source.to_owned(),
                });
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> MergedPayload {
        MergedPayload {
            discounts: self.discounts,
            conflicts: self.conflicts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedPayload {
    pub discounts: BTreeMap<String, SkuDiscount>,
    pub conflicts: Vec<MergeConflict>,
}

/// One entry of `discounts-by-code.json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CodeEntry<'a> {
    sku: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    discounted_price: rust_decimal::Decimal,
}

/// Serialized contents of every merged artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadArtifacts {
    pub discounts: String,
    pub discounts_min: String,
    pub skus: String,
    pub skus_min: String,
    pub discounts_by_code: String,
}

impl MergedPayload {
    #[must_use]
    pub fn len(&self) -> usize {
        self.discounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discounts.is_empty()
    }

    /// SKUs in mapping order.
    #[must_use]
    pub fn skus(&self) -> Vec<&str> {
        self.discounts.keys().map(String::as_str).collect()
    }

    /// Final SKUs grouped under the code that won them.
    #[must_use]
    pub fn by_code(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (sku, discount) in &self.discounts {
            grouped
                .entry(discount.code.as_str())
                .or_default()
                .push(sku.as_str());
        }
        grouped
    }

    /// Renders every artifact. Pretty files use two-space indentation and
    /// end without a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::Serialize`] if serialization fails.
    pub fn render(&self) -> Result<PayloadArtifacts, DiscountError> {
        let skus = self.skus();
        let by_code: BTreeMap<&str, Vec<CodeEntry<'_>>> = self
            .by_code()
            .into_iter()
            .map(|(code, skus)| {
                let entries = skus
                    .into_iter()
                    .filter_map(|sku| {
                        self.discounts.get(sku).map(|d| CodeEntry {
                            sku,
                            discounted_price: d.discounted_price,
                        })
                    })
                    .collect();
                (code, entries)
            })
            .collect();

        Ok(PayloadArtifacts {
            discounts: pretty("discounts", &self.discounts)?,
            discounts_min: compact("discounts", &self.discounts)?,
            skus: pretty("skus", &skus)?,
            skus_min: compact("skus", &skus)?,
            discounts_by_code: pretty("discounts by code", &by_code)?,
        })
    }
}

fn pretty<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<String, DiscountError> {
    serde_json::to_string_pretty(value).map_err(|source| DiscountError::Serialize { what, source })
}

fn compact<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<String, DiscountError> {
    serde_json::to_string(value).map_err(|source| DiscountError::Serialize { what, source })
}
