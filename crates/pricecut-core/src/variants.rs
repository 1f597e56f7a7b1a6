//! Records emitted by the discount pipeline and written to the output artifacts.
//!
//! Field names are camelCase on the wire because downstream price engines
//! consume these files directly. Prices serialize as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog variant priced by one discount rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountedVariant {
    /// Product type of the parent product.
    #[serde(rename = "type")]
    pub product_type: String,
    /// Vendor of the parent product.
    pub brand: String,
    pub product_id: String,
    pub product_title: String,
    pub variant_id: String,
    pub sku: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub discounted_price: Decimal,
    /// Code of the rule that produced this record.
    pub code: String,
}

/// The merged, per-SKU view: what a SKU sells for and which code set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuDiscount {
    #[serde(with = "rust_decimal::serde::float")]
    pub discounted_price: Decimal,
    pub code: String,
}

impl From<&DiscountedVariant> for SkuDiscount {
    fn from(variant: &DiscountedVariant) -> Self {
        Self {
            discounted_price: variant.discounted_price,
            code: variant.code.clone(),
        }
    }
}
