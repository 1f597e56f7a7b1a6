use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product flattened out of the Admin API's `edges/node` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Admin API global ID, e.g. `"gid://shopify/Product/123"`.
    pub id: String,
    pub title: String,
    /// Product type as configured in the admin. May be empty.
    pub product_type: String,
    /// Vendor name; discount rules call this the brand.
    pub vendor: String,
    pub collections: Vec<CollectionRef>,
    pub variants: Vec<CatalogVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: String,
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub id: String,
    /// `None` when the admin has no SKU (null or blank) for the variant.
    pub sku: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    /// Set from the "exclude from all discounts" metafield. Absent means `false`.
    pub excluded_from_discounts: bool,
}
