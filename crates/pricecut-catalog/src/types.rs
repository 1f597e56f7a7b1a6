//! Admin GraphQL API response types.
//!
//! ## Observed shape
//!
//! ### Envelope
//! Every response is `{ "data": ..., "errors": [...], "extensions": {...} }`.
//! `errors` is omitted on success. `data` may be `null` when the query
//! failed validation, and partially populated alongside `errors` otherwise.
//!
//! ### Money
//! `price` and `compareAtPrice` are `Money` scalars serialized as decimal
//! strings (`"19.99"`). `compareAtPrice` is `null` when no sale price is set.
//!
//! ### Metafields
//! Aliased metafield lookups (`excludedFromDiscounts: metafield(...)`) are
//! `null` when the variant has no such metafield. Boolean metafields carry
//! their value as the string `"true"` or `"false"`.
//!
//! ### Throttling
//! Cost-based throttling does not use HTTP 429. The request is answered with
//! HTTP 200 and an error whose `extensions.code` is `"THROTTLED"`. Remaining
//! query budget is reported in the top-level `extensions.cost.throttleStatus`.

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
    #[serde(default)]
    pub extensions: Option<ResponseExtensions>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

impl GraphqlError {
    /// `true` for Shopify's cost-based throttling error.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == "THROTTLED")
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseExtensions {
    #[serde(default)]
    pub cost: Option<QueryCost>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCost {
    #[serde(default)]
    pub requested_query_cost: Option<f64>,
    #[serde(default)]
    pub actual_query_cost: Option<f64>,
    pub throttle_status: ThrottleStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleStatus {
    pub maximum_available: f64,
    pub currently_available: f64,
    pub restore_rate: f64,
}

/// Relay-style connection: `{ pageInfo, edges: [{ node }] }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default)]
    pub page_info: PageInfo,
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// `data` of the full-catalog `products` query.
#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<ProductNode>,
}

/// `data` of the `collectionByIdentifier` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub collection_by_identifier: Option<CollectionNode>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionNode {
    pub id: String,
    pub handle: String,
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub vendor: String,
    /// Absent from the collection-scoped query.
    #[serde(default)]
    pub collections: Option<Connection<CollectionRefNode>>,
    pub variants: Connection<VariantNode>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionRefNode {
    pub id: String,
    pub handle: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    /// Storefront visibility flag. Fetched with the variant but not carried
    /// into the catalog model.
    #[serde(default)]
    pub exclude_online: Option<Metafield>,
    #[serde(default)]
    pub excluded_from_discounts: Option<Metafield>,
}

#[derive(Debug, Deserialize)]
pub struct Metafield {
    #[serde(default)]
    pub id: Option<String>,
    pub value: String,
}

impl Metafield {
    /// Boolean metafields store `"true"`; anything else reads as unset.
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.value.trim() == "true"
    }
}
