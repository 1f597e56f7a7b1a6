//! The seam between the discount pipeline and the remote catalog.

use async_trait::async_trait;
use pricecut_core::CatalogProduct;

use crate::error::CatalogError;
use crate::pagination::Page;

/// A paginated source of catalog products.
///
/// [`crate::CatalogClient`] implements this against the Admin GraphQL API.
/// Retrying transient failures is the implementor's responsibility; callers
/// treat every error as final.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One page of the full catalog, starting after `after`.
    async fn products_page(
        &self,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError>;

    /// One page of the products in the collection with `handle`.
    ///
    /// Returns [`CatalogError::CollectionNotFound`] if no such collection exists.
    async fn collection_products_page(
        &self,
        handle: &str,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError>;
}
