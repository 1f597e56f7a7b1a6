//! Paginated catalog queries for `CatalogClient`.

use async_trait::async_trait;
use pricecut_core::CatalogProduct;
use serde_json::json;

use crate::error::CatalogError;
use crate::normalize::normalize_product;
use crate::pagination::Page;
use crate::queries::{COLLECTION_PRODUCTS_QUERY, PRODUCTS_QUERY};
use crate::source::CatalogSource;
use crate::types::{CollectionData, Connection, ProductNode, ProductsData};

use super::CatalogClient;

impl CatalogClient {
    /// Fetches one page of the full catalog.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`CatalogClient::execute`].
    pub async fn fetch_products_page(
        &self,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError> {
        let data: ProductsData = self
            .execute(
                "products",
                PRODUCTS_QUERY,
                json!({ "first": self.page_size, "after": after }),
            )
            .await?;
        Ok(into_page(data.products))
    }

    /// Fetches one page of a collection's products by collection handle.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CollectionNotFound`] if the handle does not resolve.
    /// - Any error from [`CatalogClient::execute`].
    pub async fn fetch_collection_products_page(
        &self,
        handle: &str,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError> {
        let data: CollectionData = self
            .execute(
                "collectionByIdentifier",
                COLLECTION_PRODUCTS_QUERY,
                json!({ "handle": handle, "first": self.page_size, "after": after }),
            )
            .await?;

        let collection =
            data.collection_by_identifier
                .ok_or_else(|| CatalogError::CollectionNotFound {
                    handle: handle.to_owned(),
                })?;
        Ok(into_page(collection.products))
    }
}

fn into_page(connection: Connection<ProductNode>) -> Page<CatalogProduct> {
    let page_info = connection.page_info.clone();
    Page {
        items: connection.into_nodes().map(normalize_product).collect(),
        page_info,
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn products_page(
        &self,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError> {
        self.fetch_products_page(after).await
    }

    async fn collection_products_page(
        &self,
        handle: &str,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError> {
        self.fetch_collection_products_page(handle, after).await
    }
}
