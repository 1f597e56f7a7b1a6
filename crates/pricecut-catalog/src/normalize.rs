//! Normalization from GraphQL node types to [`pricecut_core::CatalogProduct`].

use pricecut_core::{CatalogProduct, CatalogVariant, CollectionRef};

use crate::types::{ProductNode, VariantNode};

/// Flattens a [`ProductNode`] and its nested connections.
///
/// Products from the collection-scoped query carry no collection
/// memberships; they normalize with an empty `collections` list.
#[must_use]
pub fn normalize_product(node: ProductNode) -> CatalogProduct {
    let collections = node
        .collections
        .map(|conn| {
            conn.into_nodes()
                .map(|c| CollectionRef {
                    id: c.id,
                    handle: c.handle,
                })
                .collect()
        })
        .unwrap_or_default();

    let variants = node.variants.into_nodes().map(normalize_variant).collect();

    CatalogProduct {
        id: node.id,
        title: node.title,
        product_type: node.product_type,
        vendor: node.vendor,
        collections,
        variants,
    }
}

fn normalize_variant(node: VariantNode) -> CatalogVariant {
    // Blank SKUs are as good as none downstream.
    let sku = node
        .sku
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    CatalogVariant {
        id: node.id,
        sku,
        price: node.price,
        compare_at_price: node.compare_at_price,
        excluded_from_discounts: node
            .excluded_from_discounts
            .as_ref()
            .is_some_and(|m| m.is_true()),
    }
}
