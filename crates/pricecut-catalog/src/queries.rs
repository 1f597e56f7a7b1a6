//! GraphQL documents sent to the Admin API.
//!
//! Both queries select the same product and variant fields so they normalize
//! through one path. The two metafield aliases are the side-channel
//! annotations the discount pipeline reads.

/// Full catalog, ordered by ID so cursors stay stable across a run.
pub const PRODUCTS_QUERY: &str = r#"
query products($first: Int!, $after: String) {
  products(first: $first, after: $after, sortKey: ID, reverse: false) {
    pageInfo {
      endCursor
      hasNextPage
    }
    edges {
      node {
        id
        title
        productType
        vendor
        collections(first: 250) {
          edges {
            node {
              id
              handle
            }
          }
        }
        variants(first: 250) {
          edges {
            node {
              id
              sku
              price
              compareAtPrice
              excludeOnline: metafield(namespace: "debut", key: "exclude_variant_online") {
                id
                value
              }
              excludedFromDiscounts: metafield(namespace: "suavecito_function", key: "exclude_from_all_discounts") {
                id
                value
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Products of one collection, looked up by handle.
pub const COLLECTION_PRODUCTS_QUERY: &str = r#"
query collectionByIdentifier($handle: String!, $first: Int!, $after: String) {
  collectionByIdentifier(identifier: { handle: $handle }) {
    id
    handle
    products(first: $first, after: $after) {
      pageInfo {
        endCursor
        hasNextPage
      }
      edges {
        node {
          id
          title
          productType
          vendor
          variants(first: 250) {
            edges {
              node {
                id
                sku
                price
                compareAtPrice
                excludeOnline: metafield(namespace: "debut", key: "exclude_variant_online") {
                  id
                  value
                }
                excludedFromDiscounts: metafield(namespace: "suavecito_function", key: "exclude_from_all_discounts") {
                  id
                  value
                }
              }
            }
          }
        }
      }
    }
  }
}
"#;
