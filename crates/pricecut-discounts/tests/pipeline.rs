//! End-to-end tests of the discount pipeline against an in-memory catalog.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pricecut_catalog::{CatalogError, CatalogSource, Page, PageInfo, PageWalker};
use pricecut_core::{
    parse_discounts, CatalogProduct, CatalogVariant, CollectionRef, DiscountRule, DiscountedVariant,
};
use pricecut_discounts::output::{
    generate_to_dir, merge_output_dir, write_variant_files, COLLECTION_VARIANTS_FILE,
    DISCOUNTS_BY_CODE_FILE, DISCOUNTS_FILE, DISCOUNTS_MIN_FILE, PRODUCT_VARIANTS_FILE, SKUS_FILE,
    SKUS_MIN_FILE,
};
use pricecut_discounts::{DiscountError, DiscountOrchestrator};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Fake catalog
// ---------------------------------------------------------------------------

/// Serves fixed products in pages of `page_size`; the cursor is the index of
/// the next product. `fail_at_page` makes the catalog walk fail on that page.
struct FakeCatalog {
    products: Vec<CatalogProduct>,
    collections: HashMap<String, Vec<CatalogProduct>>,
    page_size: usize,
    fail_at_page: Option<usize>,
    catalog_pages_served: AtomicUsize,
}

impl FakeCatalog {
    fn new(products: Vec<CatalogProduct>) -> Self {
        let mut collections: HashMap<String, Vec<CatalogProduct>> = HashMap::new();
        for product in &products {
            for collection in &product.collections {
                collections
                    .entry(collection.handle.clone())
                    .or_default()
                    .push(product.clone());
            }
        }
        Self {
            products,
            collections,
            page_size: 250,
            fail_at_page: None,
            catalog_pages_served: AtomicUsize::new(0),
        }
    }

    fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn failing_at_page(mut self, page: usize) -> Self {
        self.fail_at_page = Some(page);
        self
    }

    fn page_of(&self, items: &[CatalogProduct], after: Option<&str>) -> Page<CatalogProduct> {
        let start: usize = after.map_or(0, |c| c.parse().unwrap());
        let end = (start + self.page_size).min(items.len());
        let has_next_page = end < items.len();
        Page {
            items: items[start..end].to_vec(),
            page_info: PageInfo {
                has_next_page,
                end_cursor: has_next_page.then(|| end.to_string()),
            },
        }
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn products_page(
        &self,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError> {
        let page = self.catalog_pages_served.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at_page == Some(page) {
            return Err(CatalogError::RetriesExhausted {
                attempts: 4,
                last: Box::new(CatalogError::RateLimited {
                    retry_after_secs: None,
                }),
            });
        }
        Ok(self.page_of(&self.products, after))
    }

    async fn collection_products_page(
        &self,
        handle: &str,
        after: Option<&str>,
    ) -> Result<Page<CatalogProduct>, CatalogError> {
        let items = self
            .collections
            .get(handle)
            .ok_or_else(|| CatalogError::CollectionNotFound {
                handle: handle.to_string(),
            })?;
        Ok(self.page_of(items, after))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn variant(sku: &str, price: &str, flagged: bool) -> CatalogVariant {
    CatalogVariant {
        id: format!("gid://shopify/ProductVariant/{sku}"),
        sku: Some(sku.to_string()),
        price: Decimal::from_str(price).unwrap(),
        compare_at_price: None,
        excluded_from_discounts: flagged,
    }
}

fn product(
    id: usize,
    vendor: &str,
    product_type: &str,
    collections: &[&str],
    variants: Vec<CatalogVariant>,
) -> CatalogProduct {
    CatalogProduct {
        id: format!("gid://shopify/Product/{id}"),
        title: format!("Product {id}"),
        product_type: product_type.to_string(),
        vendor: vendor.to_string(),
        collections: collections
            .iter()
            .map(|h| CollectionRef {
                id: format!("gid://shopify/Collection/{h}"),
                handle: (*h).to_string(),
            })
            .collect(),
        variants,
    }
}

fn rules(yaml: &str) -> Vec<DiscountRule> {
    parse_discounts(yaml).unwrap().discounts
}

const PRECEDENCE_RULES: &str = r#"
discounts:
  - code: ALL_20_OFF
    percentage: 20
    applies_to: all
    excluded_product_types: [Clearance]
    excluded_brands: [Gunthers]
  - code: COLLECTIBLES_30_OFF
    percentage: 30
    applies_to: specific_collections
    collections: [collectibles]
"#;

fn precedence_catalog() -> FakeCatalog {
    FakeCatalog::new(vec![
        product(1, "Suavecito", "Pomade", &["collectibles"], vec![variant("COL-1", "20.00", false)]),
        product(2, "Suavecito", "Pomade", &[], vec![variant("POM-1", "19.99", false)]),
        product(3, "Gunthers", "Pomade", &[], vec![variant("GUN-1", "10.00", false)]),
        product(4, "Suavecito", "Clearance", &[], vec![variant("CLR-1", "5.00", false)]),
        product(
            5,
            "Suavecito",
            "Pomade",
            &["collectibles"],
            vec![variant("FLAG-1", "30.00", true), variant("COL-2", "30.00", false)],
        ),
    ])
}

fn skus(variants: &[DiscountedVariant]) -> Vec<&str> {
    variants.iter().map(|v| v.sku.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collection_rule_takes_precedence_over_store_wide_rule() {
    let rules = rules(PRECEDENCE_RULES);
    let catalog = precedence_catalog();

    let run = DiscountOrchestrator::new(&catalog, &rules).run().await.unwrap();

    assert_eq!(skus(&run.collection_variants), vec!["COL-1", "COL-2"]);
    assert!(run
        .collection_variants
        .iter()
        .all(|v| v.code == "COLLECTIBLES_30_OFF"));
    assert_eq!(run.collection_variants[0].discounted_price, Decimal::from(14));

    // Collection products, the excluded brand, and the excluded type are all
    // left out of the store-wide pass.
    assert_eq!(skus(&run.product_variants), vec!["POM-1"]);
    assert_eq!(run.product_variants[0].code, "ALL_20_OFF");
    assert_eq!(
        run.product_variants[0].discounted_price,
        Decimal::from_str("15.99").unwrap()
    );
}

#[tokio::test]
async fn flagged_variant_is_never_discounted() {
    let rules = rules(PRECEDENCE_RULES);
    let catalog = precedence_catalog();

    let run = DiscountOrchestrator::new(&catalog, &rules).run().await.unwrap();

    assert!(run
        .collection_variants
        .iter()
        .chain(&run.product_variants)
        .all(|v| v.sku != "FLAG-1"));
}

#[tokio::test]
async fn walks_every_page_regardless_of_filtering() {
    // 517 products over pages of 250, 250, and 17. Every product on the
    // first page is excluded by brand, so the walk must not stop there.
    let products = (0..517)
        .map(|i| {
            let vendor = if i < 250 { "Gunthers" } else { "Suavecito" };
            product(i, vendor, "Pomade", &[], vec![variant(&format!("SKU-{i}"), "10.00", false)])
        })
        .collect();
    let catalog = FakeCatalog::new(products);
    let rules = rules(
        r#"
discounts:
  - code: ALL_10_OFF
    percentage: 10
    applies_to: all
    excluded_brands: [Gunthers]
"#,
    );

    let run = DiscountOrchestrator::new(&catalog, &rules).run().await.unwrap();

    assert_eq!(catalog.catalog_pages_served.load(Ordering::SeqCst), 3);
    assert_eq!(run.product_variants.len(), 267);
    assert_eq!(run.product_variants[0].sku, "SKU-250");
    assert_eq!(run.product_variants[266].sku, "SKU-516");
}

#[tokio::test]
async fn concurrent_rules_keep_configuration_order() {
    let catalog = FakeCatalog::new(vec![
        product(1, "Suavecito", "Pomade", &["summer"], vec![variant("S-1", "10.00", false)]),
        product(2, "Suavecito", "Pomade", &["winter"], vec![variant("W-1", "10.00", false)]),
    ])
    .with_page_size(1);
    let rules = rules(
        r#"
discounts:
  - code: WINTER
    percentage: 15
    applies_to: specific_collections
    collections: [winter]
  - code: SUMMER
    percentage: 25
    applies_to: specific_collections
    collections: [summer]
"#,
    );

    let run = DiscountOrchestrator::new(&catalog, &rules)
        .with_max_concurrent_rules(2)
        .run()
        .await
        .unwrap();

    let codes: Vec<&str> = run.collection_variants.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(codes, vec!["WINTER", "SUMMER"]);
    assert!(run.product_variants.is_empty());
}

#[tokio::test]
async fn unknown_collection_and_empty_rule_are_skipped() {
    let catalog = precedence_catalog();
    let rules = rules(
        r#"
discounts:
  - code: NOTHING_LISTED
    percentage: 10
    applies_to: specific_collections
  - code: PARTLY_UNKNOWN
    percentage: 30
    applies_to: specific_collections
    collections: [does-not-exist, collectibles]
"#,
    );

    let run = DiscountOrchestrator::new(&catalog, &rules).run().await.unwrap();

    assert_eq!(skus(&run.collection_variants), vec!["COL-1", "COL-2"]);
    assert!(run.collection_variants.iter().all(|v| v.code == "PARTLY_UNKNOWN"));
}

#[tokio::test]
async fn fetch_failure_aborts_run_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    // The collection pass succeeds; the store-wide walk fails on its second page.
    let catalog = precedence_catalog().with_page_size(2).failing_at_page(2);
    let rules = rules(PRECEDENCE_RULES);

    let result = generate_to_dir(&catalog, &rules, PageWalker::new(100, 0), 2, dir.path()).await;

    match result {
        Err(DiscountError::Fetch { code, source }) => {
            assert_eq!(code, "ALL_20_OFF");
            assert!(matches!(source, CatalogError::RetriesExhausted { attempts: 4, .. }));
        }
        other => panic!("expected Fetch error, got: {other:?}"),
    }

    assert!(!dir.path().join(COLLECTION_VARIANTS_FILE).exists());
    assert!(!dir.path().join(PRODUCT_VARIANTS_FILE).exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn successful_generate_writes_both_variant_files() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = precedence_catalog().with_page_size(2);
    let rules = rules(PRECEDENCE_RULES);

    let run = generate_to_dir(&catalog, &rules, PageWalker::new(100, 0), 2, dir.path())
        .await
        .unwrap();

    assert_eq!(run.total(), 3);
    assert!(dir.path().join(COLLECTION_VARIANTS_FILE).exists());
    assert!(dir.path().join(PRODUCT_VARIANTS_FILE).exists());
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_then_payload_produces_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let rules = rules(PRECEDENCE_RULES);
    let catalog = precedence_catalog();

    let run = DiscountOrchestrator::new(&catalog, &rules).run().await.unwrap();
    write_variant_files(dir.path(), &run).await.unwrap();
    let merged = merge_output_dir(dir.path()).await.unwrap();

    assert_eq!(merged.skus(), vec!["COL-1", "COL-2", "POM-1"]);
    assert!(merged.conflicts.is_empty());

    let skus_min = std::fs::read_to_string(dir.path().join(SKUS_MIN_FILE)).unwrap();
    assert_eq!(skus_min, r#"["COL-1","COL-2","POM-1"]"#);

    let discounts: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(DISCOUNTS_FILE)).unwrap())
            .unwrap();
    assert_eq!(
        discounts["POM-1"],
        serde_json::json!({"discountedPrice": 15.99, "code": "ALL_20_OFF"})
    );

    let by_code: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(DISCOUNTS_BY_CODE_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(by_code["COLLECTIBLES_30_OFF"].as_array().unwrap().len(), 2);

    let products: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(PRODUCT_VARIANTS_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(products[0]["sku"], "POM-1");
    assert_eq!(products[0]["type"], "Pomade");
    assert_eq!(products[0]["price"], serde_json::json!(19.99));
}

#[tokio::test]
async fn merge_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let rules = rules(PRECEDENCE_RULES);
    let catalog = precedence_catalog();
    let run = DiscountOrchestrator::new(&catalog, &rules).run().await.unwrap();
    write_variant_files(dir.path(), &run).await.unwrap();

    merge_output_dir(dir.path()).await.unwrap();
    let first = std::fs::read(dir.path().join(DISCOUNTS_FILE)).unwrap();
    let first_min = std::fs::read(dir.path().join(DISCOUNTS_MIN_FILE)).unwrap();

    merge_output_dir(dir.path()).await.unwrap();
    let second = std::fs::read(dir.path().join(DISCOUNTS_FILE)).unwrap();
    let second_min = std::fs::read(dir.path().join(DISCOUNTS_MIN_FILE)).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_min, second_min);
}

#[tokio::test]
async fn duplicate_sku_resolves_to_later_file() {
    let dir = tempfile::tempdir().unwrap();
    let collection = r#"[{"type":"Pomade","brand":"Suavecito","productId":"p1","productTitle":"P","variantId":"v1","sku":"DUP","price":20.0,"compareAtPrice":null,"discountedPrice":14.0,"code":"COLLECTIBLES_30_OFF"}]"#;
    let product = r#"[{"type":"Pomade","brand":"Suavecito","productId":"p1","productTitle":"P","variantId":"v1","sku":"DUP","price":20.0,"compareAtPrice":null,"discountedPrice":16.0,"code":"ALL_20_OFF"}]"#;
    std::fs::write(dir.path().join(COLLECTION_VARIANTS_FILE), collection).unwrap();
    std::fs::write(dir.path().join(PRODUCT_VARIANTS_FILE), product).unwrap();

    let merged = merge_output_dir(dir.path()).await.unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.discounts["DUP"].code, "ALL_20_OFF");
    assert_eq!(merged.conflicts.len(), 1);
    assert_eq!(merged.conflicts[0].previous_code, "COLLECTIBLES_30_OFF");
}

#[tokio::test]
async fn empty_inputs_produce_empty_payload() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(COLLECTION_VARIANTS_FILE), "[]").unwrap();
    std::fs::write(dir.path().join(PRODUCT_VARIANTS_FILE), "[]").unwrap();

    let merged = merge_output_dir(dir.path()).await.unwrap();

    assert!(merged.is_empty());
    assert_eq!(std::fs::read_to_string(dir.path().join(DISCOUNTS_FILE)).unwrap(), "{}");
    assert_eq!(std::fs::read_to_string(dir.path().join(SKUS_FILE)).unwrap(), "[]");
    assert_eq!(std::fs::read_to_string(dir.path().join(SKUS_MIN_FILE)).unwrap(), "[]");
}

#[tokio::test]
async fn missing_inputs_are_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();

    let merged = merge_output_dir(dir.path()).await.unwrap();

    assert!(merged.is_empty());
    assert!(dir.path().join(DISCOUNTS_MIN_FILE).exists());
}
