use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which part of the catalog a [`DiscountRule`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    /// Store-wide: every product in the catalog.
    All,
    /// Only products in the listed collection handles.
    SpecificCollections,
    /// Reserved by the rule shape; there is no product-type selector yet.
    SpecificProductTypes,
}

impl std::fmt::Display for AppliesTo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppliesTo::All => write!(f, "all"),
            AppliesTo::SpecificCollections => write!(f, "specific_collections"),
            AppliesTo::SpecificProductTypes => write!(f, "specific_product_types"),
        }
    }
}

/// One configured discount. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Discount code stamped onto every variant this rule prices.
    pub code: String,
    /// Percentage off, `0 <= percentage < 100`.
    pub percentage: Decimal,
    pub applies_to: AppliesTo,
    /// Collection handles in processing order. Only meaningful for
    /// [`AppliesTo::SpecificCollections`].
    #[serde(default)]
    pub collections: Option<Vec<String>>,
    #[serde(default)]
    pub excluded_product_types: BTreeSet<String>,
    /// Vendor names as they appear on the catalog product.
    #[serde(default)]
    pub excluded_brands: BTreeSet<String>,
}

impl DiscountRule {
    /// Collection handles for this rule, empty when none are configured.
    #[must_use]
    pub fn collection_handles(&self) -> &[String] {
        self.collections.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_store_wide(&self) -> bool {
        self.applies_to == AppliesTo::All
    }

    #[must_use]
    pub fn is_collection_scoped(&self) -> bool {
        self.applies_to == AppliesTo::SpecificCollections
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountsFile {
    pub discounts: Vec<DiscountRule>,
}

/// Load and validate the discount rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_discounts(path: &Path) -> Result<DiscountsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DiscountsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_discounts(&content)
}

/// Parse and validate discount rules from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_discounts(content: &str) -> Result<DiscountsFile, ConfigError> {
    let discounts_file: DiscountsFile = serde_yaml::from_str(content)?;
    validate_discounts(&discounts_file)?;
    Ok(discounts_file)
}

fn validate_discounts(discounts_file: &DiscountsFile) -> Result<(), ConfigError> {
    let mut seen_codes = HashSet::new();

    for rule in &discounts_file.discounts {
        if rule.code.trim().is_empty() {
            return Err(ConfigError::Validation(
                "discount code must be non-empty".to_string(),
            ));
        }

        if !seen_codes.insert(rule.code.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate discount code: '{}'",
                rule.code
            )));
        }

        // A percentage of 100 or more would price variants at zero or below.
        if rule.percentage < Decimal::ZERO || rule.percentage >= Decimal::ONE_HUNDRED {
            return Err(ConfigError::Validation(format!(
                "discount '{}' has percentage {}; must be at least 0 and below 100",
                rule.code, rule.percentage
            )));
        }

        if rule.collection_handles().iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "discount '{}' lists a blank collection handle",
                rule.code
            )));
        }
    }

    Ok(())
}
