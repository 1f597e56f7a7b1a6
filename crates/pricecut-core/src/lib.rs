pub mod app_config;
pub mod catalog;
pub mod config;
pub mod discounts;
pub mod variants;

pub use app_config::AppConfig;
pub use catalog::{CatalogProduct, CatalogVariant, CollectionRef};
pub use config::{load_app_config, load_app_config_from_env};
pub use discounts::{load_discounts, parse_discounts, AppliesTo, DiscountRule, DiscountsFile};
pub use variants::{DiscountedVariant, SkuDiscount};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read discounts file {path}: {source}")]
    DiscountsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse discounts file: {0}")]
    DiscountsFileParse(#[from] serde_yaml::Error),

    #[error("invalid discount configuration: {0}")]
    Validation(String),
}
