use crate::app_config::AppConfig;
use crate::ConfigError;

/// Shopify caps connection page size at 250 nodes.
const MAX_PAGE_SIZE: u32 = 250;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let shopify_store = require("SHOPIFY_STORE")?;
    let shopify_access_token = require("SHOPIFY_ACCESS_TOKEN")?;
    let shopify_api_version = or_default("SHOPIFY_ADMIN_API_VERSION", "2024-10");

    let graphql_endpoint = lookup("PRICECUT_GRAPHQL_ENDPOINT")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| admin_graphql_endpoint(&shopify_store, &shopify_api_version));

    let discounts_path = PathBuf::from(or_default(
        "PRICECUT_DISCOUNTS_PATH",
        "./config/discounts.yaml",
    ));
    let output_dir = PathBuf::from(or_default("PRICECUT_OUTPUT_DIR", "./output"));
    let log_level = or_default("PRICECUT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("PRICECUT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRICECUT_USER_AGENT", "pricecut/0.1 (discount-generator)");

    let page_size = parse_u32("PRICECUT_PAGE_SIZE", "250")?;
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICECUT_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
        });
    }

    let max_retries = parse_u32("PRICECUT_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("PRICECUT_RETRY_BACKOFF_BASE_MS", "2000")?;
    let inter_page_delay_ms = parse_u64("PRICECUT_INTER_PAGE_DELAY_MS", "0")?;
    let max_concurrent_rules = parse_usize("PRICECUT_MAX_CONCURRENT_RULES", "4")?.max(1);

    Ok(AppConfig {
        shopify_store,
        shopify_api_version,
        shopify_access_token,
        graphql_endpoint,
        discounts_path,
        output_dir,
        log_level,
        request_timeout_secs,
        user_agent,
        page_size,
        max_retries,
        retry_backoff_base_ms,
        inter_page_delay_ms,
        max_concurrent_rules,
    })
}

/// Admin GraphQL endpoint for a store subdomain, e.g.
/// `https://acme.myshopify.com/admin/api/2024-10/graphql.json`.
///
/// A store given as a full `*.myshopify.com` host is accepted as-is.
fn admin_graphql_endpoint(store: &str, api_version: &str) -> String {
    let store = store
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    let host = if store.ends_with(".myshopify.com") {
        store.to_string()
    } else {
        format!("{store}.myshopify.com")
    };
    format!("https://{host}/admin/api/{api_version}/graphql.json")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
