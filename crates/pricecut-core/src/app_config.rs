use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub shopify_store: String,
    pub shopify_api_version: String,
    pub shopify_access_token: String,
    /// Full GraphQL endpoint; derived from store and API version unless overridden.
    pub graphql_endpoint: String,
    pub discounts_path: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_page_delay_ms: u64,
    pub max_concurrent_rules: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shopify_store", &self.shopify_store)
            .field("shopify_api_version", &self.shopify_api_version)
            .field("shopify_access_token", &"[redacted]")
            .field("graphql_endpoint", &self.graphql_endpoint)
            .field("discounts_path", &self.discounts_path)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_page_delay_ms", &self.inter_page_delay_ms)
            .field("max_concurrent_rules", &self.max_concurrent_rules)
            .finish()
    }
}
