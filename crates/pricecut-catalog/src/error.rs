use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 429, or a GraphQL `THROTTLED` error delivered with HTTP 200.
    #[error("rate limited by catalog API{}", retry_after_suffix(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("HTTP {status} from catalog API: {body}")]
    HttpStatus { status: u16, body: String },

    /// Application-level GraphQL errors: malformed query, access denied, etc.
    #[error("GraphQL error: {messages}")]
    Query { messages: String },

    #[error("catalog API returned no data for {context}")]
    MissingData { context: String },

    #[error("collection not found: {handle}")]
    CollectionNotFound { handle: String },

    #[error("page reported more results but no end cursor for {context}")]
    MissingCursor { context: String },

    #[error("pagination limit reached for {context}: exceeded {max_pages} pages")]
    PaginationLimit { context: String, max_pages: usize },

    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<CatalogError>,
    },

    #[error("invalid GraphQL endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

fn retry_after_suffix(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}
