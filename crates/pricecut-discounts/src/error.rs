use std::path::PathBuf;

use pricecut_catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscountError {
    /// A rule's catalog walk failed after retries, or with a non-retriable error.
    #[error("catalog fetch failed for rule {code}: {source}")]
    Fetch {
        code: String,
        #[source]
        source: CatalogError,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed variants file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DiscountError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
