pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod queries;
mod rate_limit;
pub mod source;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use normalize::normalize_product;
pub use pagination::{Page, PageWalker, WalkSummary};
pub use source::CatalogSource;
pub use types::PageInfo;
