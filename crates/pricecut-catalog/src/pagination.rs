//! Cursor-based pagination over Admin API connections.
//!
//! A connection page carries `pageInfo { hasNextPage endCursor }`. The walker
//! requests the first page with no cursor, hands every item to a visitor, and
//! follows `endCursor` until `hasNextPage` is false. Each page's cursor comes
//! from the previous response, so pages are fetched strictly in sequence.
//!
//! Items go to the visitor as soon as their page arrives. If a later page
//! fails, whatever the visitor accumulated from earlier pages is still in the
//! caller's hands; the walker itself only returns the error.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;
use crate::types::PageInfo;

/// Default guard against cursors that never terminate.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// One page of a paginated query.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

/// Counts from a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: usize,
    /// Items handed to the visitor, regardless of what the visitor kept.
    pub items: usize,
}

#[derive(Debug, Clone)]
pub struct PageWalker {
    max_pages: usize,
    inter_page_delay: Duration,
}

impl Default for PageWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES, 0)
    }
}

impl PageWalker {
    /// `inter_page_delay_ms` is slept before every page except the first.
    #[must_use]
    pub fn new(max_pages: usize, inter_page_delay_ms: u64) -> Self {
        Self {
            max_pages: max_pages.max(1),
            inter_page_delay: Duration::from_millis(inter_page_delay_ms),
        }
    }

    /// Walks every page, calling `visit` once per item in page order.
    ///
    /// Termination is decided by `hasNextPage` alone. An empty page, or a page
    /// whose items the visitor discards, does not end the walk.
    ///
    /// # Errors
    ///
    /// - Propagates any error from `fetch_page` unchanged (retrying is the
    ///   fetcher's job, not the walker's).
    /// - [`CatalogError::MissingCursor`] if a page claims more results but has
    ///   no `endCursor`.
    /// - [`CatalogError::PaginationLimit`] if more than `max_pages` pages are
    ///   requested.
    pub async fn walk<T, F, Fut, V>(
        &self,
        context: &str,
        mut fetch_page: F,
        mut visit: V,
    ) -> Result<WalkSummary, CatalogError>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Page<T>, CatalogError>>,
        V: FnMut(T),
    {
        let mut summary = WalkSummary::default();
        let mut cursor: Option<String> = None;

        loop {
            if summary.pages >= self.max_pages {
                return Err(CatalogError::PaginationLimit {
                    context: context.to_owned(),
                    max_pages: self.max_pages,
                });
            }

            if summary.pages > 0 && !self.inter_page_delay.is_zero() {
                tokio::time::sleep(self.inter_page_delay).await;
            }

            let page = fetch_page(cursor.take()).await?;
            summary.pages += 1;
            summary.items += page.items.len();

            for item in page.items {
                visit(item);
            }

            if !page.page_info.has_next_page {
                break;
            }

            match page.page_info.end_cursor {
                Some(next) => {
                    tracing::debug!(context, page = summary.pages, cursor = %next, "fetching next page");
                    cursor = Some(next);
                }
                None => {
                    return Err(CatalogError::MissingCursor {
                        context: context.to_owned(),
                    });
                }
            }
        }

        Ok(summary)
    }
}
