// src/services/pagination.rs
//
// Sequential page loop over a list-returning endpoint.
//
// - Pages are requested in order, one at a time, starting at 1
// - A short page ends the loop (last page)
// - The provider's declared total and a hard page cap also end it
// - A failing page ends the loop; what was already fetched is kept

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::Page;
use crate::error::{AppError, AppResult};

/// Items per full page on the metadata provider
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Page cap bounding the cost of a single listing
pub const DEFAULT_MAX_PAGES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    /// Item count of a full page; fewer means last page
    pub page_size: usize,
    /// Hard ceiling on pages fetched
    pub max_pages: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Accumulated result of a page loop
#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
    /// Error of the page that stopped the loop, if any
    pub error: Option<AppError>,
}

impl<T> Paginated<T> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Items if every page succeeded. A failure on the first page is an
    /// error; a later failure keeps the partial list and logs it.
    pub fn into_partial_result(self) -> AppResult<Vec<T>> {
        match self.error {
            Some(err) if self.pages_fetched == 0 => Err(err),
            Some(err) => {
                log::warn!(
                    "Pagination stopped after {} page(s): {}",
                    self.pages_fetched,
                    err
                );
                Ok(self.items)
            }
            None => Ok(self.items),
        }
    }
}

/// Fetch pages 1, 2, ... until exhaustion or `limits.max_pages`.
pub async fn fetch_all_pages<T, F, Fut>(limits: PageLimits, mut fetch_page: F) -> Paginated<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AppResult<Page<T>>>,
{
    let mut result = Paginated {
        items: Vec::new(),
        pages_fetched: 0,
        error: None,
    };

    let mut page_index = 1;
    while page_index <= limits.max_pages {
        let page = match fetch_page(page_index).await {
            Ok(page) => page,
            Err(err) => {
                log::warn!("Fetching page {} failed: {}", page_index, err);
                result.error = Some(err);
                break;
            }
        };

        let item_count = page.items.len();
        result.items.extend(page.items);
        result.pages_fetched = page_index;

        let last_declared = page.total_pages.is_some_and(|total| page_index >= total);
        if item_count < limits.page_size || last_declared {
            break;
        }
        page_index += 1;
    }

    log::debug!(
        "Pagination fetched {} page(s), {} item(s)",
        result.pages_fetched,
        result.items.len()
    );
    result
}
