//! Page/limit pagination shared by list endpoints and stores.

use serde::Serialize;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Requested page window. `page` is 1-based. Built through [`Self::new`]
/// only, which keeps `limit` nonzero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageParams {
    page: u64,
    limit: u64,
}

impl PageParams {
    /// Clamp raw query input into a sane window: page >= 1, 1 <= limit <= 100.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the counters list endpoints must return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Slice an already-ordered full result set into the requested window.
    pub fn slice(all: Vec<T>, params: PageParams) -> Self {
        let total_items = all.len() as u64;
        let total_pages = total_items.div_ceil(params.limit);
        let start = (params.page - 1).saturating_mul(params.limit) as usize;

        let items = if start >= all.len() {
            Vec::new()
        } else {
            let end = (start + params.limit as usize).min(all.len());
            all.into_iter().skip(start).take(end - start).collect()
        };

        Self {
            items,
            current_page: params.page,
            total_pages,
            total_items,
        }
    }
}
