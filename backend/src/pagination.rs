//! Paging query parameters and page arithmetic shared by the report endpoints.

use serde::Deserialize;

/// Default page number (1-indexed for API consumers)
pub const DEFAULT_PAGE: i64 = 1;
/// Page size of the lightweight, company and visitor reports when omitted
pub const DEFAULT_PAGE_SIZE: i64 = 50;
/// Upper bound for the lightweight case report
pub const MAX_LIGHT_PAGE_SIZE: i64 = 100;

/// `?filter=&page=&pageSize=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_page")]
    pub page: i64,
    pub page_size: Option<i64>,
}

/// `?page=&pageSize=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    pub page_size: Option<i64>,
}

fn default_filter() -> String {
    "all".to_string()
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            page: DEFAULT_PAGE,
            page_size: None,
        }
    }
}

impl ReportParams {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Requested size, or `None` for "every matching row".
    pub fn requested_page_size(&self) -> Option<i64> {
        self.page_size.filter(|size| *size > 0)
    }

    pub fn page_size_or(&self, default: i64) -> i64 {
        self.requested_page_size().unwrap_or(default)
    }

    pub fn clamped_page_size(&self, default: i64, max: i64) -> i64 {
        self.page_size_or(default).clamp(1, max)
    }
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// `ceil(total / page_size)`; zero when there is nothing to page over.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

/// Page size reported back when the caller asked for every row: the number
/// of rows actually returned.
pub fn effective_page_size(requested: Option<i64>, returned: usize) -> i64 {
    requested.unwrap_or(returned as i64)
}
