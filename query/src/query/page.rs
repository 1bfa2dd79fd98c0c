//! Paging conversion
//!
//! Normalizes page, limit and sort parameters into a MongoDB sort document,
//! a limit and a skip count.

use bson::Document;

use super::condition::PRIMARY_KEY;
use super::types::Params;

/// Default upper bound for rows per page
pub const DEFAULT_MAX_LIMIT: i64 = 1000;

/// Lowest accepted upper bound for rows per page
pub const MIN_MAX_LIMIT: i64 = 10;

/// Rows per page for [`Page::default_page`]
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Paging limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    max_limit: i64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl PageOptions {
    /// Set the maximum rows per page, never below [`MIN_MAX_LIMIT`]
    pub fn with_max_limit(mut self, max_limit: i64) -> Self {
        self.max_limit = max_limit.max(MIN_MAX_LIMIT);
        self
    }

    pub fn max_limit(&self) -> i64 {
        self.max_limit
    }
}

/// Normalized paging parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    page: i64,
    limit: i64,
    sort: Document,
}

impl Page {
    /// Normalize raw paging input
    ///
    /// Negative pages become 0; a limit outside `1..=max_limit` becomes
    /// `max_limit`.
    pub fn new(page: i64, limit: i64, sort: &str, options: &PageOptions) -> Self {
        let limit = if limit < 1 || limit > options.max_limit {
            options.max_limit
        } else {
            limit
        };
        Self {
            page: page.max(0),
            limit,
            sort: parse_sort(sort),
        }
    }

    /// Page of 20 rows, newest first
    pub fn default_page(page: i64) -> Self {
        Self {
            page: page.max(0),
            limit: DEFAULT_PAGE_LIMIT,
            sort: default_sort(),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn sort(&self) -> &Document {
        &self.sort
    }

    /// Rows to skip; saturates at `i64::MAX` for huge pages
    pub fn skip(&self) -> i64 {
        self.page.saturating_mul(self.limit)
    }
}

fn default_sort() -> Document {
    let mut doc = Document::new();
    doc.insert(PRIMARY_KEY, -1_i32);
    doc
}

/// Parse `"-created_at,name"` style sort lists
///
/// Spaces are ignored, `-` marks descending order and `id` maps to the
/// primary key. An empty list sorts by primary key, descending.
pub fn parse_sort(columns: &str) -> Document {
    let columns: String = columns.chars().filter(|c| *c != ' ').collect();
    let mut doc = Document::new();

    for name in columns.split(',').filter(|name| !name.is_empty()) {
        let (field, direction) = match name.strip_prefix('-') {
            Some(field) if !field.is_empty() => (field, -1_i32),
            _ => (name, 1_i32),
        };
        let field = if field == "id" { PRIMARY_KEY } else { field };
        doc.insert(field, direction);
    }

    if doc.is_empty() {
        return default_sort();
    }
    doc
}

/// Sort, limit and skip ready for a find call
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    pub sort: Document,
    pub limit: i64,
    pub skip: i64,
}

impl Params {
    /// Convert page, limit and sort into find options
    pub fn convert_to_page(&self, options: &PageOptions) -> PageSpec {
        let page = Page::new(self.page, self.effective_limit(), &self.sort, options);
        tracing::debug!(
            page = page.page(),
            limit = page.limit(),
            sort = %page.sort(),
            "Converted paging parameters"
        );
        PageSpec {
            skip: page.skip(),
            limit: page.limit(),
            sort: page.sort,
        }
    }
}
