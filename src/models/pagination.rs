//! Pagination types shared by listings, search, and the read API.
//!
//! Out-of-range requests never fail: a missing or unparseable page number
//! resolves to page 1, and a page past the end clamps to the last page.

use serde::{Deserialize, Serialize};

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Total number of pages (at least 1 when there are items)
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Number of pages needed for `total` items at `per_page` each
pub fn total_pages(total: i64, per_page: u32) -> u32 {
    if per_page == 0 || total <= 0 {
        return 1;
    }
    ((total as u64 + per_page as u64 - 1) / per_page as u64) as u32
}

/// Resolve a raw `page` query value against the known page count.
///
/// Absent or non-numeric input resolves to page 1; values past the last page
/// clamp to it. Never errors.
pub fn resolve_page(raw: Option<&str>, total: i64, per_page: u32) -> u32 {
    let last = total_pages(total, per_page);
    match raw.and_then(|s| s.trim().parse::<u32>().ok()) {
        None | Some(0) => 1,
        Some(n) if n > last => last,
        Some(n) => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_page_resolves_to_first() {
        assert_eq!(resolve_page(None, 10, 2), 1);
    }

    #[test]
    fn garbage_page_resolves_to_first() {
        assert_eq!(resolve_page(Some("abc"), 10, 2), 1);
        assert_eq!(resolve_page(Some("-3"), 10, 2), 1);
        assert_eq!(resolve_page(Some(""), 10, 2), 1);
    }

    #[test]
    fn overflow_clamps_to_last_page() {
        // 10 items, 2 per page -> 5 pages
        assert_eq!(resolve_page(Some("99"), 10, 2), 5);
    }

    #[test]
    fn zero_items_still_resolves_to_page_one() {
        assert_eq!(resolve_page(Some("3"), 0, 2), 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(5, 2), 3);
        assert_eq!(total_pages(4, 2), 2);
        assert_eq!(total_pages(0, 2), 1);
    }

    #[test]
    fn paged_result_navigation() {
        let params = ListParams::new(2, 2);
        let result = PagedResult::new(vec![1, 2], 5, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(result.has_prev());
    }

    proptest! {
        // The resolved page is always within [1, total_pages].
        #[test]
        fn prop_resolved_page_in_range(
            raw in proptest::option::of("[0-9a-z]{0,6}"),
            total in 0i64..1000,
            per_page in 1u32..50,
        ) {
            let page = resolve_page(raw.as_deref(), total, per_page);
            prop_assert!(page >= 1);
            prop_assert!(page <= total_pages(total, per_page));
        }

        // Requesting far past the end lands on the same page as the last one.
        #[test]
        fn prop_overflow_equals_last(total in 1i64..500, extra in 1u32..100) {
            let last = total_pages(total, 2);
            let requested = (last + extra).to_string();
            prop_assert_eq!(resolve_page(Some(&requested), total, 2), last);
        }
    }
}
