use serde::{Deserialize, Serialize};

/// Requested page of a list query. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    /// Build a request, clamping `page` and `limit` to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Pagination metadata for the most recently applied page.
///
/// `has_next`/`has_prev` are always derived from `page` and `total_pages`,
/// and `item_count` counts the items of the last fetched page only, never
/// the accumulated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCursor {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    pub item_count: usize,
}

impl PaginationCursor {
    /// Cursor whose page count is derived from `total` and `limit`.
    pub fn new(page: u32, limit: u32, total: u64, item_count: usize) -> Self {
        Self::with_total_pages(page, limit, total, total_pages(total, limit), item_count)
    }

    /// Cursor with an explicit page count (as reported by the backend).
    pub fn with_total_pages(
        page: u32,
        limit: u32,
        total: u64,
        total_pages: u32,
        item_count: usize,
    ) -> Self {
        let page = page.max(1);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
            item_count,
        }
    }

    /// Move to a newly fetched page of the same query (append mode).
    ///
    /// The page size stays as is; position, totals and item count follow `next`.
    pub fn advance_to(&mut self, next: &PaginationCursor) {
        self.page = next.page;
        self.total = next.total;
        self.total_pages = next.total_pages;
        self.has_next = next.has_next;
        self.has_prev = next.has_prev;
        self.item_count = next.item_count;
    }

    /// Reflect a local insert (`+1`) or removal (`-1`) in `total`.
    pub fn adjust_total(&mut self, delta: i64) {
        self.total = if delta.is_negative() {
            self.total.saturating_sub(delta.unsigned_abs())
        } else {
            self.total.saturating_add(delta.unsigned_abs())
        };
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// One normalized page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: PaginationCursor,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: PaginationCursor) -> Self {
        Self { items, cursor }
    }
}

fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_flags_follow_page_position() {
        let first = PaginationCursor::new(1, 20, 60, 20);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = PaginationCursor::new(3, 20, 60, 20);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn partial_last_page_rounds_up() {
        let cursor = PaginationCursor::new(1, 20, 41, 20);
        assert_eq!(cursor.total_pages, 3);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let cursor = PaginationCursor::new(1, 20, 0, 0);
        assert_eq!(cursor.total_pages, 0);
        assert!(!cursor.has_next);
        assert!(!cursor.has_prev);
    }

    #[test]
    fn advance_keeps_limit() {
        let mut cursor = PaginationCursor::new(1, 20, 60, 20);
        cursor.advance_to(&PaginationCursor::new(2, 50, 61, 20));
        assert_eq!(cursor.page, 2);
        assert_eq!(cursor.limit, 20);
        assert_eq!(cursor.total, 61);
        assert!(cursor.has_prev);
    }

    #[test]
    fn adjust_total_saturates() {
        let mut cursor = PaginationCursor::new(1, 20, 1, 1);
        cursor.adjust_total(-1);
        cursor.adjust_total(-1);
        assert_eq!(cursor.total, 0);
        cursor.adjust_total(2);
        assert_eq!(cursor.total, 2);
    }

    #[test]
    fn page_request_clamps_and_advances() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req, PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::first(10).next().page, 2);
    }
}
