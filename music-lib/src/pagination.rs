//! Pagination for song listings
//!
//! `limit` and `page` arrive from the query string and are never trusted:
//! absent or non-positive values fall back to defaults before they reach SQL.

/// Rows per page when none requested
pub const DEFAULT_LIMIT: i64 = 20;
/// First page (1-indexed)
pub const DEFAULT_PAGE: i64 = 1;

/// Sanitized pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Rows per page, at least 1
    pub limit: i64,
    /// Page number (1-indexed)
    pub page: i64,
}

impl Pagination {
    /// Build pagination from raw request values
    ///
    /// # Examples
    /// ```
    /// use music_lib::pagination::Pagination;
    ///
    /// let p = Pagination::new(Some(2), Some(3));
    /// assert_eq!(p.offset(), 4);
    ///
    /// // Non-positive values get defaulted
    /// let p = Pagination::new(Some(0), Some(-1));
    /// assert_eq!((p.limit, p.page), (20, 1));
    /// ```
    pub fn new(limit: Option<i64>, page: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l,
            _ => DEFAULT_LIMIT,
        };
        let page = match page {
            Some(p) if p > 0 => p,
            _ => DEFAULT_PAGE,
        };

        Self { limit, page }
    }

    /// Offset for SQL LIMIT/OFFSET: `limit * (page - 1)`
    pub fn offset(&self) -> i64 {
        self.limit.saturating_mul(self.page - 1)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::new(None, None);
        assert_eq!(p.limit, DEFAULT_LIMIT);
        assert_eq!(p.page, DEFAULT_PAGE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_second_page() {
        let p = Pagination::new(Some(2), Some(2));
        assert_eq!(p.offset(), 2);
    }

    #[test]
    fn test_pagination_non_positive_values() {
        let p = Pagination::new(Some(-5), Some(0));
        assert_eq!(p.limit, DEFAULT_LIMIT);
        assert_eq!(p.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_pagination_large_limit_kept() {
        let p = Pagination::new(Some(200), Some(2));
        assert_eq!(p.limit, 200);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn test_pagination_huge_page_saturates() {
        let p = Pagination::new(Some(100), Some(i64::MAX));
        assert_eq!(p.offset(), i64::MAX);
    }
}
