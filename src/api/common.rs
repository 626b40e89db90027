//! Common API utilities and shared types

use serde::Deserialize;

use crate::services::PAGE_SIZE;

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

/// Default page size for the post listing
pub fn default_page_size() -> u32 {
    PAGE_SIZE as u32
}

/// Basic pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl PaginationQuery {
    /// `(limit, offset)` with the page size capped at [`PAGE_SIZE`]
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = i64::from(self.page_size).clamp(1, PAGE_SIZE);
        let page = i64::from(self.page.max(1));
        (limit, (page - 1) * limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset() {
        let query = PaginationQuery { page: 3, page_size: 5 };
        assert_eq!(query.limit_offset(), (5, 10));
    }

    #[test]
    fn test_limit_offset_clamps() {
        let query = PaginationQuery { page: 0, page_size: 500 };
        assert_eq!(query.limit_offset(), (20, 0));
        let query = PaginationQuery { page: 2, page_size: 0 };
        assert_eq!(query.limit_offset(), (1, 1));
    }
}
