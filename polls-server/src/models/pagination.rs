//! Pagination types
//!
//! Pages are 0-indexed. Out-of-range input is rejected rather than clamped:
//! a listing asked for page -1 or size 500 fails validation.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Largest page size accepted unless configured otherwise
pub const MAX_PAGE_SIZE: u32 = 50;

/// Page size bounds applied to every listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Validated pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (0-indexed)
    pub page: u32,
    /// Items per page
    pub size: u32,
}

impl PageRequest {
    /// Create a page request, failing if `page < 0` or `size` is outside
    /// `1..=max_size`.
    pub fn new(page: i64, size: i64, max_size: u32) -> Result<Self, ValidationError> {
        if page < 0 || page > i64::from(u32::MAX) {
            return Err(ValidationError::OutOfRange {
                field: "page",
                min: 0,
                max: i64::from(u32::MAX),
                value: page,
            });
        }

        if size < 1 || size > i64::from(max_size) {
            return Err(ValidationError::OutOfRange {
                field: "size",
                min: 1,
                max: i64::from(max_size),
                value: size,
            });
        }

        Ok(Self {
            page: page as u32,
            size: size as u32,
        })
    }

    /// Build from query parameters, filling in defaults.
    pub fn from_params(params: PaginationParams, limits: PageLimits) -> Result<Self, ValidationError> {
        Self::new(
            params.page.unwrap_or(0),
            params.size.unwrap_or(i64::from(limits.default_size)),
            limits.max_size,
        )
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.size
    }
}

/// One page of store results plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Paginated response wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    /// Items for current page
    pub content: Vec<T>,
    /// Current page number (0-indexed)
    pub page: u32,
    /// Effective page size
    pub size: u32,
    /// Total count across all pages
    pub total_elements: i64,
    /// Number of pages at this size
    pub total_pages: u32,
    /// Whether this page is the last one
    pub last: bool,
}

impl<T> PagedResponse<T> {
    pub fn new(content: Vec<T>, total_elements: i64, request: PageRequest) -> Self {
        let total = total_elements.max(0) as u64;
        let size = u64::from(request.size);
        let total_pages = total.div_ceil(size).min(u64::from(u32::MAX)) as u32;
        let last = request.offset() + content.len() as u64 >= total;

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            last,
        }
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(len: usize, total: i64, page: u32, size: u32) -> PagedResponse<()> {
        PagedResponse::new(vec![(); len], total, PageRequest { page, size })
    }

    #[test]
    fn offset_calculation() {
        let p = PageRequest::new(0, 10, 50).unwrap();
        assert_eq!(p.offset(), 0);

        let p = PageRequest::new(1, 10, 50).unwrap();
        assert_eq!(p.offset(), 10);

        let p = PageRequest::new(2, 25, 50).unwrap();
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn rejects_negative_page() {
        let err = PageRequest::new(-1, 4, 50).unwrap_err();
        assert_eq!(err.field(), "page");
    }

    #[test]
    fn rejects_size_out_of_range() {
        let err = PageRequest::new(2, 55, 50).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "size", .. }));

        let err = PageRequest::new(0, 0, 50).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "size", .. }));

        assert!(PageRequest::new(0, 50, 50).is_ok());
    }

    #[test]
    fn defaults_from_params() {
        let p = PageRequest::from_params(PaginationParams::default(), PageLimits::default()).unwrap();
        assert_eq!(p, PageRequest { page: 0, size: 30 });
    }

    #[test]
    fn total_pages() {
        assert_eq!(paged(0, 0, 0, 10).total_pages, 0);
        assert_eq!(paged(10, 25, 0, 10).total_pages, 3);
        assert_eq!(paged(10, 100, 0, 10).total_pages, 10);
    }

    #[test]
    fn last_flag() {
        assert!(!paged(10, 30, 0, 10).last);
        assert!(!paged(10, 30, 1, 10).last);
        assert!(paged(10, 30, 2, 10).last);
        assert!(paged(0, 0, 0, 10).last);
    }

    #[test]
    fn page_past_the_end_keeps_total() {
        let p = paged(0, 3, 2, 3);
        assert!(p.content.is_empty());
        assert_eq!(p.total_elements, 3);
        assert_eq!(p.total_pages, 1);
        assert!(p.last);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(paged(1, 1, 0, 5)).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["last"], true);
        assert_eq!(json["size"], 5);
    }
}
