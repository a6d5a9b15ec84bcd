// ABOUTME: Page/limit handling for the order and product list endpoints
// ABOUTME: Normalizes query values once, derives SQL limit/offset and builds the list envelope

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

pub const MAX_PAGE_SIZE: i64 = 100;

pub const MIN_PAGE: i64 = 1;

/// Highest page a client can request. Any page past it is treated as this
/// one, which keeps `offset` representable for every page size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Page window for a list query. Values are clamped when the window is
/// built, so every accessor is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    page: i64,
    limit: i64,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(MIN_PAGE).clamp(MIN_PAGE, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page - MIN_PAGE).saturating_mul(self.limit)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let page_size = params.limit();
        let total_items = total_items.max(0);
        let total_pages = total_items / page_size + i64::from(total_items % page_size != 0);

        Self {
            page: params.page(),
            page_size,
            total_items,
            total_pages,
            has_next_page: params.page() < total_pages,
            has_previous_page: params.page() > MIN_PAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[rstest]
    #[case(Some(-3), Some(500), 1, MAX_PAGE_SIZE)]
    #[case(Some(2), Some(0), 2, 1)]
    #[case(Some(0), Some(-10), 1, 1)]
    #[case(Some(i64::MAX), None, MAX_PAGE, DEFAULT_PAGE_SIZE)]
    #[case(Some(i64::MIN), Some(i64::MAX), 1, MAX_PAGE_SIZE)]
    fn test_out_of_range_values_are_clamped(
        #[case] page: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected_page: i64,
        #[case] expected_limit: i64,
    ) {
        let params = PaginationParams::new(page, limit);
        assert_eq!(params.page(), expected_page);
        assert_eq!(params.limit(), expected_limit);
    }

    #[test]
    fn test_offset_follows_page() {
        assert_eq!(PaginationParams::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(PaginationParams::new(Some(2), Some(0)).offset(), 1);
    }

    #[test]
    fn test_last_representable_page_has_finite_offset() {
        let params = PaginationParams::new(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(params.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
        assert!(params.offset() > 0);

        let meta = PaginationMeta::new(&params, 3);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next_page);
        assert!(meta.has_previous_page);
    }

    #[test]
    fn test_meta_for_partial_last_page() {
        let meta = PaginationMeta::new(&PaginationParams::new(Some(3), Some(10)), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next_page);
        assert!(meta.has_previous_page);

        let empty = PaginationMeta::new(&PaginationParams::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
    }

    #[test]
    fn test_meta_with_huge_total_does_not_overflow() {
        let meta = PaginationMeta::new(&PaginationParams::new(None, Some(MAX_PAGE_SIZE)), i64::MAX);
        assert_eq!(meta.total_pages, i64::MAX / MAX_PAGE_SIZE + 1);
        assert!(meta.has_next_page);
    }
}
