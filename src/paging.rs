// src/paging.rs

use serde::Serialize;

use crate::error::ApiError;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(
        page: Option<usize>,
        per_page: Option<usize>,
        default_per_page: usize,
        max_per_page: usize,
    ) -> Result<Self, ApiError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(default_per_page);
        if page == 0 {
            return Err(ApiError::InvalidQuery("page starts at 1".into()));
        }
        if per_page == 0 || per_page > max_per_page {
            return Err(ApiError::InvalidQuery(format!(
                "per_page must be between 1 and {max_per_page}"
            )));
        }
        Ok(Self { page, per_page })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

/// Slice one page out of `items`. A page past the end is empty but keeps the totals.
pub fn paginate<T>(items: Vec<T>, req: PageRequest) -> Page<T> {
    let total = items.len();
    let total_pages = total.div_ceil(req.per_page);
    let start = (req.page - 1).saturating_mul(req.per_page);
    let items = items.into_iter().skip(start).take(req.per_page).collect();
    Page {
        total,
        page: req.page,
        per_page: req.per_page,
        total_pages,
        items,
    }
}
