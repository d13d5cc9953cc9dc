//! Page slicing over a full in-memory list
//!
//! Stores always return complete sets; paging is a view concern.

use serde::Serialize;

/// Favorites per page (a 2x4 grid)
pub const FAVORITES_PAGE_SIZE: usize = 8;

/// One page of a list. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub page: usize,
    /// At least 1, even for an empty list
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

impl<T: Clone> Page<T> {
    /// Slice `all` into the requested page. Out-of-range pages clamp to the
    /// nearest valid page.
    pub fn of(all: &[T], page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);

        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        let items = all.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

        Self {
            page,
            total_pages,
            total_items,
            items,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Items split into rows of `columns`, the last row possibly short
    pub fn rows(&self, columns: usize) -> Vec<Vec<T>> {
        self.items
            .chunks(columns.max(1))
            .map(<[T]>::to_vec)
            .collect()
    }
}
