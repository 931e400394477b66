//! Client-side pagination of the filtered list.

use std::ops::Range;

use crate::error::CoreError;

/// Page sizes a user can pick from.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[5, 10, 25, 50];

/// Page size used until the user picks another one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Number of pages needed for `total` items: `ceil(total / page_size)`.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

impl Pagination {
    /// Start with `page_size`, which must be one of [`PAGE_SIZE_OPTIONS`].
    pub fn with_page_size(page_size: usize) -> Result<Self, CoreError> {
        let mut pagination = Self::default();
        pagination.set_page_size(page_size)?;
        Ok(pagination)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Move to `page`, clamped to `[1, max(1, page_count)]`.
    pub fn set_page(&mut self, page: usize, total: usize) {
        let last = page_count(total, self.page_size).max(1);
        self.page = page.clamp(1, last);
    }

    /// Change the page size and go back to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), CoreError> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(CoreError::InvalidPageSize {
                size: page_size,
                allowed: PAGE_SIZE_OPTIONS,
            });
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Re-clamp the current page after the item count changed.
    pub fn clamp(&mut self, total: usize) {
        self.set_page(self.page, total);
    }

    /// Index range of the current page within `total` items.
    pub fn range(&self, total: usize) -> Range<usize> {
        let last = page_count(total, self.page_size).max(1);
        let page = self.page.clamp(1, last);
        let start = ((page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// Slice out the current page of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }
}
