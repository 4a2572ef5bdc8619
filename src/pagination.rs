/// Pagination stage of the table pipeline.
///
/// Pages are 1-based. Nothing here clamps the current page: a page past the
/// end simply yields an empty slice, and callers navigate with the
/// `has_next_page` / `has_previous_page` guards.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of pages needed for `total_rows`; zero when there are no rows.
pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_rows.div_ceil(page_size)
}

/// Positions of `current_page` within `total_rows`, clipped to the data.
pub fn page_range(total_rows: usize, current_page: usize, page_size: usize) -> Range<usize> {
    let start = current_page.saturating_sub(1).saturating_mul(page_size);
    let end = current_page.saturating_mul(page_size);
    // page 0 is out of range on both ends
    if current_page == 0 || start >= total_rows {
        return total_rows..total_rows;
    }
    start..end.min(total_rows)
}

/// Summary of the current page for pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    /// 1-based index of the first visible row, 0 when the page is empty
    pub start_row: usize,
    /// 1-based index of the last visible row, 0 when the page is empty
    pub end_row: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    pub fn new(total_rows: usize, current_page: usize, page_size: usize) -> Self {
        let pages = total_pages(total_rows, page_size);
        let range = page_range(total_rows, current_page, page_size);
        let (start_row, end_row) = if range.is_empty() {
            (0, 0)
        } else {
            (range.start + 1, range.end)
        };

        PageInfo {
            current_page,
            page_size,
            total_pages: pages,
            total_rows,
            start_row,
            end_row,
            has_next_page: current_page < pages,
            has_previous_page: current_page > 1,
        }
    }

    /// Rows on this page.
    pub fn len(&self) -> usize {
        if self.start_row == 0 {
            0
        } else {
            self.end_row - self.start_row + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
