// Shelter Admin - Administrative core for an animal-shelter platform
// Copyright (C) 2025 Shelter Admin Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::ApiError;

/// Page sizes offered by the tables
pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 20];
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// Zero-based page cursor over an in-memory list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    page: usize,
    rows_per_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl Paginator {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// `ceil(len / rows_per_page)`; zero for an empty list
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.rows_per_page)
    }

    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = (self.page * self.rows_per_page).min(len);
        let end = (start + self.rows_per_page).min(len);
        start..end
    }

    pub fn next(&mut self, len: usize) {
        if self.page + 1 < self.total_pages(len) {
            self.page += 1;
        }
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Jump to a page, clamped to the last one
    pub fn go_to(&mut self, page: usize, len: usize) {
        self.page = page.min(self.last_page(len));
    }

    /// Change the page size; always returns to the first page
    pub fn set_rows_per_page(&mut self, rows: usize) -> Result<(), ApiError> {
        if !ROWS_PER_PAGE_OPTIONS.contains(&rows) {
            return Err(ApiError::Validation(format!(
                "Filas por página inválidas: {rows}"
            )));
        }
        self.rows_per_page = rows;
        self.page = 0;
        Ok(())
    }

    /// Keep the cursor valid after the list shrank
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.min(self.last_page(len));
    }

    fn last_page(&self, len: usize) -> usize {
        self.total_pages(len).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math() {
        let pager = Paginator::default();
        assert_eq!(pager.total_pages(0), 0);
        assert_eq!(pager.total_pages(10), 1);
        assert_eq!(pager.total_pages(11), 2);
        assert_eq!(pager.visible_range(25), 0..10);
        assert_eq!(pager.visible_range(0), 0..0);
    }

    #[test]
    fn next_and_prev_clamp() {
        let mut pager = Paginator::default();
        pager.prev();
        assert_eq!(pager.page(), 0);

        pager.next(25);
        pager.next(25);
        pager.next(25);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.visible_range(25), 20..25);
    }

    #[test]
    fn changing_rows_resets_page() {
        let mut pager = Paginator::default();
        pager.next(30);
        pager.set_rows_per_page(5).unwrap();
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.total_pages(30), 6);
        assert!(pager.set_rows_per_page(7).is_err());
        assert_eq!(pager.rows_per_page(), 5);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut pager = Paginator::default();
        pager.go_to(9, 45);
        assert_eq!(pager.page(), 4);
        pager.clamp(12);
        assert_eq!(pager.page(), 1);
        pager.clamp(0);
        assert_eq!(pager.page(), 0);
    }
}
