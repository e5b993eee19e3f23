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

use serde::Serialize;
use serde_json::Value;

use super::{Paginator, Selection};
use crate::error::ApiError;

/// A row that can live in a table
pub trait Row: Serialize + Send + Sync {
    fn id(&self) -> &str;
}

/// What the UI renders for one table
#[derive(Debug, Serialize)]
pub struct TablePage<'a, R> {
    pub rows: &'a [R],
    pub page: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub total_rows: usize,
    pub selected: Vec<String>,
    pub all_visible_selected: bool,
    pub busy: bool,
    /// Rows come from the local snapshot because the backend was unreachable
    pub cached: bool,
}

/// In-memory state of one list screen
#[derive(Debug)]
pub struct TableView<R> {
    rows: Vec<R>,
    paginator: Paginator,
    selection: Selection,
    /// A list fetch is in flight
    busy: bool,
    /// A bulk action owns the selection until it has reloaded the rows
    bulk_running: bool,
    cached: bool,
}

impl<R> Default for TableView<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            paginator: Paginator::default(),
            selection: Selection::default(),
            busy: false,
            bulk_running: false,
            cached: false,
        }
    }
}

impl<R: Row> TableView<R> {
    /// Replace the rows after a fetch. Clears the selection.
    pub fn load(&mut self, rows: Vec<R>, cached: bool) {
        self.rows = rows;
        self.cached = cached;
        self.selection.clear();
        self.paginator.clamp(self.rows.len());
    }

    /// Replace the rows after a bulk action, keeping the ids that are still
    /// selected (the ones whose update failed)
    pub fn reload_keeping_selection(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.cached = false;
        let rows = &self.rows;
        self.selection.retain(|id| rows.iter().any(|r| r.id() == id));
        self.paginator.clamp(self.rows.len());
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn visible(&self) -> &[R] {
        &self.rows[self.paginator.visible_range(self.rows.len())]
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn bulk_running(&self) -> bool {
        self.bulk_running
    }

    /// Claim the table for a bulk action; false when one is already running
    pub fn begin_bulk(&mut self) -> bool {
        !std::mem::replace(&mut self.bulk_running, true)
    }

    pub fn end_bulk(&mut self) {
        self.bulk_running = false;
    }

    fn idle(&self) -> bool {
        !self.busy && !self.bulk_running
    }

    pub fn snapshot(&self) -> TablePage<'_, R> {
        let visible = self.visible();
        TablePage {
            rows: visible,
            page: self.paginator.page(),
            total_pages: self.paginator.total_pages(self.rows.len()),
            rows_per_page: self.paginator.rows_per_page(),
            total_rows: self.rows.len(),
            selected: self.selection.ids(),
            all_visible_selected: self
                .selection
                .all_visible_selected(visible.iter().map(|r| r.id())),
            busy: !self.idle(),
            cached: self.cached,
        }
    }

    fn locked(&self) -> bool {
        !self.idle() || self.rows.is_empty()
    }
}

/// Type-erased table operations, so IPC requests can address a screen by name
pub trait TableControl: Send + Sync {
    fn next_page(&mut self);
    fn prev_page(&mut self);
    fn go_to_page(&mut self, page: usize);
    fn set_rows_per_page(&mut self, rows: usize) -> Result<(), ApiError>;
    fn toggle_one(&mut self, id: &str);
    fn toggle_all_visible(&mut self);
    fn clear_selection(&mut self);
    fn selected_ids(&self) -> Vec<String>;
    fn snapshot_json(&self) -> Result<Value, ApiError>;
}

impl<R: Row> TableControl for TableView<R> {
    fn next_page(&mut self) {
        if self.idle() {
            self.paginator.next(self.rows.len());
        }
    }

    fn prev_page(&mut self) {
        if self.idle() {
            self.paginator.prev();
        }
    }

    fn go_to_page(&mut self, page: usize) {
        if self.idle() {
            self.paginator.go_to(page, self.rows.len());
        }
    }

    fn set_rows_per_page(&mut self, rows: usize) -> Result<(), ApiError> {
        self.paginator.set_rows_per_page(rows)
    }

    fn toggle_one(&mut self, id: &str) {
        if !self.idle() || self.find(id).is_none() {
            return;
        }
        self.selection.toggle_one(id);
    }

    fn toggle_all_visible(&mut self) {
        if self.locked() {
            return;
        }
        let range = self.paginator.visible_range(self.rows.len());
        let visible: Vec<&str> = self.rows[range].iter().map(|r| r.id()).collect();
        self.selection.toggle_all_visible(&visible);
    }

    fn clear_selection(&mut self) {
        if !self.bulk_running {
            self.selection.clear();
        }
    }

    fn selected_ids(&self) -> Vec<String> {
        self.selection.ids()
    }

    fn snapshot_json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::to_value(self.snapshot())?)
    }
}
