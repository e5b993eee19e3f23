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

use indexmap::IndexSet;

/// Ids of the rows ticked in a table, in the order they were ticked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn toggle_one(&mut self, id: &str) {
        if !self.ids.shift_remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// True when there is at least one visible row and all of them are ticked
    pub fn all_visible_selected<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for id in visible {
            any = true;
            if !self.ids.contains(id) {
                return false;
            }
        }
        any
    }

    /// Header checkbox: untick the visible rows when all of them are ticked,
    /// otherwise tick them. Rows on other pages keep their state.
    pub fn toggle_all_visible<'a>(&mut self, visible: &[&'a str]) {
        if self.all_visible_selected(visible.iter().copied()) {
            for id in visible {
                self.ids.shift_remove(*id);
            }
        } else {
            self.ids.extend(visible.iter().map(|id| id.to_string()));
        }
    }

    /// Drop ids that are no longer present
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.shift_remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_one_flips() {
        let mut selection = Selection::default();
        selection.toggle_one("a");
        selection.toggle_one("b");
        selection.toggle_one("a");
        assert_eq!(selection.ids(), vec!["b".to_string()]);
    }

    #[test]
    fn ids_keep_click_order() {
        let mut selection = Selection::default();
        for id in ["r2", "r10", "r1"] {
            selection.toggle_one(id);
        }
        assert_eq!(selection.ids(), vec!["r2", "r10", "r1"]);

        selection.remove("r10");
        selection.toggle_one("r10");
        assert_eq!(selection.ids(), vec!["r2", "r1", "r10"]);
    }

    #[test]
    fn header_checkbox_only_touches_visible_rows() {
        let mut selection = Selection::default();
        selection.toggle_one("other-page");

        selection.toggle_all_visible(&["a", "b"]);
        assert!(selection.all_visible_selected(["a", "b"]));
        assert_eq!(selection.ids().len(), 3);

        selection.toggle_all_visible(&["a", "b"]);
        assert_eq!(selection.ids(), vec!["other-page".to_string()]);
    }

    #[test]
    fn partial_page_selects_rest() {
        let mut selection = Selection::default();
        selection.toggle_one("a");
        assert!(!selection.all_visible_selected(["a", "b"]));
        selection.toggle_all_visible(&["a", "b"]);
        assert_eq!(selection.ids().len(), 2);
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let selection = Selection::default();
        assert!(!selection.all_visible_selected(std::iter::empty()));
    }
}
