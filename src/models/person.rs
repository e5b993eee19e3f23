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

/// Contact data of an applicant, reporter or sponsor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Salvadoran national ID number
    pub dui: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl Person {
    /// "First Last" with blank parts dropped; empty when both are blank
    pub fn full_name(&self) -> String {
        [self.first_names.as_deref(), self.last_names.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
