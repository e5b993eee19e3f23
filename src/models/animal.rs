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
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Lifecycle state of an animal in the shelter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalState {
    Available,
    #[default]
    UnderAdoption,
    UnderTreatment,
    Adopted,
    Sponsored,
    FosterHome,
    Deceased,
    /// Any value this build does not know about
    #[serde(other)]
    Unknown,
}

impl AnimalState {
    pub const ALL: [AnimalState; 7] = [
        AnimalState::Available,
        AnimalState::UnderAdoption,
        AnimalState::UnderTreatment,
        AnimalState::Adopted,
        AnimalState::Sponsored,
        AnimalState::FosterHome,
        AnimalState::Deceased,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnimalState::Available => "AVAILABLE",
            AnimalState::UnderAdoption => "UNDER_ADOPTION",
            AnimalState::UnderTreatment => "UNDER_TREATMENT",
            AnimalState::Adopted => "ADOPTED",
            AnimalState::Sponsored => "SPONSORED",
            AnimalState::FosterHome => "FOSTER_HOME",
            AnimalState::Deceased => "DECEASED",
            AnimalState::Unknown => "UNKNOWN",
        }
    }
}

impl super::WireStatus for AnimalState {
    const UNKNOWN: Self = AnimalState::Unknown;
}

impl fmt::Display for AnimalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimalState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AnimalState::ALL
            .into_iter()
            .find(|state| state.as_str() == s.trim())
            .unwrap_or(AnimalState::Unknown))
    }
}

/// Animal record as returned by `/animal/find-all` and `/animal/find-by-id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animal {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    pub name: Option<String>,
    /// DOG, CAT or whatever the backend sends
    pub species: Option<String>,
    pub race: Option<String>,
    /// MALE or FEMALE
    pub sex: Option<String>,
    pub age: Option<serde_json::Value>,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub sterilized: bool,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub missing_limb: bool,
    #[serde(deserialize_with = "super::status_or_default")]
    pub state: AnimalState,
    pub photo: Option<String>,
    pub initial_description: Option<String>,
    pub rescue_location: Option<String>,
    pub observations: Option<String>,
}

/// Fields of the "new animal" form, sent as multipart to `/animal/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnimal {
    pub name: String,
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(default = "default_sex")]
    pub sex: String,
    #[serde(default)]
    pub race: String,
    /// Defaults to today when not provided
    pub birth_date: Option<String>,
    /// Defaults to today when not provided
    pub rescue_date: Option<String>,
    #[serde(default)]
    pub rescue_location: String,
    #[serde(default)]
    pub initial_description: String,
    #[serde(default)]
    pub missing_limb: bool,
    #[serde(default)]
    pub observations: String,
    /// Local path of a .jpg/.jpeg/.png photo
    pub photo_path: Option<PathBuf>,
}

fn default_species() -> String {
    "DOG".to_string()
}

fn default_sex() -> String {
    "MALE".to_string()
}

/// Fields editable from the animal detail view, sent as multipart to
/// `/animal/update/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalUpdate {
    #[serde(default)]
    pub initial_description: String,
    #[serde(default)]
    pub sterilized: bool,
    #[serde(default)]
    pub missing_limb: bool,
    pub state: AnimalState,
    pub photo_path: Option<PathBuf>,
}
