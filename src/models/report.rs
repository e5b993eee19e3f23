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
use std::str::FromStr;

use super::Person;

/// Status of a cruelty/abandonment report (denuncia)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Open,
    Closed,
    /// Any value this build does not know about
    #[serde(other)]
    Unknown,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Open => "OPEN",
            ReportStatus::Closed => "CLOSED",
            ReportStatus::Unknown => "UNKNOWN",
        }
    }
}

impl super::WireStatus for ReportStatus {
    const UNKNOWN: Self = ReportStatus::Unknown;
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OPEN" => Ok(ReportStatus::Open),
            "CLOSED" => Ok(ReportStatus::Closed),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// Report submitted by the public
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    #[serde(deserialize_with = "super::status_or_default")]
    pub status: ReportStatus,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub is_anonymous: bool,
    pub person: Option<Person>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub location: Option<String>,
    pub location_url: Option<String>,
    pub reception_date: Option<String>,
}

/// Payload of `PATCH /reports/update-status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusUpdate {
    pub report_id: String,
    pub status: ReportStatus,
}
