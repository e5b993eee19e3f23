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

use super::{Animal, Person};

/// Status of a monthly sponsorship (apadrinamiento)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SponsorshipStatus {
    Active,
    Inactive,
    #[default]
    Pending,
    /// Any value this build does not know about
    #[serde(other)]
    Unknown,
}

impl SponsorshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SponsorshipStatus::Active => "ACTIVE",
            SponsorshipStatus::Inactive => "INACTIVE",
            SponsorshipStatus::Pending => "PENDING",
            SponsorshipStatus::Unknown => "UNKNOWN",
        }
    }
}

impl super::WireStatus for SponsorshipStatus {
    const UNKNOWN: Self = SponsorshipStatus::Unknown;
}

impl fmt::Display for SponsorshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SponsorshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ACTIVE" => Ok(SponsorshipStatus::Active),
            "INACTIVE" => Ok(SponsorshipStatus::Inactive),
            "PENDING" => Ok(SponsorshipStatus::Pending),
            other => Err(format!("unknown sponsorship status: {other}")),
        }
    }
}

/// Sponsorship of one animal by one sponsor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sponsorship {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    #[serde(deserialize_with = "super::status_or_default")]
    pub sponsorship_status: SponsorshipStatus,
    #[serde(deserialize_with = "super::lenient_f64")]
    pub monthly_amount: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub notes: Option<String>,
    pub animal: Option<Animal>,
    pub sponsor: Option<Person>,
}

/// Payload of `POST /sponsorship/register`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSponsorship {
    pub monthly_amount: f64,
    /// yyyy-mm-dd; today when omitted by the UI
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub notes: String,
    pub sponsor: Person,
    pub animal_id: String,
}

/// Payload of `PUT /sponsorship/renew/:id`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenewSponsorship {
    pub monthly_amount: f64,
}
