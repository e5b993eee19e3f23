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

/// Review status of an adoption application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    Rejected,
    /// Any value this build does not know about
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::InReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::InReview => "IN_REVIEW",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Unknown => "UNKNOWN",
        }
    }
}

impl super::WireStatus for ApplicationStatus {
    const UNKNOWN: Self = ApplicationStatus::Unknown;
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("unknown application status: {s}"))
    }
}

/// Personal reference listed in an adoption application
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoptionReference {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

/// Adoption application with the linked animal and applicant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoptionApplication {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    #[serde(deserialize_with = "super::status_or_default")]
    pub status: ApplicationStatus,
    /// Comma separated "date - STATUS" history written by the backend
    pub observations: Option<String>,
    pub application_date: Option<String>,
    pub created_at: Option<String>,
    pub animal: Option<Animal>,
    pub person: Option<Person>,
    pub adoption_references: Vec<AdoptionReference>,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub own_home: bool,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub accepts_visits: bool,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub commitment_to_sterilization: bool,
    #[serde(deserialize_with = "super::lenient_bool")]
    pub commitment_to_send_photos: bool,
    pub veterinarian_name: Option<String>,
    pub veterinarian_phone: Option<String>,
}

impl AdoptionApplication {
    /// Date shown in tables: application date, else creation date
    pub fn effective_date(&self) -> Option<&str> {
        self.application_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.created_at.as_deref())
    }
}

/// Payload of `PUT /adoption/applications/update-application`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationStatusUpdate {
    pub id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub observations: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_status_is_pending() {
        let app: AdoptionApplication =
            serde_json::from_str(r#"{"id":"7","status":"  ","createdAt":"2025-03-01T10:00:00Z"}"#)
                .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.effective_date(), Some("2025-03-01T10:00:00Z"));
        assert!(app.adoption_references.is_empty());
    }

    #[test]
    fn unrecognised_status_and_null_flags() {
        let json = r#"{"id":"8","status":"CANCELLED","ownHome":null,"acceptsVisits":"true"}"#;
        let app: AdoptionApplication = serde_json::from_str(json).unwrap();
        assert_eq!(app.status, ApplicationStatus::Unknown);
        assert!(!app.own_home);
        assert!(app.accepts_visits);
        assert!("CANCELLED".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn full_application() {
        let json = r#"{
            "id": "app-1",
            "status": "IN_REVIEW",
            "observations": "2025-01-02 - IN_REVIEW",
            "applicationDate": "2025-01-01T08:30:00Z",
            "animal": {"id": "a1", "name": "Luna", "species": "CAT", "sterilized": true},
            "person": {"firstNames": "Carla", "lastNames": "Ruiz", "dui": "00000000-0"},
            "adoptionReferences": [{"name": "Pedro", "phoneNumber": "2222-1111"}],
            "ownHome": true,
            "acceptsVisits": true
        }"#;
        let app: AdoptionApplication = serde_json::from_str(json).unwrap();
        assert_eq!(app.status, ApplicationStatus::InReview);
        assert_eq!(app.animal.as_ref().unwrap().name.as_deref(), Some("Luna"));
        assert_eq!(app.person.as_ref().unwrap().full_name(), "Carla Ruiz");
        assert_eq!(app.adoption_references.len(), 1);
        assert!(app.own_home && app.accepts_visits);
        assert!(!app.commitment_to_send_photos);
    }

    #[test]
    fn update_payload_wire_format() {
        let update = ApplicationStatusUpdate {
            id: "app-1".into(),
            status: ApplicationStatus::Rejected,
            observations: "Vivienda sin patio".into(),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": "app-1", "status": "REJECTED", "observations": "Vivienda sin patio"})
        );
    }
}
