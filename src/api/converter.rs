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

//! Converters from backend DTOs to the rows and detail views shown by the UI

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    AdoptionApplication, Animal, AnimalState, ApplicationStatus, Person, Report, ReportStatus,
    Sponsorship, SponsorshipStatus,
};
use crate::views::Row;
use crate::workflow::Workflow;

/// Shown wherever a value is missing
pub const PLACEHOLDER: &str = "—";

/// Trimmed copy of an optional string; empty when absent
pub fn safe_trim(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// First non-blank candidate, or the placeholder
fn first_or_placeholder<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// dd/mm/yyyy hh:mm in the timestamp's own offset; "—" when missing or invalid
pub fn format_date_time(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// dd/mm/yyyy; "—" when missing or invalid
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn species_label(species: &str) -> String {
    match species {
        "DOG" => "Perro".to_string(),
        "CAT" => "Gato".to_string(),
        other => other.to_string(),
    }
}

fn sex_label(sex: &str) -> String {
    match sex {
        "MALE" => "Macho".to_string(),
        "FEMALE" => "Hembra".to_string(),
        other => other.to_string(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sí"
    } else {
        "No"
    }
}

// ===== REPORTS =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    pub id: String,
    pub serial: usize,
    pub reporter: String,
    pub email: String,
    pub phone: String,
    pub status: ReportStatus,
    pub status_label: String,
    pub reception_date: String,
}

impl Row for ReportRow {
    fn id(&self) -> &str {
        &self.id
    }
}

fn reporter_name(report: &Report) -> String {
    if report.is_anonymous {
        return "Anónimo".to_string();
    }
    let name = report.person.as_ref().map(Person::full_name).unwrap_or_default();
    if name.is_empty() {
        "Sin datos".to_string()
    } else {
        name
    }
}

fn report_email(report: &Report) -> String {
    first_or_placeholder([
        report.contact_email.as_deref(),
        report.person.as_ref().and_then(|p| p.email.as_deref()),
    ])
}

fn report_phone(report: &Report) -> String {
    first_or_placeholder([
        report.contact_phone.as_deref(),
        report.person.as_ref().and_then(|p| p.phone_number.as_deref()),
    ])
}

pub fn report_rows(reports: &[Report]) -> Vec<ReportRow> {
    reports
        .iter()
        .enumerate()
        .map(|(index, report)| ReportRow {
            id: report.id.clone(),
            serial: index + 1,
            reporter: reporter_name(report),
            email: report_email(report),
            phone: report_phone(report),
            status: report.status,
            status_label: report.status.label().to_string(),
            reception_date: format_date_time(report.reception_date.as_deref()),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDetail {
    pub id: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub photo: String,
    pub status: ReportStatus,
    pub report_type: String,
    pub location: String,
    pub location_url: String,
    pub reception_date: String,
}

pub fn report_detail(report: &Report) -> ReportDetail {
    let description = safe_trim(report.description.as_deref());
    ReportDetail {
        id: report.id.clone(),
        description: if description.is_empty() {
            "No hay descripción disponible.".to_string()
        } else {
            description
        },
        email: report_email(report),
        phone: report_phone(report),
        photo: safe_trim(report.photo.as_deref()),
        status: report.status,
        report_type: safe_trim(report.report_type.as_deref()),
        location: safe_trim(report.location.as_deref()),
        location_url: safe_trim(report.location_url.as_deref()),
        reception_date: format_date_time(report.reception_date.as_deref()),
    }
}

// ===== ADOPTION APPLICATIONS =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationRow {
    pub id: String,
    pub serial: usize,
    pub status: ApplicationStatus,
    pub status_label: String,
    pub person_name: String,
    pub person_email: String,
    pub person_address: String,
    pub application_date: String,
}

impl Row for ApplicationRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn application_rows(applications: &[AdoptionApplication]) -> Vec<ApplicationRow> {
    applications
        .iter()
        .enumerate()
        .map(|(index, app)| {
            let person = app.person.as_ref();
            let name = person.map(Person::full_name).unwrap_or_default();
            let address = person
                .map(|p| {
                    [p.address.as_deref(), p.city.as_deref()]
                        .into_iter()
                        .flatten()
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();

            ApplicationRow {
                id: app.id.clone(),
                serial: index + 1,
                status: app.status,
                status_label: app.status.label().to_string(),
                person_name: if name.is_empty() { PLACEHOLDER.to_string() } else { name },
                person_email: first_or_placeholder([person.and_then(|p| p.email.as_deref())]),
                person_address: if address.is_empty() {
                    PLACEHOLDER.to_string()
                } else {
                    address
                },
                application_date: format_date_time(app.effective_date()),
            }
        })
        .collect()
}

/// One entry of an application's observation history
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObservationEntry {
    pub text: String,
    pub status: Option<ApplicationStatus>,
}

/// Split the backend's "date - STATUS, date - STATUS" history
pub fn observation_history(observations: Option<&str>) -> Vec<ObservationEntry> {
    let Some(raw) = observations.filter(|o| !o.trim().is_empty()) else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| ObservationEntry {
            text: entry.to_string(),
            status: entry
                .split(" - ")
                .nth(1)
                .and_then(|s| s.trim().parse().ok()),
        })
        .collect()
}

/// Label/value pairs for the animal card on the application detail view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: AdoptionApplication,
    pub applicant_name: String,
    pub animal_facts: Vec<DetailField>,
    pub applicant_facts: Vec<DetailField>,
    pub history: Vec<ObservationEntry>,
}

pub fn application_detail(app: AdoptionApplication) -> ApplicationDetail {
    let dash = |v: Option<&str>| first_or_placeholder([v]);

    let animal_facts = match &app.animal {
        Some(animal) => vec![
            DetailField { label: "Especie", value: dash(animal.species.as_deref()) },
            DetailField { label: "Raza", value: dash(animal.race.as_deref()) },
            DetailField { label: "Esterilizado", value: yes_no(animal.sterilized).to_string() },
            DetailField { label: "Amputado", value: yes_no(animal.missing_limb).to_string() },
        ],
        None => Vec::new(),
    };

    let person = app.person.clone().unwrap_or_default();
    let applicant_facts = vec![
        DetailField { label: "Email", value: dash(person.email.as_deref()) },
        DetailField { label: "Teléfono", value: dash(person.phone_number.as_deref()) },
        DetailField { label: "DUI", value: dash(person.dui.as_deref()) },
        DetailField { label: "Dirección", value: dash(person.address.as_deref()) },
        DetailField { label: "Ciudad", value: dash(person.city.as_deref()) },
        DetailField { label: "Hogar propio", value: yes_no(app.own_home).to_string() },
        DetailField { label: "Acepta visitas", value: yes_no(app.accepts_visits).to_string() },
        DetailField {
            label: "Compromiso esterilización",
            value: yes_no(app.commitment_to_sterilization).to_string(),
        },
        DetailField {
            label: "Compromiso envío fotos",
            value: yes_no(app.commitment_to_send_photos).to_string(),
        },
        DetailField {
            label: "Veterinario",
            value: format!(
                "{} ({})",
                dash(app.veterinarian_name.as_deref()),
                dash(app.veterinarian_phone.as_deref())
            ),
        },
    ];

    let name = person.full_name();
    ApplicationDetail {
        applicant_name: if name.is_empty() { PLACEHOLDER.to_string() } else { name },
        history: observation_history(app.observations.as_deref()),
        animal_facts,
        applicant_facts,
        application: app,
    }
}

// ===== SPONSORSHIPS =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SponsorshipRow {
    pub id: String,
    pub serial: usize,
    pub sponsor_name: String,
    pub email: String,
    pub phone: String,
    pub status: SponsorshipStatus,
    pub status_label: String,
    pub amount: f64,
    pub start_date: String,
    pub end_date: String,
    pub notes: String,
    pub animal_name: String,
    pub animal_photo: Option<String>,
    pub sponsor_address: String,
}

impl Row for SponsorshipRow {
    fn id(&self) -> &str {
        &self.id
    }
}

fn sponsorship_row(index: usize, item: &Sponsorship) -> SponsorshipRow {
    let sponsor = item.sponsor.as_ref();
    let name = sponsor.map(Person::full_name).unwrap_or_default();
    let animal_name = item
        .animal
        .as_ref()
        .and_then(|a| a.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Desconocido")
        .to_string();

    SponsorshipRow {
        id: item.id.clone(),
        serial: index + 1,
        sponsor_name: if name.is_empty() { "Sin nombre".to_string() } else { name },
        email: first_or_placeholder([sponsor.and_then(|s| s.email.as_deref())]),
        phone: first_or_placeholder([sponsor.and_then(|s| s.phone_number.as_deref())]),
        status: item.sponsorship_status,
        status_label: item.sponsorship_status.label().to_string(),
        amount: item.monthly_amount,
        start_date: format_date(item.start_date.as_deref()),
        end_date: format_date(item.end_date.as_deref()),
        notes: safe_trim(item.notes.as_deref()),
        animal_name,
        animal_photo: item.animal.as_ref().and_then(|a| a.photo.clone()),
        sponsor_address: first_or_placeholder([sponsor.and_then(|s| s.address.as_deref())]),
    }
}

pub fn sponsorship_rows(items: &[Sponsorship]) -> Vec<SponsorshipRow> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| sponsorship_row(index, item))
        .collect()
}

/// Detail view uses the same shape as a row
pub fn sponsorship_detail(item: &Sponsorship) -> SponsorshipRow {
    sponsorship_row(0, item)
}

// ===== ANIMALS =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalRow {
    pub id: String,
    pub name: String,
    pub species: String,
    pub race: String,
    pub sex: String,
    pub state: AnimalState,
    pub state_label: String,
}

impl Row for AnimalRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn animal_rows(animals: &[Animal]) -> Vec<AnimalRow> {
    animals
        .iter()
        .map(|animal| AnimalRow {
            id: animal.id.clone(),
            name: safe_trim(animal.name.as_deref()),
            species: species_label(&safe_trim(animal.species.as_deref())),
            race: safe_trim(animal.race.as_deref()),
            sex: sex_label(&safe_trim(animal.sex.as_deref())),
            state: animal.state,
            state_label: animal.state.label().to_string(),
        })
        .collect()
}
