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

//! Printable table documents for adoption applications
//!
//! The core decides what goes on the page: file name, title, the
//! "generated" line, header row and body rows. Laying it out as a PDF is
//! left to the rendering front end.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::{ApplicationRow, PLACEHOLDER};

/// A landscape table ready to be rendered
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportDocument {
    pub file_name: String,
    pub title: String,
    pub generated_at: String,
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
}

fn generated_line(now: NaiveDateTime) -> String {
    format!("Generado: {}", now.format("%d/%m/%Y %H:%M"))
}

fn cell(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Field/value sheet for one application
pub fn application_document(app: &ApplicationRow, now: NaiveDateTime) -> ExportDocument {
    let id = cell(&app.id);
    ExportDocument {
        file_name: format!("solicitud_{id}.pdf"),
        title: format!("Solicitud {id}"),
        generated_at: generated_line(now),
        head: strings(&["Campo", "Valor"]),
        body: vec![
            strings(&["ID", &id]),
            strings(&["Solicitante", &cell(&app.person_name)]),
            strings(&["Correo", &cell(&app.person_email)]),
            strings(&["Dirección - Ciudad", &cell(&app.person_address)]),
            strings(&["Fecha", &cell(&app.application_date)]),
            strings(&["Estado", &cell(&app.status_label)]),
        ],
    }
}

/// One row per application
pub fn applications_document(apps: &[ApplicationRow], now: NaiveDateTime) -> ExportDocument {
    ExportDocument {
        file_name: format!("solicitudes_{}.pdf", now.format("%Y-%m-%d")),
        title: "Solicitudes de adopciones".to_string(),
        generated_at: generated_line(now),
        head: strings(&["#", "Solicitante", "Correo", "Dirección - Ciudad", "Fecha", "Estado"]),
        body: apps
            .iter()
            .map(|app| {
                vec![
                    app.serial.to_string(),
                    cell(&app.person_name),
                    cell(&app.person_email),
                    cell(&app.person_address),
                    cell(&app.application_date),
                    cell(&app.status_label),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationStatus;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 3)
            .unwrap()
            .and_hms_opt(9, 7, 0)
            .unwrap()
    }

    fn row(id: &str, serial: usize) -> ApplicationRow {
        ApplicationRow {
            id: id.into(),
            serial,
            status: ApplicationStatus::InReview,
            status_label: "En revisión".into(),
            person_name: "Rosa Díaz".into(),
            person_email: "".into(),
            person_address: "Calle 1, San Miguel".into(),
            application_date: "01/06/2025 10:00".into(),
        }
    }

    #[test]
    fn single_application_sheet() {
        let doc = application_document(&row("42", 1), now());
        assert_eq!(doc.file_name, "solicitud_42.pdf");
        assert_eq!(doc.generated_at, "Generado: 03/06/2025 09:07");
        assert_eq!(doc.head, vec!["Campo", "Valor"]);
        assert_eq!(doc.body.len(), 6);
        assert_eq!(doc.body[2], vec!["Correo", "—"]);
        assert_eq!(doc.body[5], vec!["Estado", "En revisión"]);
    }

    #[test]
    fn many_applications_sheet() {
        let doc = applications_document(&[row("1", 1), row("2", 2)], now());
        assert_eq!(doc.file_name, "solicitudes_2025-06-03.pdf");
        assert_eq!(doc.head.len(), 6);
        assert_eq!(doc.body[1][0], "2");
        assert_eq!(doc.body[1][3], "Calle 1, San Miguel");
    }
}
