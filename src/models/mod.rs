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

//! Data models for the shelter admin core
//!
//! Wire DTOs received from the backend (animals, people, adoption
//! applications, reports, sponsorships), the response envelope and the IPC
//! message types used to talk to the UI.

mod adoption;
mod animal;
mod envelope;
mod ipc_message;
mod person;
mod report;
mod sponsorship;

pub use adoption::*;
pub use animal::*;
pub use envelope::*;
pub use ipc_message::*;
pub use person::*;
pub use report::*;
pub use sponsorship::*;

use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Status enums as they arrive from the backend
pub trait WireStatus: FromStr + Default + Copy + Eq {
    /// Stand-in for a value this build does not recognise
    const UNKNOWN: Self;
}

/// Deserialize a status string. Missing or blank values become the default,
/// unrecognised ones become `UNKNOWN` so the rest of the record survives.
pub(crate) fn status_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: WireStatus,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => Ok(value.parse().unwrap_or_else(|e| {
            debug!("{}", e);
            T::UNKNOWN
        })),
    }
}

/// Amounts may come as null, numbers or numeric strings
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Backend ids come as strings or numbers depending on the endpoint
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("unsupported id: {other}"))),
    }
}

/// Booleans sometimes arrive as "true"/"false" strings
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}
