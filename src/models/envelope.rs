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

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// `data` of a successful `/auth/login` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// Credentials for `/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Decode a list endpoint body; `data` must be an array
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    match value.get("data") {
        Some(data @ Value::Array(_)) => Ok(serde_json::from_value(data.clone())?),
        _ => Err(ApiError::Decode(
            "La respuesta del servidor no contiene datos válidos.".to_string(),
        )),
    }
}

/// Decode a detail endpoint body: `data` when present, else the body itself
pub fn decode_item<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    let item = match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Null) | None => Value::Object(map),
            Some(data) => data,
        },
        Value::Null => {
            return Err(ApiError::Decode("empty response".to_string()));
        }
        other => other,
    };
    Ok(serde_json::from_value(item)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdoptionApplication, ApplicationStatus, Report, Sponsorship};

    #[test]
    fn list_requires_array() {
        let err = decode_list::<Report>(r#"{"data":{"id":1}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let rows = decode_list::<Report>(r#"{"data":[{"id":1},{"id":"2"}],"message":"ok"}"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "2");
    }

    #[test]
    fn item_accepts_wrapped_or_bare() {
        let wrapped: Report = decode_item(r#"{"data":{"id":"r1","status":"CLOSED"}}"#).unwrap();
        assert_eq!(wrapped.id, "r1");

        let bare: Report = decode_item(r#"{"id":"r2","status":"OPEN"}"#).unwrap();
        assert_eq!(bare.id, "r2");
    }

    #[test]
    fn one_odd_row_does_not_sink_the_list() {
        let reports = decode_list::<Report>(
            r#"{"data":[{"id":1,"isAnonymous":null},{"id":2,"isAnonymous":true}]}"#,
        )
        .unwrap();
        assert_eq!(reports.len(), 2);

        let apps = decode_list::<AdoptionApplication>(
            r#"{"data":[{"id":"a1","status":"CANCELLED"},{"id":"a2","status":"APPROVED"}]}"#,
        )
        .unwrap();
        assert_eq!(apps[0].status, ApplicationStatus::Unknown);
        assert_eq!(apps[1].status, ApplicationStatus::Approved);

        let sponsorships =
            decode_list::<Sponsorship>(r#"{"data":[{"id":"s1","monthlyAmount":null}]}"#).unwrap();
        assert_eq!(sponsorships[0].monthly_amount, 0.0);
    }
}
