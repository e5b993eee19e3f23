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

//! IPC message models for communication between the core and the admin UI

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of IPC message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Request,
    Response,
    Event,
}

/// An IPC message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcMessage {
    /// Unique message ID (UUID)
    pub id: String,

    /// Message type
    #[serde(rename = "type")]
    pub message_type: MessageType,

    /// Method name for requests and events
    #[serde(default)]
    pub method: Option<String>,

    /// Parameters for requests
    #[serde(default)]
    pub params: Option<Value>,

    /// Result for responses
    #[serde(default)]
    pub result: Option<Value>,

    /// Error for failed responses
    #[serde(default)]
    pub error: Option<IpcError>,
}

impl IpcMessage {
    /// Create a new request message
    #[cfg(test)]
    pub fn request(method: &str, params: Option<Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type: MessageType::Request,
            method: Some(method.to_string()),
            params,
            result: None,
            error: None,
        }
    }

    /// Create a success response
    pub fn response_ok(id: &str, result: Value) -> Self {
        Self {
            id: id.to_string(),
            message_type: MessageType::Response,
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn response_err(id: &str, error: IpcError) -> Self {
        Self {
            id: id.to_string(),
            message_type: MessageType::Response,
            method: None,
            params: None,
            result: None,
            error: Some(error),
        }
    }

    /// Create an event message
    pub fn event(method: &str, params: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type: MessageType::Event,
            method: Some(method.to_string()),
            params: Some(params),
            result: None,
            error: None,
        }
    }
}

/// Error in an IPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default)]
    pub data: Option<Value>,
}

impl IpcError {
    /// Create a new error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Add data to the error
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Standard error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application-specific errors
    pub const NOT_AUTHENTICATED: i32 = -1001;
    pub const SESSION_EXPIRED: i32 = -1002;
    pub const NETWORK_ERROR: i32 = -1003;
    pub const API_ERROR: i32 = -1004;
    pub const INVALID_TRANSITION: i32 = -1005;
    pub const ALREADY_CLOSED: i32 = -1006;
    pub const CANCELLED: i32 = -1007;
}

/// IPC method names
pub mod methods {
    // Authentication
    pub const AUTH_LOGIN: &str = "auth.login";
    pub const AUTH_LOGOUT: &str = "auth.logout";
    pub const AUTH_STATUS: &str = "auth.status";

    // Animals
    pub const ANIMALS_LIST: &str = "animals.list";
    pub const ANIMALS_GET: &str = "animals.get";
    pub const ANIMALS_REGISTER: &str = "animals.register";
    pub const ANIMALS_UPDATE: &str = "animals.update";

    // Reports
    pub const REPORTS_LIST: &str = "reports.list";
    pub const REPORTS_GET: &str = "reports.get";
    pub const REPORTS_CLOSE: &str = "reports.close";

    // Adoption applications
    pub const APPLICATIONS_LIST: &str = "applications.list";
    pub const APPLICATIONS_GET: &str = "applications.get";
    pub const APPLICATIONS_UPDATE_STATUS: &str = "applications.update_status";
    pub const APPLICATIONS_BULK_UPDATE: &str = "applications.bulk_update";
    pub const APPLICATIONS_EXPORT: &str = "applications.export";

    // Sponsorships
    pub const SPONSORSHIPS_LIST: &str = "sponsorships.list";
    pub const SPONSORSHIPS_GET: &str = "sponsorships.get";
    pub const SPONSORSHIPS_REGISTER: &str = "sponsorships.register";
    pub const SPONSORSHIPS_RENEW: &str = "sponsorships.renew";

    // Table state
    pub const TABLE_GET: &str = "table.get";
    pub const TABLE_PAGE: &str = "table.page";
    pub const TABLE_ROWS: &str = "table.rows";
    pub const TABLE_SELECT: &str = "table.select";
    pub const TABLE_SELECT_ALL: &str = "table.select_all";
    pub const TABLE_CLEAR: &str = "table.clear";

    // Workflow
    pub const WORKFLOW_TRANSITIONS: &str = "workflow.transitions";

    // System
    pub const PING: &str = "ping";
    pub const SHUTDOWN: &str = "shutdown";
}

/// Event names pushed to the UI
pub mod events {
    pub const SESSION_EXPIRED: &str = "event.session_expired";
    pub const TABLE_UPDATED: &str = "event.table_updated";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_without_optional_fields() {
        let raw = r#"{"id":"1","type":"request","method":"ping"}"#;
        let msg: IpcMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.message_type, MessageType::Request);
        assert_eq!(msg.method.as_deref(), Some(methods::PING));
        assert!(msg.params.is_none());
    }

    #[test]
    fn error_response_shape() {
        let msg = IpcMessage::response_err(
            "abc",
            IpcError::new(error_codes::NOT_AUTHENTICATED, "Not authenticated"),
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "response");
        assert_eq!(value["error"]["code"], error_codes::NOT_AUTHENTICATED);
        assert!(value["result"].is_null());
    }
}
