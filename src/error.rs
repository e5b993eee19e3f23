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

//! Error type shared by the API client, workflow engine and IPC layer

use reqwest::StatusCode;

/// Errors surfaced to the UI for a single operation
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Backend answered 401. The stored token has already been cleared.
    #[error("Unauthorized - Session expired")]
    Unauthorized,

    /// No token in storage; the operation was not attempted
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Network, DNS or timeout failure
    #[error("Connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body was not the envelope we expected
    #[error("Invalid server response: {0}")]
    Decode(String),

    /// The backend reports the denuncia is already closed
    #[error("Esta denuncia ya esta cerrada")]
    AlreadyClosed(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{0}")]
    Validation(String),

    /// A newer fetch for the same screen replaced this one
    #[error("Request superseded by a newer one")]
    Cancelled,

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build an HTTP error from a status and the raw response body.
    ///
    /// The backend puts a human readable `message` in its JSON error bodies;
    /// plain-text bodies are used verbatim.
    pub fn from_response(status: StatusCode, body: &str, fallback: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| fallback.to_string());
        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }

    /// Whether the backend could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Extract the server-provided message from a response body
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}
