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

//! Batched status updates over the selected rows of a table

use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::api::ShelterClient;
use crate::error::ApiError;
use crate::models::{ApplicationStatus, ApplicationStatusUpdate, ReportStatus};
use crate::workflow::check_transition;

/// One item that could not be updated
#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub id: String,
    #[serde(rename = "message", serialize_with = "error_message")]
    pub error: ApiError,
}

fn error_message<S: Serializer>(error: &ApiError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&error.to_string())
}

/// Per-item result of a bulk action, in selection order
#[derive(Debug, Default, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether any item hit a 401
    pub fn session_expired(&self) -> bool {
        self.failed
            .iter()
            .any(|f| matches!(f.error, ApiError::Unauthorized))
    }

    /// Message for the UI banner
    pub fn summary(&self, one: &str, many: &str) -> String {
        match self.failed.first() {
            None if self.succeeded.len() == 1 => one.to_string(),
            None => many.to_string(),
            Some(first) if self.failed.len() == 1 => first.error.to_string(),
            Some(first) => format!(
                "{} elementos fallaron. Primer error: {}",
                self.failed.len(),
                first.error
            ),
        }
    }
}

/// Run `op` for every item that passes `check`, at most `concurrency` at a
/// time. Items rejected by `check` fail without a request.
pub async fn run<T, C, F, Fut>(
    items: Vec<(String, T)>,
    concurrency: usize,
    check: C,
    op: F,
) -> BulkOutcome
where
    C: Fn(&str, T) -> Result<(), ApiError>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), ApiError>>,
{
    let mut results = Vec::with_capacity(items.len());
    let mut pending = Vec::new();

    for (index, (id, current)) in items.into_iter().enumerate() {
        match check(&id, current) {
            Ok(()) => pending.push((index, id)),
            Err(e) => {
                debug!("Skipping {}: {}", id, e);
                results.push((index, id, Err(e)));
            }
        }
    }

    let sent: Vec<_> = stream::iter(pending)
        .map(|(index, id)| {
            let fut = op(id.clone());
            async move { (index, id, fut.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.extend(sent);
    results.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BulkOutcome::default();
    for (_, id, result) in results {
        match result {
            Ok(()) => outcome.succeeded.push(id),
            Err(error) => {
                warn!("Bulk item {} failed: {}", id, error);
                outcome.failed.push(BulkFailure { id, error });
            }
        }
    }
    outcome
}

/// Close the given reports. Reports already known to be closed are reported
/// as such without a request.
pub async fn close_reports(
    client: &ShelterClient,
    reports: Vec<(String, ReportStatus)>,
    concurrency: usize,
) -> BulkOutcome {
    info!("Closing {} reports", reports.len());
    run(
        reports,
        concurrency,
        |id, status| match status {
            ReportStatus::Closed => Err(ApiError::AlreadyClosed(id.to_string())),
            ReportStatus::Open | ReportStatus::Unknown => Ok(()),
        },
        |id| async move { client.update_report_status(&id, ReportStatus::Closed).await },
    )
    .await
}

/// Move every application to `to` with the same observations. An item whose
/// current status could not be looked up fails with that error.
pub async fn update_applications(
    client: &ShelterClient,
    applications: Vec<(String, Result<ApplicationStatus, ApiError>)>,
    to: ApplicationStatus,
    observations: &str,
    concurrency: usize,
) -> BulkOutcome {
    info!("Updating {} applications to {}", applications.len(), to);
    let observations = observations.trim();
    run(
        applications,
        concurrency,
        |_, from| check_transition(from?, to, Some(observations)),
        |id| async move {
            client
                .update_application(&ApplicationStatusUpdate {
                    id,
                    status: to,
                    observations: observations.to_string(),
                })
                .await
        },
    )
    .await
}
