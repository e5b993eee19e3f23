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

use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

use super::{Row, TableControl, TableView};
use crate::api::{AnimalRow, ApplicationRow, ReportRow, SponsorshipRow};
use crate::error::ApiError;

/// The list screens of the admin portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Animals,
    Reports,
    Applications,
    Sponsorships,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Animals => "animals",
            ViewKind::Reports => "reports",
            ViewKind::Applications => "applications",
            ViewKind::Sponsorships => "sponsorships",
        }
    }
}

impl FromStr for ViewKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animals" => Ok(ViewKind::Animals),
            "reports" => Ok(ViewKind::Reports),
            "applications" => Ok(ViewKind::Applications),
            "sponsorships" => Ok(ViewKind::Sponsorships),
            other => Err(ApiError::Validation(format!("Unknown view: {other}"))),
        }
    }
}

/// Table state of every screen
#[derive(Debug, Default)]
pub struct Tables {
    pub animals: TableView<AnimalRow>,
    pub reports: TableView<ReportRow>,
    pub applications: TableView<ApplicationRow>,
    pub sponsorships: TableView<SponsorshipRow>,
}

impl Tables {
    pub fn control_mut(&mut self, kind: ViewKind) -> &mut dyn TableControl {
        match kind {
            ViewKind::Animals => &mut self.animals,
            ViewKind::Reports => &mut self.reports,
            ViewKind::Applications => &mut self.applications,
            ViewKind::Sponsorships => &mut self.sponsorships,
        }
    }

    pub fn control(&self, kind: ViewKind) -> &dyn TableControl {
        match kind {
            ViewKind::Animals => &self.animals,
            ViewKind::Reports => &self.reports,
            ViewKind::Applications => &self.applications,
            ViewKind::Sponsorships => &self.sponsorships,
        }
    }
}

/// A row type shown on its own screen
pub trait Screen: Row + Clone + DeserializeOwned + 'static {
    const KIND: ViewKind;

    fn table(tables: &mut Tables) -> &mut TableView<Self>;
}

impl Screen for AnimalRow {
    const KIND: ViewKind = ViewKind::Animals;

    fn table(tables: &mut Tables) -> &mut TableView<Self> {
        &mut tables.animals
    }
}

impl Screen for ReportRow {
    const KIND: ViewKind = ViewKind::Reports;

    fn table(tables: &mut Tables) -> &mut TableView<Self> {
        &mut tables.reports
    }
}

impl Screen for ApplicationRow {
    const KIND: ViewKind = ViewKind::Applications;

    fn table(tables: &mut Tables) -> &mut TableView<Self> {
        &mut tables.applications
    }
}

impl Screen for SponsorshipRow {
    const KIND: ViewKind = ViewKind::Sponsorships;

    fn table(tables: &mut Tables) -> &mut TableView<Self> {
        &mut tables.sponsorships
    }
}

/// Owns the tables and the in-flight fetch of each screen
#[derive(Default)]
pub struct ViewRegistry {
    tables: Mutex<Tables>,
    in_flight: Mutex<HashMap<ViewKind, AbortHandle>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &Mutex<Tables> {
        &self.tables
    }

    /// Run a fetch for a screen, aborting the one it replaces.
    ///
    /// A fetch that gets aborted resolves to [`ApiError::Cancelled`].
    pub async fn fetch<T, F>(&self, kind: ViewKind, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(fut);

        if let Some(previous) = self
            .in_flight
            .lock()
            .await
            .insert(kind, task.abort_handle())
        {
            if !previous.is_finished() {
                debug!("Aborting superseded {} fetch", kind.as_str());
            }
            previous.abort();
        }

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ApiError::Cancelled),
            Err(e) => Err(ApiError::Internal(e.to_string())),
        }
    }

    /// Abort every in-flight fetch (logout, shutdown)
    pub async fn abort_all(&self) {
        for (_, handle) in self.in_flight.lock().await.drain() {
            handle.abort();
        }
    }

    pub async fn snapshot(&self, kind: ViewKind) -> Result<serde_json::Value, ApiError> {
        self.tables.lock().await.control(kind).snapshot_json()
    }

    /// Apply an operation to a screen's table and return the new snapshot
    pub async fn update<F>(&self, kind: ViewKind, op: F) -> Result<serde_json::Value, ApiError>
    where
        F: FnOnce(&mut dyn TableControl) -> Result<(), ApiError>,
    {
        let mut tables = self.tables.lock().await;
        let table = tables.control_mut(kind);
        op(&mut *table)?;
        table.snapshot_json()
    }

    /// Forget all rows and selections
    pub async fn reset(&self) {
        *self.tables.lock().await = Tables::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn newer_fetch_cancels_older() {
        let registry = std::sync::Arc::new(ViewRegistry::new());

        let slow = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .fetch(ViewKind::Reports, async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok::<_, ApiError>(1)
                    })
                    .await
            })
        };

        // let the slow fetch register itself
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fast = registry
            .fetch(ViewKind::Reports, async { Ok::<_, ApiError>(2) })
            .await
            .unwrap();
        assert_eq!(fast, 2);

        let slow = slow.await.unwrap();
        assert!(matches!(slow, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn screens_do_not_cancel_each_other() {
        let registry = ViewRegistry::new();
        let a = registry.fetch(ViewKind::Animals, async { Ok::<_, ApiError>("a") });
        let b = registry.fetch(ViewKind::Sponsorships, async { Ok::<_, ApiError>("b") });
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a.unwrap(), "a");
        assert_eq!(b.unwrap(), "b");
    }

    #[test]
    fn view_names() {
        assert_eq!("reports".parse::<ViewKind>().unwrap(), ViewKind::Reports);
        assert!("perros".parse::<ViewKind>().is_err());
    }
}
