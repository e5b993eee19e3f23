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

//! IPC message handler

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::{
    animal_rows, application_detail, application_rows, report_detail, report_rows,
    sponsorship_detail, sponsorship_rows, AnimalRow, ApplicationRow, ReportRow, ShelterClient,
    SponsorshipRow,
};
use crate::bulk::{self, BulkOutcome};
use crate::cache::CacheManager;
use crate::error::ApiError;
use crate::export;
use crate::log_ipc;
use crate::models::{
    error_codes, events, methods, AnimalUpdate, ApplicationStatus, ApplicationStatusUpdate,
    IpcError, IpcMessage, NewAnimal, NewSponsorship, ReportStatus,
};
use crate::views::{Row, Screen, TableControl, ViewKind, ViewRegistry};
use crate::workflow::{check_transition, options_for, WorkflowKind};

// ===== PARAMS =====

#[derive(Deserialize)]
struct LoginParams {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct IdParams {
    #[serde(deserialize_with = "crate::models::id_string")]
    id: String,
}

#[derive(Deserialize)]
struct IdsParams {
    #[serde(default)]
    ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct AnimalUpdateParams {
    #[serde(deserialize_with = "crate::models::id_string")]
    id: String,
    #[serde(flatten)]
    update: AnimalUpdate,
}

#[derive(Deserialize)]
struct ApplicationUpdateParams {
    #[serde(deserialize_with = "crate::models::id_string")]
    id: String,
    status: ApplicationStatus,
    #[serde(default)]
    observations: String,
}

#[derive(Deserialize)]
struct BulkApplicationParams {
    #[serde(default)]
    ids: Option<Vec<String>>,
    status: ApplicationStatus,
    #[serde(default)]
    observations: String,
}

#[derive(Deserialize)]
struct RenewParams {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    monthly_amount: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum PageAction {
    Next,
    Prev,
    Goto,
}

#[derive(Deserialize)]
struct PageParams {
    view: ViewKind,
    action: PageAction,
    #[serde(default)]
    page: usize,
}

#[derive(Deserialize)]
struct RowsParams {
    view: ViewKind,
    rows: usize,
}

#[derive(Deserialize)]
struct ViewParams {
    view: ViewKind,
}

#[derive(Deserialize)]
struct SelectParams {
    view: ViewKind,
    id: String,
}

#[derive(Deserialize)]
struct TransitionParams {
    kind: WorkflowKind,
    status: String,
}

fn parse_params<T: DeserializeOwned>(msg: &IpcMessage) -> Result<T, ApiError> {
    let params = msg.params.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(params).map_err(|e| ApiError::Validation(format!("Invalid params: {e}")))
}

/// Map an operation error to the code the UI switches on
pub fn ipc_error(err: &ApiError) -> IpcError {
    let code = match err {
        ApiError::Unauthorized => error_codes::SESSION_EXPIRED,
        ApiError::NotAuthenticated => error_codes::NOT_AUTHENTICATED,
        ApiError::Transport(_) => error_codes::NETWORK_ERROR,
        ApiError::Http { .. } | ApiError::Decode(_) => error_codes::API_ERROR,
        ApiError::AlreadyClosed(_) => error_codes::ALREADY_CLOSED,
        ApiError::InvalidTransition { .. } => error_codes::INVALID_TRANSITION,
        ApiError::Validation(_) => error_codes::INVALID_PARAMS,
        ApiError::Cancelled => error_codes::CANCELLED,
        ApiError::Cache(_) | ApiError::Internal(_) => error_codes::INTERNAL_ERROR,
    };

    let error = IpcError::new(code, err.to_string());
    match err {
        ApiError::Http { status, .. } => error.with_data(json!({ "status": status })),
        ApiError::AlreadyClosed(id) => error.with_data(json!({ "id": id })),
        _ => error,
    }
}

/// Methods that work without a stored token
fn is_public(method: &str) -> bool {
    matches!(
        method,
        methods::PING
            | methods::SHUTDOWN
            | methods::AUTH_LOGIN
            | methods::AUTH_LOGOUT
            | methods::AUTH_STATUS
            | methods::WORKFLOW_TRANSITIONS
    )
}

/// Handles incoming IPC messages and routes them to appropriate handlers
pub struct MessageHandler {
    client: Arc<ShelterClient>,
    cache: Option<Arc<CacheManager>>,
    views: Arc<ViewRegistry>,
    bulk_concurrency: usize,
    events: broadcast::Sender<IpcMessage>,
    shutdown: broadcast::Sender<()>,
}

impl MessageHandler {
    pub fn new(
        client: Arc<ShelterClient>,
        cache: Option<Arc<CacheManager>>,
        bulk_concurrency: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        let (shutdown, _) = broadcast::channel(1);
        Self {
            client,
            cache,
            views: Arc::new(ViewRegistry::new()),
            bulk_concurrency: bulk_concurrency.max(1),
            events,
            shutdown,
        }
    }

    /// Events pushed to every connected UI
    pub fn subscribe_events(&self) -> broadcast::Receiver<IpcMessage> {
        self.events.subscribe()
    }

    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    fn emit(&self, name: &str, params: Value) {
        log_ipc!(event, name);
        // no receivers just means no UI is connected
        let _ = self.events.send(IpcMessage::event(name, params));
    }

    /// Handle an incoming IPC message
    pub async fn handle_message(&self, msg: IpcMessage) -> IpcMessage {
        let method = msg.method.clone().unwrap_or_else(|| "unknown".to_string());
        log_ipc!(request, method.as_str(), msg.id.as_str());

        let result = self.dispatch(&method, &msg).await;

        let response = match result {
            Ok(value) => IpcMessage::response_ok(&msg.id, value),
            Err(Some(err)) => {
                if matches!(err, ApiError::Unauthorized) {
                    self.session_expired().await;
                }
                debug!("{} failed: {}", method, err);
                IpcMessage::response_err(&msg.id, ipc_error(&err))
            }
            Err(None) => {
                warn!("Unknown method: {}", method);
                IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::METHOD_NOT_FOUND, format!("Unknown method: {}", method)),
                )
            }
        };

        log_ipc!(response, method.as_str(), msg.id.as_str(), response.error.is_none());
        response
    }

    /// `Err(None)` means the method does not exist
    async fn dispatch(&self, method: &str, msg: &IpcMessage) -> Result<Value, Option<ApiError>> {
        if !is_public(method) && !self.client.is_authenticated().await.map_err(Some)? {
            // unknown methods still report as unknown
            return Err(known(method).then_some(ApiError::NotAuthenticated));
        }

        let result = match method {
            // System
            methods::PING => Ok(json!({
                "pong": true,
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
            methods::SHUTDOWN => self.handle_shutdown().await,

            // Authentication
            methods::AUTH_LOGIN => self.handle_login(msg).await,
            methods::AUTH_LOGOUT => self.handle_logout().await,
            methods::AUTH_STATUS => self
                .client
                .is_authenticated()
                .await
                .map(|authenticated| json!({ "authenticated": authenticated })),

            // Animals
            methods::ANIMALS_LIST => self.refresh_animals().await,
            methods::ANIMALS_GET => self.handle_animal_get(msg).await,
            methods::ANIMALS_REGISTER => self.handle_animal_register(msg).await,
            methods::ANIMALS_UPDATE => self.handle_animal_update(msg).await,

            // Reports
            methods::REPORTS_LIST => self.refresh_reports().await,
            methods::REPORTS_GET => self.handle_report_get(msg).await,
            methods::REPORTS_CLOSE => self.handle_reports_close(msg).await,

            // Adoption applications
            methods::APPLICATIONS_LIST => self.refresh_applications().await,
            methods::APPLICATIONS_GET => self.handle_application_get(msg).await,
            methods::APPLICATIONS_UPDATE_STATUS => self.handle_application_update(msg).await,
            methods::APPLICATIONS_BULK_UPDATE => self.handle_applications_bulk(msg).await,
            methods::APPLICATIONS_EXPORT => self.handle_applications_export(msg).await,

            // Sponsorships
            methods::SPONSORSHIPS_LIST => self.refresh_sponsorships().await,
            methods::SPONSORSHIPS_GET => self.handle_sponsorship_get(msg).await,
            methods::SPONSORSHIPS_REGISTER => self.handle_sponsorship_register(msg).await,
            methods::SPONSORSHIPS_RENEW => self.handle_sponsorship_renew(msg).await,

            // Table state
            methods::TABLE_GET => self.handle_table_get(msg).await,
            methods::TABLE_PAGE => self.handle_table_page(msg).await,
            methods::TABLE_ROWS => self.handle_table_rows(msg).await,
            methods::TABLE_SELECT => self.handle_table_select(msg).await,
            methods::TABLE_SELECT_ALL => self.handle_table_select_all(msg).await,
            methods::TABLE_CLEAR => self.handle_table_clear(msg).await,

            // Workflow
            methods::WORKFLOW_TRANSITIONS => parse_params::<TransitionParams>(msg)
                .and_then(|p| options_for(p.kind, &p.status))
                .and_then(|options| Ok(serde_json::to_value(options)?)),

            _ => return Err(None),
        };

        result.map_err(Some)
    }

    /// Forget everything tied to the expired session and tell the UI
    async fn session_expired(&self) {
        warn!("Session expired");
        self.views.abort_all().await;
        self.views.reset().await;
        self.emit(events::SESSION_EXPIRED, json!({}));
    }

    async fn handle_shutdown(&self) -> Result<Value, ApiError> {
        info!("Shutdown requested via IPC");
        self.views.abort_all().await;
        let _ = self.shutdown.send(());
        Ok(json!({ "status": "shutting_down" }))
    }

    // ===== AUTH =====

    async fn handle_login(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: LoginParams = parse_params(msg)?;
        if params.email.trim().is_empty() || params.password.is_empty() {
            return Err(ApiError::Validation(
                "Ingresa tu correo y contraseña".to_string(),
            ));
        }
        self.client.login(&params.email, &params.password).await?;
        Ok(json!({ "authenticated": true }))
    }

    async fn handle_logout(&self) -> Result<Value, ApiError> {
        self.views.abort_all().await;
        self.views.reset().await;
        self.client.logout().await?;
        if let Some(cache) = &self.cache {
            cache.clear_records().await?;
        }
        Ok(json!({ "authenticated": false }))
    }

    // ===== LIST REFRESH =====

    /// Fetch a screen's rows, replacing any fetch already running for it.
    /// When the backend cannot be reached the last cached snapshot is shown.
    /// While a bulk action runs on the screen the current state is returned
    /// as is; the bulk action reloads the rows when it finishes.
    async fn refresh<R, F>(&self, fetch: F) -> Result<Value, ApiError>
    where
        R: Screen,
        F: Future<Output = Result<Vec<R>, ApiError>> + Send + 'static,
    {
        let kind = R::KIND;
        {
            let mut tables = self.views.tables().lock().await;
            let table = R::table(&mut tables);
            if table.bulk_running() {
                debug!("Bulk action running on {}, skipping refresh", kind.as_str());
                return table.snapshot_json();
            }
            table.set_busy(true);
        }

        let fetched = self.views.fetch(kind, fetch).await;

        let (rows, cached) = match fetched {
            Ok(rows) => {
                self.store_snapshot(&rows).await;
                (rows, false)
            }
            Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
            Err(e) if e.is_transport() => match self.load_snapshot::<R>().await {
                Some(rows) => {
                    warn!("Backend unreachable, showing cached {}: {}", kind.as_str(), e);
                    (rows, true)
                }
                None => {
                    R::table(&mut *self.views.tables().lock().await).set_busy(false);
                    return Err(e);
                }
            },
            Err(e) => {
                R::table(&mut *self.views.tables().lock().await).set_busy(false);
                return Err(e);
            }
        };

        let snapshot = {
            let mut tables = self.views.tables().lock().await;
            let table = R::table(&mut tables);
            if table.bulk_running() {
                debug!("Bulk action started on {}, dropping fetched rows", kind.as_str());
            } else {
                table.load(rows, cached);
            }
            table.set_busy(false);
            table.snapshot_json()?
        };
        self.emit(events::TABLE_UPDATED, json!({ "view": kind }));
        Ok(snapshot)
    }

    async fn store_snapshot<R: Screen>(&self, rows: &[R]) {
        let Some(cache) = &self.cache else { return };
        let pairs: Vec<(String, &R)> = rows.iter().map(|r| (r.id().to_string(), r)).collect();
        if let Err(e) = cache.save_records(R::KIND.as_str(), &pairs).await {
            warn!("Failed to cache {}: {}", R::KIND.as_str(), e);
        }
    }

    async fn load_snapshot<R: Screen>(&self) -> Option<Vec<R>> {
        let cache = self.cache.as_ref()?;
        match cache.load_records(R::KIND.as_str()).await {
            Ok(rows) if !rows.is_empty() => Some(rows),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read cached {}: {}", R::KIND.as_str(), e);
                None
            }
        }
    }

    async fn refresh_animals(&self) -> Result<Value, ApiError> {
        let client = self.client.clone();
        self.refresh::<AnimalRow, _>(async move { Ok(animal_rows(&client.list_animals().await?)) })
            .await
    }

    async fn refresh_reports(&self) -> Result<Value, ApiError> {
        let client = self.client.clone();
        self.refresh::<ReportRow, _>(async move { Ok(report_rows(&client.list_reports().await?)) })
            .await
    }

    async fn refresh_applications(&self) -> Result<Value, ApiError> {
        let client = self.client.clone();
        self.refresh::<ApplicationRow, _>(async move {
            Ok(application_rows(&client.list_applications().await?))
        })
        .await
    }

    async fn refresh_sponsorships(&self) -> Result<Value, ApiError> {
        let client = self.client.clone();
        self.refresh::<SponsorshipRow, _>(async move {
            Ok(sponsorship_rows(&client.list_sponsorships().await?))
        })
        .await
    }

    // ===== BULK =====

    /// Ids named in the request, or the screen's selection
    async fn target_ids(&self, kind: ViewKind, ids: Option<Vec<String>>) -> Vec<String> {
        match ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => self.views.tables().lock().await.control(kind).selected_ids(),
        }
    }

    /// Run a bulk action with the table claimed, then refetch the list.
    /// Ids that succeeded leave the selection; failed ones stay ticked.
    async fn run_bulk<R, L, A>(
        &self,
        list: L,
        action: A,
        messages: (&str, &str),
    ) -> Result<Value, ApiError>
    where
        R: Screen,
        L: Future<Output = Result<Vec<R>, ApiError>> + Send + 'static,
        A: Future<Output = BulkOutcome>,
    {
        let kind = R::KIND;
        {
            let mut tables = self.views.tables().lock().await;
            if !R::table(&mut tables).begin_bulk() {
                return Err(ApiError::Validation(
                    "Ya hay una acción en curso".to_string(),
                ));
            }
        }
        let outcome = action.await;
        if outcome.session_expired() {
            R::table(&mut *self.views.tables().lock().await).end_bulk();
            return Err(ApiError::Unauthorized);
        }

        let refreshed = self.views.fetch(kind, list).await;

        let table_json = {
            let mut tables = self.views.tables().lock().await;
            let table = R::table(&mut tables);
            for id in &outcome.succeeded {
                table.selection_mut().remove(id);
            }
            match refreshed {
                Ok(rows) => table.reload_keeping_selection(rows),
                Err(e) => warn!("Could not refresh {} after bulk action: {}", kind.as_str(), e),
            }
            // this fetch superseded any refresh that was in flight
            table.set_busy(false);
            table.end_bulk();
            table.snapshot_json()?
        };
        self.emit(events::TABLE_UPDATED, json!({ "view": kind }));

        Ok(json!({
            "success": outcome.all_succeeded(),
            "message": outcome.summary(messages.0, messages.1),
            "outcome": outcome,
            "table": table_json,
        }))
    }

    /// Reply to a write the backend already accepted. A failed follow-up
    /// refresh becomes a warning so the UI does not retry the write.
    async fn written(
        &self,
        kind: ViewKind,
        message: &str,
        refreshed: Result<Value, ApiError>,
    ) -> Value {
        match refreshed {
            Ok(table) => json!({ "message": message, "table": table }),
            Err(e) => {
                warn!("Could not refresh {} after update: {}", kind.as_str(), e);
                if matches!(e, ApiError::Unauthorized) {
                    self.session_expired().await;
                }
                json!({ "message": message, "table": Value::Null, "warning": e.to_string() })
            }
        }
    }

    // ===== ANIMALS =====

    async fn handle_animal_get(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let IdParams { id } = parse_params(msg)?;
        let animal = self.client.get_animal(&id).await?;
        let transitions = options_for(WorkflowKind::Animal, animal.state.as_str())?;
        Ok(json!({
            "animal": animal,
            "row": animal_rows(std::slice::from_ref(&animal)).pop(),
            "transitions": transitions,
        }))
    }

    async fn handle_animal_register(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let animal: NewAnimal = parse_params(msg)?;
        if animal.name.trim().is_empty() {
            return Err(ApiError::Validation("El nombre es obligatorio".to_string()));
        }
        self.client.register_animal(&animal).await?;
        let refreshed = self.refresh_animals().await;
        Ok(self
            .written(ViewKind::Animals, "Animal registrado correctamente.", refreshed)
            .await)
    }

    async fn handle_animal_update(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let AnimalUpdateParams { id, update } = parse_params(msg)?;

        let current = self
            .views
            .tables()
            .lock()
            .await
            .animals
            .find(&id)
            .map(|row| row.state);
        let current = match current {
            Some(state) => state,
            None => self.client.get_animal(&id).await?.state,
        };
        check_transition(current, update.state, None)?;

        self.client.update_animal(&id, &update).await?;
        let refreshed = self.refresh_animals().await;
        Ok(self
            .written(ViewKind::Animals, "Información actualizada correctamente.", refreshed)
            .await)
    }

    // ===== REPORTS =====

    async fn handle_report_get(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let IdParams { id } = parse_params(msg)?;
        let report = self.client.get_report(&id).await?;
        Ok(serde_json::to_value(report_detail(&report))?)
    }

    async fn handle_reports_close(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let IdsParams { ids } = parse_params(msg)?;
        let ids = self.target_ids(ViewKind::Reports, ids).await;
        if ids.is_empty() {
            return Err(ApiError::Validation(
                "Selecciona al menos una denuncia".to_string(),
            ));
        }

        let items: Vec<(String, ReportStatus)> = {
            let tables = self.views.tables().lock().await;
            ids.into_iter()
                .map(|id| {
                    let status = tables.reports.find(&id).map(|r| r.status).unwrap_or_default();
                    (id, status)
                })
                .collect()
        };

        let client = self.client.clone();
        let list = async move { Ok(report_rows(&client.list_reports().await?)) };
        let action = bulk::close_reports(&self.client, items, self.bulk_concurrency);
        self.run_bulk::<ReportRow, _, _>(
            list,
            action,
            ("Denuncia cerrada correctamente.", "Denuncias cerradas correctamente."),
        )
        .await
    }

    // ===== ADOPTION APPLICATIONS =====

    async fn handle_application_get(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let IdParams { id } = parse_params(msg)?;
        let application = self.client.get_application(&id).await?;
        let transitions = options_for(WorkflowKind::Application, application.status.as_str())?;
        let detail = application_detail(application);
        Ok(json!({ "detail": detail, "transitions": transitions }))
    }

    async fn current_application_status(&self, id: &str) -> Result<ApplicationStatus, ApiError> {
        let known = self
            .views
            .tables()
            .lock()
            .await
            .applications
            .find(id)
            .map(|row| row.status);
        match known {
            Some(status) => Ok(status),
            None => Ok(self.client.get_application(id).await?.status),
        }
    }

    async fn handle_application_update(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: ApplicationUpdateParams = parse_params(msg)?;
        let current = self.current_application_status(&params.id).await?;
        check_transition(current, params.status, Some(&params.observations))?;

        self.client
            .update_application(&ApplicationStatusUpdate {
                id: params.id,
                status: params.status,
                observations: params.observations.trim().to_string(),
            })
            .await?;

        let refreshed = self.refresh_applications().await;
        Ok(self
            .written(ViewKind::Applications, "Solicitud actualizada correctamente.", refreshed)
            .await)
    }

    async fn handle_applications_bulk(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: BulkApplicationParams = parse_params(msg)?;
        let ids = self.target_ids(ViewKind::Applications, params.ids).await;
        if ids.is_empty() {
            return Err(ApiError::Validation(
                "Selecciona al menos una solicitud".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let status = self.current_application_status(&id).await;
            items.push((id, status));
        }

        let client = self.client.clone();
        let list = async move { Ok(application_rows(&client.list_applications().await?)) };
        let action = bulk::update_applications(
            &self.client,
            items,
            params.status,
            &params.observations,
            self.bulk_concurrency,
        );
        self.run_bulk::<ApplicationRow, _, _>(
            list,
            action,
            ("Solicitud actualizada correctamente.", "Solicitudes actualizadas correctamente."),
        )
        .await
    }

    /// One id exports a field sheet; several ids or none export a list,
    /// defaulting to every loaded application
    async fn handle_applications_export(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let IdsParams { ids } = parse_params(msg)?;
        let now = chrono::Local::now().naive_local();
        let tables = self.views.tables().lock().await;
        let rows = tables.applications.rows();

        let document = match ids.as_deref() {
            Some([id]) => {
                let row = rows
                    .iter()
                    .find(|r| &r.id == id)
                    .ok_or_else(|| ApiError::Validation(format!("Solicitud {id} no cargada")))?;
                export::application_document(row, now)
            }
            Some(ids) if !ids.is_empty() => {
                let chosen: Vec<ApplicationRow> = rows
                    .iter()
                    .filter(|r| ids.contains(&r.id))
                    .cloned()
                    .collect();
                export::applications_document(&chosen, now)
            }
            _ => export::applications_document(rows, now),
        };

        Ok(serde_json::to_value(document)?)
    }

    // ===== SPONSORSHIPS =====

    async fn handle_sponsorship_get(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let IdParams { id } = parse_params(msg)?;
        let sponsorship = self.client.get_sponsorship(&id).await?;
        let transitions = options_for(
            WorkflowKind::Sponsorship,
            sponsorship.sponsorship_status.as_str(),
        )?;
        Ok(json!({
            "detail": sponsorship_detail(&sponsorship),
            "transitions": transitions,
        }))
    }

    async fn handle_sponsorship_register(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let sponsorship: NewSponsorship = parse_params(msg)?;
        if sponsorship.animal_id.trim().is_empty() {
            return Err(ApiError::Validation("Selecciona un animal".to_string()));
        }
        self.client.register_sponsorship(&sponsorship).await?;
        let refreshed = self.refresh_sponsorships().await;
        Ok(self
            .written(ViewKind::Sponsorships, "Apadrinamiento registrado correctamente.", refreshed)
            .await)
    }

    /// Renew one sponsorship, by id or as the single selected row
    async fn handle_sponsorship_renew(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: RenewParams = parse_params(msg)?;

        let (id, current_amount) = {
            let tables = self.views.tables().lock().await;
            let id = match params.id {
                Some(id) => id,
                None => {
                    let selected = tables.sponsorships.selected_ids();
                    match <[String; 1]>::try_from(selected) {
                        Ok([id]) => id,
                        Err(_) => {
                            return Err(ApiError::Validation(
                                "Selecciona exactamente un apadrinamiento para renovar".to_string(),
                            ))
                        }
                    }
                }
            };
            let amount = tables.sponsorships.find(&id).map(|r| r.amount);
            (id, amount)
        };

        let amount = params
            .monthly_amount
            .or(current_amount)
            .ok_or_else(|| ApiError::Validation("Indica el monto mensual".to_string()))?;

        self.client.renew_sponsorship(&id, amount).await?;
        let refreshed = self.refresh_sponsorships().await;
        Ok(self
            .written(ViewKind::Sponsorships, "Apadrinamiento renovado correctamente.", refreshed)
            .await)
    }

    // ===== TABLE STATE =====

    async fn update_table<F>(&self, kind: ViewKind, op: F) -> Result<Value, ApiError>
    where
        F: FnOnce(&mut dyn TableControl) -> Result<(), ApiError>,
    {
        self.views.update(kind, op).await
    }

    async fn handle_table_get(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let ViewParams { view } = parse_params(msg)?;
        self.views.snapshot(view).await
    }

    async fn handle_table_page(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: PageParams = parse_params(msg)?;
        self.update_table(params.view, |table| {
            match params.action {
                PageAction::Next => table.next_page(),
                PageAction::Prev => table.prev_page(),
                PageAction::Goto => table.go_to_page(params.page),
            }
            Ok(())
        })
        .await
    }

    async fn handle_table_rows(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: RowsParams = parse_params(msg)?;
        self.update_table(params.view, |table| table.set_rows_per_page(params.rows))
            .await
    }

    async fn handle_table_select(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let params: SelectParams = parse_params(msg)?;
        self.update_table(params.view, |table| {
            table.toggle_one(&params.id);
            Ok(())
        })
        .await
    }

    async fn handle_table_select_all(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let ViewParams { view } = parse_params(msg)?;
        self.update_table(view, |table| {
            table.toggle_all_visible();
            Ok(())
        })
        .await
    }

    async fn handle_table_clear(&self, msg: &IpcMessage) -> Result<Value, ApiError> {
        let ViewParams { view } = parse_params(msg)?;
        self.update_table(view, |table| {
            table.clear_selection();
            Ok(())
        })
        .await
    }
}

/// Whether a method name is served at all
fn known(method: &str) -> bool {
    matches!(
        method,
        methods::ANIMALS_LIST
            | methods::ANIMALS_GET
            | methods::ANIMALS_REGISTER
            | methods::ANIMALS_UPDATE
            | methods::REPORTS_LIST
            | methods::REPORTS_GET
            | methods::REPORTS_CLOSE
            | methods::APPLICATIONS_LIST
            | methods::APPLICATIONS_GET
            | methods::APPLICATIONS_UPDATE_STATUS
            | methods::APPLICATIONS_BULK_UPDATE
            | methods::APPLICATIONS_EXPORT
            | methods::SPONSORSHIPS_LIST
            | methods::SPONSORSHIPS_GET
            | methods::SPONSORSHIPS_REGISTER
            | methods::SPONSORSHIPS_RENEW
            | methods::TABLE_GET
            | methods::TABLE_PAGE
            | methods::TABLE_ROWS
            | methods::TABLE_SELECT
            | methods::TABLE_SELECT_ALL
            | methods::TABLE_CLEAR
    )
}
