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

//! Shelter backend REST client

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{server_message, ApiError};
use crate::log_api_call;
use crate::models::{
    decode_item, decode_list, AdoptionApplication, Animal, AnimalUpdate, ApplicationStatusUpdate,
    LoginData, LoginRequest, NewAnimal, NewSponsorship, RenewSponsorship, Report, ReportStatus,
    ReportStatusUpdate, Sponsorship,
};
use crate::session::TokenStore;

const INVALID_CREDENTIALS: &str = "Credenciales incorrectas. Por favor, intenta nuevamente.";
const ALREADY_CLOSED_MARKER: &str = "The report already has the status: CLOSED";

/// Request body variants accepted by the backend
enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// Client for the shelter REST API
pub struct ShelterClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ShelterClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Send a request and return the status and raw body.
    ///
    /// Authenticated requests need a stored token and get it as a bearer
    /// header. A 401 on an authenticated request clears the token.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Body,
        authenticated: bool,
    ) -> Result<(StatusCode, String), ApiError> {
        let url = self.url(path);

        let token = self.tokens.current().await?;
        if authenticated && token.is_none() {
            return Err(ApiError::NotAuthenticated);
        }

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token.as_deref().filter(|_| authenticated) {
            request = request.bearer_auth(token);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Multipart(form) => request.multipart(form),
        };

        log_api_call!(method.as_str(), url.as_str());
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        log_api_call!(
            method.as_str(),
            url.as_str(),
            started.elapsed().as_millis() as u64
        );

        if authenticated && status == StatusCode::UNAUTHORIZED {
            warn!("Session rejected by backend, clearing token");
            self.tokens.clear().await?;
            return Err(ApiError::Unauthorized);
        }

        Ok((status, text))
    }

    /// Send an authenticated request and fail on any non-2xx status
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Body,
        fallback: &str,
    ) -> Result<String, ApiError> {
        let (status, text) = self.send(method, path, body, true).await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status, &text, fallback));
        }
        Ok(text)
    }

    fn json<T: Serialize>(value: &T) -> Result<Body, ApiError> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    // ===== SESSION =====

    /// Exchange credentials for a token and store it
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        info!("Logging in");
        self.tokens.clear().await?;

        let body = Self::json(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let (status, text) = self.send(Method::POST, "/auth/login", body, false).await?;

        if status != StatusCode::OK {
            return Err(ApiError::from_response(status, &text, INVALID_CREDENTIALS));
        }

        let data: LoginData = decode_item(&text)?;
        let token = data.token.trim();
        if token.is_empty() {
            return Err(ApiError::Decode("login response without token".to_string()));
        }

        self.tokens.save(token).await?;
        info!("Login successful");
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        info!("Logging out");
        self.tokens.clear().await
    }

    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.tokens.current().await?.is_some())
    }

    // ===== ANIMALS =====

    pub async fn list_animals(&self) -> Result<Vec<Animal>, ApiError> {
        let body = self
            .call(Method::GET, "/animal/find-all", Body::Empty, "Error al obtener los animales")
            .await?;
        decode_list(&body)
    }

    pub async fn get_animal(&self, id: &str) -> Result<Animal, ApiError> {
        let path = format!("/animal/find-by-id/{}", urlencoding::encode(id));
        let body = self
            .call(Method::GET, &path, Body::Empty, "No se pudo cargar el animal")
            .await?;
        decode_item(&body)
    }

    pub async fn register_animal(&self, animal: &NewAnimal) -> Result<(), ApiError> {
        let today = today();
        let mut form = Form::new()
            .text("name", animal.name.trim().to_string())
            .text("species", animal.species.clone())
            .text("sex", animal.sex.clone())
            .text("race", animal.race.trim().to_string())
            .text("birthDate", animal.birth_date.clone().unwrap_or_else(|| today.clone()))
            .text("rescueDate", animal.rescue_date.clone().unwrap_or(today))
            .text("rescueLocation", animal.rescue_location.clone())
            .text("initialDescription", animal.initial_description.clone())
            .text("missingLimb", animal.missing_limb.to_string())
            .text("observations", animal.observations.clone());

        if let Some(path) = &animal.photo_path {
            form = form.part("photo", photo_part(path).await?);
        }

        self.call(
            Method::POST,
            "/animal/register",
            Body::Multipart(form),
            "No se pudo registrar el animal",
        )
        .await?;
        info!("Animal registered: {}", animal.name);
        Ok(())
    }

    pub async fn update_animal(&self, id: &str, update: &AnimalUpdate) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("initialDescription", update.initial_description.clone())
            .text("sterilized", update.sterilized.to_string())
            .text("missingLimb", update.missing_limb.to_string())
            .text("state", update.state.as_str());

        if let Some(path) = &update.photo_path {
            form = form.part("photo", photo_part(path).await?);
        }

        let path = format!("/animal/update/{}", urlencoding::encode(id));
        self.call(
            Method::PUT,
            &path,
            Body::Multipart(form),
            "No se pudo actualizar la información.",
        )
        .await?;
        Ok(())
    }

    // ===== REPORTS =====

    pub async fn list_reports(&self) -> Result<Vec<Report>, ApiError> {
        let body = self
            .call(Method::GET, "/reports/find-all", Body::Empty, "Error al obtener las denuncias")
            .await?;
        decode_list(&body)
    }

    pub async fn get_report(&self, id: &str) -> Result<Report, ApiError> {
        let path = format!("/reports/find-by-id/{}", urlencoding::encode(id));
        let body = self
            .call(Method::GET, &path, Body::Empty, "No se pudo cargar la denuncia")
            .await?;
        decode_item(&body)
    }

    /// Change a report's status. The backend may answer that the report is
    /// already closed, with either a success or an error status.
    pub async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
    ) -> Result<(), ApiError> {
        let body = Self::json(&ReportStatusUpdate {
            report_id: id.to_string(),
            status,
        })?;
        let (code, text) = self
            .send(Method::PATCH, "/reports/update-status", body, true)
            .await?;

        if server_message(&text).is_some_and(|m| m.contains(ALREADY_CLOSED_MARKER)) {
            return Err(ApiError::AlreadyClosed(id.to_string()));
        }
        if !code.is_success() {
            let fallback = format!("No se pudo cerrar la denuncia seleccionada ({id}).");
            return Err(ApiError::from_response(code, &text, &fallback));
        }

        debug!("Report {} set to {}", id, status);
        Ok(())
    }

    // ===== ADOPTION APPLICATIONS =====

    pub async fn list_applications(&self) -> Result<Vec<AdoptionApplication>, ApiError> {
        let body = self
            .call(
                Method::GET,
                "/adoption/applications/find-all",
                Body::Empty,
                "Error al obtener las solicitudes",
            )
            .await?;
        decode_list(&body)
    }

    pub async fn get_application(&self, id: &str) -> Result<AdoptionApplication, ApiError> {
        let path = format!(
            "/adoption/applications/find-by-id/{}",
            urlencoding::encode(id)
        );
        let body = self
            .call(Method::GET, &path, Body::Empty, "No se pudo cargar la solicitud")
            .await?;
        decode_item(&body)
    }

    pub async fn update_application(&self, update: &ApplicationStatusUpdate) -> Result<(), ApiError> {
        self.call(
            Method::PUT,
            "/adoption/applications/update-application",
            Self::json(update)?,
            "No se pudo actualizar la solicitud",
        )
        .await?;
        debug!("Application {} set to {}", update.id, update.status);
        Ok(())
    }

    // ===== SPONSORSHIPS =====

    pub async fn list_sponsorships(&self) -> Result<Vec<Sponsorship>, ApiError> {
        let body = self
            .call(
                Method::GET,
                "/sponsorship/find-all",
                Body::Empty,
                "Error al obtener los apadrinamientos",
            )
            .await?;
        decode_list(&body)
    }

    pub async fn get_sponsorship(&self, id: &str) -> Result<Sponsorship, ApiError> {
        let path = format!("/sponsorship/find-by-id/{}", urlencoding::encode(id));
        let body = self
            .call(Method::GET, &path, Body::Empty, "No se pudo cargar el apadrinamiento")
            .await?;
        decode_item(&body)
    }

    pub async fn register_sponsorship(&self, sponsorship: &NewSponsorship) -> Result<(), ApiError> {
        check_amount(sponsorship.monthly_amount)?;
        let mut payload = sponsorship.clone();
        if payload.start_date.trim().is_empty() {
            payload.start_date = today();
        }

        self.call(
            Method::POST,
            "/sponsorship/register",
            Self::json(&payload)?,
            "No se pudo registrar el apadrinamiento",
        )
        .await?;
        info!("Sponsorship registered for animal {}", payload.animal_id);
        Ok(())
    }

    pub async fn renew_sponsorship(&self, id: &str, monthly_amount: f64) -> Result<(), ApiError> {
        check_amount(monthly_amount)?;
        let path = format!("/sponsorship/renew/{}", urlencoding::encode(id));
        self.call(
            Method::PUT,
            &path,
            Self::json(&RenewSponsorship { monthly_amount })?,
            "No se pudo renovar el apadrinamiento",
        )
        .await?;
        Ok(())
    }
}

/// Monthly amounts must be finite and above zero
fn check_amount(amount: f64) -> Result<(), ApiError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "El monto mensual debe ser mayor a 0".to_string(),
        ))
    }
}

/// yyyy-mm-dd in UTC
fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Read a local photo into a multipart part. Only jpg and png are accepted.
async fn photo_part(path: &Path) -> Result<Part, ApiError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => {
            return Err(ApiError::Validation(format!(
                "Formato de imagen no soportado: {}",
                path.display()
            )))
        }
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Validation(format!("No se pudo leer {}: {e}", path.display())))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();

    Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalState, ApplicationStatus, NewAnimal, NewSponsorship, Person};
    use crate::session::MemoryTokenStore;
    use crate::test_support::spawn_backend;
    use axum::http::HeaderMap;
    use axum::routing::{get, patch, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client(base: &str, token: Option<&str>) -> ShelterClient {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        ShelterClient::new(base, Duration::from_secs(5), Arc::new(store)).unwrap()
    }

    fn bearer(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn login_stores_token() {
        let app = Router::new().route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secreto" {
                    (axum::http::StatusCode::OK, Json(json!({"data": {"token": "tok-1"}})))
                } else {
                    (
                        axum::http::StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "Bad credentials"})),
                    )
                }
            }),
        );
        let base = spawn_backend(app).await;
        let client = client(&base, Some("stale"));

        let err = client.login("ana@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, ref message } if message == "Bad credentials"));
        assert!(!client.is_authenticated().await.unwrap());

        client.login(" ana@example.com ", "secreto").await.unwrap();
        assert_eq!(client.tokens.current().await.unwrap().as_deref(), Some("tok-1"));

        client.logout().await.unwrap();
        assert!(!client.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn requests_carry_bearer_token() {
        let app = Router::new().route(
            "/reports/find-all",
            get(|headers: HeaderMap| async move {
                assert_eq!(bearer(&headers), "Bearer tok-1");
                Json(json!({"data": [{"id": 1, "status": "OPEN"}, {"id": 2, "status": "CLOSED"}]}))
            }),
        );
        let base = spawn_backend(app).await;

        let reports = client(&base, Some("tok-1")).list_reports().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].status, ReportStatus::Closed);
    }

    #[tokio::test]
    async fn no_token_means_no_request() {
        let client = client("http://127.0.0.1:9", None);
        let err = client.list_animals().await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn unauthorized_clears_token() {
        let app = Router::new().route(
            "/sponsorship/find-all",
            get(|| async { axum::http::StatusCode::UNAUTHORIZED }),
        );
        let base = spawn_backend(app).await;
        let client = client(&base, Some("expired"));

        let err = client.list_sponsorships().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!client.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn list_without_array_is_decode_error() {
        let app = Router::new().route(
            "/animal/find-all",
            get(|| async { Json(json!({"data": null, "message": "vacío"})) }),
        );
        let base = spawn_backend(app).await;
        let err = client(&base, Some("t")).list_animals().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn detail_accepts_bare_object() {
        let app = Router::new().route(
            "/adoption/applications/find-by-id/{id}",
            get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                Json(json!({"id": id, "status": "IN_REVIEW"}))
            }),
        );
        let base = spawn_backend(app).await;
        let app = client(&base, Some("t")).get_application("a 1").await.unwrap();
        assert_eq!(app.id, "a 1");
        assert_eq!(app.status, ApplicationStatus::InReview);
    }

    #[tokio::test]
    async fn already_closed_report() {
        let app = Router::new().route(
            "/reports/update-status",
            patch(|Json(body): Json<Value>| async move {
                assert_eq!(body["status"], "CLOSED");
                if body["reportId"] == "r1" {
                    (
                        axum::http::StatusCode::BAD_REQUEST,
                        Json(json!({"message": "The report already has the status: CLOSED"})),
                    )
                } else {
                    (axum::http::StatusCode::OK, Json(json!({"data": null})))
                }
            }),
        );
        let base = spawn_backend(app).await;
        let client = client(&base, Some("t"));

        let err = client
            .update_report_status("r1", ReportStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyClosed(ref id) if id == "r1"));
        assert_eq!(err.to_string(), "Esta denuncia ya esta cerrada");

        client
            .update_report_status("r2", ReportStatus::Closed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let app = Router::new().route(
            "/adoption/applications/update-application",
            put(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "database unavailable",
                )
            }),
        );
        let base = spawn_backend(app).await;
        let err = client(&base, Some("t"))
            .update_application(&ApplicationStatusUpdate {
                id: "a1".into(),
                status: ApplicationStatus::Approved,
                observations: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, ref message } if message == "database unavailable"));
    }

    #[tokio::test]
    async fn animal_update_is_multipart() {
        let app = Router::new().route(
            "/animal/update/{id}",
            put(|headers: HeaderMap, body: String| async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                assert!(content_type.starts_with("multipart/form-data"));
                assert!(body.contains("name=\"state\""));
                assert!(body.contains("FOSTER_HOME"));
                Json(json!({"data": null}))
            }),
        );
        let base = spawn_backend(app).await;
        client(&base, Some("t"))
            .update_animal(
                "7",
                &AnimalUpdate {
                    initial_description: "Cojea".into(),
                    sterilized: true,
                    missing_limb: false,
                    state: AnimalState::FosterHome,
                    photo_path: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_animal_fills_missing_dates() {
        let today = today();
        let app = Router::new().route(
            "/animal/register",
            post(move |headers: HeaderMap, body: String| {
                let today = today.clone();
                async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    assert!(content_type.starts_with("multipart/form-data"));
                    for field in ["name", "species", "sex", "race", "birthDate", "rescueDate",
                        "rescueLocation", "initialDescription", "missingLimb", "observations"]
                    {
                        assert!(body.contains(&format!("name=\"{field}\"")), "{field}");
                    }
                    assert!(!body.contains("name=\"photo\""));
                    assert!(body.contains("Canela"));
                    assert!(body.contains(&today));
                    assert!(body.contains("2024-12-01"));
                    Json(json!({"data": null}))
                }
            }),
        );
        let base = spawn_backend(app).await;
        client(&base, Some("t"))
            .register_animal(&NewAnimal {
                name: " Canela ".into(),
                species: "DOG".into(),
                sex: "FEMALE".into(),
                race: "Criolla".into(),
                birth_date: None,
                rescue_date: Some("2024-12-01".into()),
                rescue_location: "San Salvador".into(),
                initial_description: "Desnutrida".into(),
                missing_limb: false,
                observations: String::new(),
                photo_path: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_sponsorship_defaults_start_date() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let today = today();
        let app = Router::new().route(
            "/sponsorship/register",
            post(move |Json(body): Json<Value>| {
                let counter = counter.clone();
                let today = today.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(body["startDate"], today);
                    assert_eq!(body["monthlyAmount"], 15.0);
                    assert_eq!(body["animalId"], "a1");
                    Json(json!({"data": null}))
                }
            }),
        );
        let base = spawn_backend(app).await;
        let client = client(&base, Some("t"));
        let mut payload = NewSponsorship {
            monthly_amount: 15.0,
            start_date: "  ".into(),
            notes: String::new(),
            sponsor: Person {
                first_names: Some("Ana".into()),
                ..Default::default()
            },
            animal_id: "a1".into(),
        };
        client.register_sponsorship(&payload).await.unwrap();

        for bad in [0.0, -5.0, f64::NAN] {
            payload.monthly_amount = bad;
            assert!(matches!(
                client.register_sponsorship(&payload).await,
                Err(ApiError::Validation(_))
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_photo_is_rejected() {
        let err = photo_part(Path::new("/tmp/perro.gif")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn renew_requires_positive_amount() {
        let app = Router::new().route(
            "/sponsorship/renew/{id}",
            put(|Json(body): Json<Value>| async move {
                assert_eq!(body["monthlyAmount"], 20.0);
                Json(json!({"data": null}))
            }),
        );
        let base = spawn_backend(app).await;
        let client = client(&base, Some("t"));

        assert!(matches!(
            client.renew_sponsorship("s1", 0.0).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            client.renew_sponsorship("s1", f64::NAN).await,
            Err(ApiError::Validation(_))
        ));
        client.renew_sponsorship("s1", 20.0).await.unwrap();
    }

    #[test]
    fn absolute_paths_are_kept() {
        let client = client("http://api.local/", None);
        assert_eq!(client.url("/reports/find-all"), "http://api.local/reports/find-all");
        assert_eq!(client.url("https://cdn.local/x"), "https://cdn.local/x");
    }
}
