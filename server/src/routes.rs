//! routes.rs
//! `/api/v1` endpoints. Handlers parse the multipart form, then hand the
//! synchronous pipeline to the blocking pool.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use chrono::Utc;
use serde::Serialize;
use sheetxml_core::audit::{AuditSink, JsonLinesAuditSink, MultiAuditSink, TracingAuditSink};
use sheetxml_core::constants::{API_V1_PREFIX, XML_SCHEMA_VERSION};
use sheetxml_core::pipeline::{ConversionPipeline, ConversionRequest, Upload, ValidationReport};
use sheetxml_core::session::SessionValidator;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{require_session, JwtSessionValidator, SessionUser};
use crate::config::ServiceConfig;
use crate::error::ApiError;

/// Room for multipart boundaries and the small text fields around the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ConversionPipeline>,
    pub audit: Arc<dyn AuditSink>,
    /// `None` leaves the endpoints open.
    pub sessions: Option<Arc<dyn SessionValidator>>,
    pub allowed_origins: Vec<String>,
    pub debug: bool,
}

impl AppState {
    pub fn new(pipeline: ConversionPipeline) -> Self {
        let audit = pipeline.audit().clone();
        let debug = pipeline.config().expose_error_details;
        Self { pipeline: Arc::new(pipeline), audit, sessions: None, allowed_origins: Vec::new(), debug }
    }

    pub fn with_sessions(mut self, validator: Arc<dyn SessionValidator>) -> Self {
        self.sessions = Some(validator);
        self
    }

    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Audit sinks, pipeline and session validator from service settings.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let audit: Arc<dyn AuditSink> = match &config.audit_log_path {
            Some(path) => {
                let console: Arc<dyn AuditSink> = Arc::new(TracingAuditSink);
                let file: Arc<dyn AuditSink> = Arc::new(JsonLinesAuditSink::open(path)?);
                Arc::new(MultiAuditSink::new(vec![console, file]))
            }
            None => Arc::new(TracingAuditSink),
        };
        let pipeline = ConversionPipeline::new(config.converter_config()?, audit)?;
        let mut state = Self::new(pipeline).with_origins(config.origins());
        if let Some(secret) = config.session_secret() {
            let validator = JwtSessionValidator::new(secret, Some(config.session_timeout_minutes));
            state = state.with_sessions(Arc::new(validator));
        }
        Ok(state)
    }

    fn body_limit(&self) -> usize {
        let upload = usize::try_from(self.pipeline.config().max_upload_size_bytes).unwrap_or(usize::MAX);
        upload.saturating_add(MULTIPART_OVERHEAD)
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/validate", post(validate))
        .route("/convert", post(convert))
        .route("/download/{id}", get(download))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let api = Router::new().route("/health", get(health)).merge(protected);

    Router::new()
        .nest(API_V1_PREFIX, api)
        .layer(DefaultBodyLimit::max(state.body_limit()))
        .layer(cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    schema_version: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        schema_version: XML_SCHEMA_VERSION,
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    request_data: Option<String>,
    sheet_name: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?;
                    form.file = Some((file_name, bytes.to_vec()));
                }
                Some("request_data") => form.request_data = Some(field.text().await?),
                Some("sheet_name") => form.sheet_name = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }

    fn upload(&mut self, user: SessionUser) -> Result<Upload, ApiError> {
        match self.file.take() {
            Some((name, bytes)) if !name.is_empty() => Ok(Upload::new(name, bytes).with_user(user.0)),
            _ => Err(ApiError::missing_file()),
        }
    }
}

async fn validate(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    multipart: Multipart,
) -> Result<Json<ValidationReport>, ApiError> {
    let upload = UploadForm::read(multipart).await?.upload(user)?;
    let pipeline = state.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || pipeline.validate(&upload)).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ConvertResponse {
    status: &'static str,
    message: &'static str,
    download_reference: String,
    download_url: String,
    encrypted: bool,
    rows: usize,
    columns: usize,
}

async fn convert(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.upload(user)?;

    let mut request = ConversionRequest::from_json(form.request_data.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::from_convert(&e, state.debug))?;
    if let Some(sheet) = form.sheet_name.take().filter(|s| !s.trim().is_empty()) {
        request = request.with_sheet(sheet);
    }

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.convert(upload, request))
        .await?
        .map_err(|f| ApiError::from_failure(f, state.debug))?;

    info!(job_id = %outcome.job_id, rows = outcome.rows, "conversion served");
    Ok(Json(ConvertResponse {
        status: "success",
        message: "File converted successfully",
        download_reference: outcome.job_id.to_string(),
        download_url: outcome.reference.download_path,
        encrypted: outcome.encrypted,
        rows: outcome.rows,
        columns: outcome.columns,
    }))
}

async fn download(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let pipeline = state.pipeline.clone();
    let artifact = tokio::task::spawn_blocking(move || pipeline.download(&id, &user.0))
        .await?
        .map_err(|f| ApiError::from_failure(f, state.debug))?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [(header::CONTENT_TYPE, artifact.content_type.to_string()), (header::CONTENT_DISPOSITION, disposition)],
        artifact.bytes,
    )
        .into_response())
}
