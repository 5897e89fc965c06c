//! HTTP API server implementation

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::config::ServiceConfig;
use crate::core::errors::TranslationError;
use crate::core::models::TranslationRequest;
use crate::core::translator::Translator;
use crate::server::form::TranslateForm;

/// Body of `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the translation API for Indian Languages";

/// Detail returned for every 5xx; the cause is only logged
pub const GENERIC_FAILURE: &str = "Translation failed";

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: Arc<Translator>,
}

impl AppState {
    pub fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }
}

/// Root response
#[derive(Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Successful translation
#[derive(Serialize, ToSchema)]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// Languages list response
#[derive(Serialize, ToSchema)]
pub struct LanguagesResponse {
    pub load_strategy: String,
    pub languages: Vec<LanguageInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub loaded: bool,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Translation error rendered as an HTTP response
pub struct ApiError(TranslationError);

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let detail = if self.0.is_client_error() {
            warn!("Rejected translation request: {}", self.0);
            self.0.to_string()
        } else {
            error!(error = %self.0, "Translation failed");
            GENERIC_FAILURE.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Welcome handler
#[utoipa::path(
    get,
    path = "/",
    tag = "translation",
    responses((status = 200, description = "Welcome message", body = WelcomeResponse))
)]
async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "translation",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Enabled languages handler
#[utoipa::path(
    get,
    path = "/languages",
    tag = "translation",
    responses((status = 200, description = "Enabled languages", body = LanguagesResponse))
)]
async fn list_languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    let registry = state.translator.registry();
    let languages = registry
        .languages()
        .into_iter()
        .map(|lang| LanguageInfo {
            code: lang.code().to_string(),
            name: lang.name().to_string(),
            loaded: registry.is_loaded(lang),
        })
        .collect();

    Json(LanguagesResponse {
        load_strategy: registry.strategy().to_string(),
        languages,
    })
}

/// Translation handler
#[utoipa::path(
    post,
    path = "/translate/",
    tag = "translation",
    request_body(content = TranslateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Translated text", body = TranslateResponse),
        (status = 400, description = "Empty or too long text, or unsupported language", body = ErrorResponse),
        (status = 500, description = "Model failure", body = ErrorResponse)
    )
)]
async fn translate(
    State(state): State<Arc<AppState>>,
    form: TranslateForm,
) -> Result<Json<TranslateResponse>, ApiError> {
    let request = TranslationRequest::new(form.text, form.language);
    let result = state.translator.translate(&request).await?;

    Ok(Json(TranslateResponse {
        translated_text: result.translated_text,
    }))
}

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(root, health_check, list_languages, translate),
    components(schemas(
        WelcomeResponse,
        HealthResponse,
        TranslateForm,
        TranslateResponse,
        LanguagesResponse,
        LanguageInfo,
        ErrorResponse
    )),
    tags((name = "translation", description = "MarianMT translation for Indian languages"))
)]
pub struct ApiDoc;

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the router with CORS and request tracing
pub fn build_router(state: Arc<AppState>) -> Router {
    // credentials rule out a literal `*`, so echo the caller's origin instead
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::POST])
        .allow_headers(AllowHeaders::mirror_request());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/languages", get(list_languages))
        .route("/translate/", post(translate))
        .route("/translate", post(translate))
        .route("/openapi.json", get(openapi_spec))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app).await?;
    Ok(())
}

/// Bind `host:port`, resolving hostnames such as `localhost`
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Run the HTTP server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    info!(
        strategy = %config.load_strategy,
        languages = config.languages.len(),
        "Preparing translator"
    );
    let translator = Arc::new(Translator::from_config(&config).await?);

    // Create app state
    let state = Arc::new(AppState::new(translator));

    let app = build_router(state);

    let listener = bind_listener(&config.host, config.port).await?;
    info!("Starting server on {}", listener.local_addr()?);

    serve(listener, app).await
}
