//! HTTP API
//!
//! Routes:
//! - `GET /` welcome message
//! - `POST /predict` run both classifiers on the posted readings
//! - `GET /health` model availability


use crate::error::ApiError;
use crate::handler::PredictionService;
use crate::model::ModelStatus;
use crate::types::{ErrorBody, PredictionResponse};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str = "Welcome to Water Quality Prediction API";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    models_loaded: bool,
    models: ModelStatus,
}

// ============ HTTP API Handlers ============

async fn home() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}

async fn predict(
    State(service): State<Arc<PredictionService>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let span = tracing::info_span!("predict", request_id = %Uuid::new_v4());

    async move {
        let outcome = match body {
            Ok(body) => service.handle(&body).await,
            Err(rejection) => Err(ApiError::from(rejection)),
        };

        match outcome {
            Ok(result) => Ok(Json(PredictionResponse::from(&result))),
            Err(e) => {
                tracing::warn!("Prediction failed ({}): {}", e.status_code(), e);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn health(State(service): State<Arc<PredictionService>>) -> (StatusCode, Json<HealthResponse>) {
    let models = service.engine().status();
    let (code, status) = if models.all_loaded() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            models_loaded: models.all_loaded(),
            models,
        }),
    )
}

/// Create API router
pub fn create_router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(service)
}

/// Serve the API until Ctrl-C
pub async fn start_server(service: Arc<PredictionService>, addr: &str) -> std::io::Result<()> {
    let app = create_router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
