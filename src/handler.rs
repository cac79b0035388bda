//! Request pipeline for `/predict`
//!
//! ```text
//! models ready? → parse body → fetch TDS (fallback 0) → validate → classify
//! ```
//!
//! Each stage returns a typed error; the HTTP layer turns [`ApiError`] into
//! a status code and JSON body, so no path ends without a response.

use crate::error::ApiError;
use crate::model::PredictionEngine;
use crate::telemetry::{fetch_or_default, TelemetrySource};
use crate::types::PredictionResult;
use crate::validation::validate;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info};

/// Message returned when the request carries no usable payload
pub const NO_DATA_MESSAGE: &str = "No data received";

/// Immutable per-process context shared by all requests
pub struct PredictionService {
    engine: Arc<PredictionEngine>,
    telemetry: Arc<dyn TelemetrySource>,
}

impl PredictionService {
    pub fn new(engine: Arc<PredictionEngine>, telemetry: Arc<dyn TelemetrySource>) -> Self {
        Self { engine, telemetry }
    }

    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }

    /// Run the full pipeline for one raw request body
    pub async fn handle(&self, body: &[u8]) -> Result<PredictionResult, ApiError> {
        if !self.engine.is_ready() {
            return Err(ApiError::ServiceUnavailable);
        }

        let payload = parse_payload(body)?;

        let reading = fetch_or_default(self.telemetry.as_ref()).await;
        debug!(
            "Solids = {} ({:?}, entry {:?})",
            reading.value, reading.source, reading.entry_id
        );

        let vector = validate(&payload, reading.value).map_err(|e| {
            debug!("Rejected payload: {}", e);
            e
        })?;

        // Inference is CPU-bound; a panic in a model surfaces as a JoinError
        let engine = Arc::clone(&self.engine);
        let result = tokio::task::spawn_blocking(move || engine.classify(&vector))
            .await
            .map_err(|e| ApiError::Internal(join_error_message(e)))??;

        info!(
            "Prediction: {}={} {}={}",
            result.decision_tree.model,
            result.decision_tree.label,
            result.knn.model,
            result.knn.label
        );
        Ok(result)
    }
}

/// Decode the body into a JSON object.
///
/// Empty-ish payloads (no body, `null`, `{}`, `[]`, `""`, `0`, `false`)
/// count as no data; any other non-object is malformed. Bare `NaN` and
/// `Infinity` tokens are accepted and read as null, so the validator
/// rejects the field that carried them.
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()));
    }

    let parsed: serde_json::Result<Value> = match std::str::from_utf8(body) {
        Ok(text) => serde_json::from_str(&null_non_finite(text)),
        Err(_) => serde_json::from_slice(body),
    };
    let value = parsed.map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) | Value::Null | Value::Bool(false) => {
            Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()))
        }
        Value::Array(ref items) if items.is_empty() => {
            Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()))
        }
        Value::String(ref s) if s.is_empty() => {
            Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()))
        }
        Value::Number(ref n) if n.as_f64() == Some(0.0) => {
            Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()))
        }
        _ => Err(ApiError::BadRequest(
            "Invalid JSON body: expected an object".to_string(),
        )),
    }
}

const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replace non-finite number tokens outside string literals with `null`
fn null_non_finite(text: &str) -> Cow<'_, str> {
    if !NON_FINITE_TOKENS.iter().any(|t| text.contains(t)) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = rest.chars().next() {
        if !in_string {
            if let Some(token) = NON_FINITE_TOKENS.iter().find(|t| rest.starts_with(**t)) {
                out.push_str("null");
                rest = &rest[token.len()..];
                continue;
            }
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }

    let panic = err.into_panic();
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "inference panicked".to_string()
    }
}
