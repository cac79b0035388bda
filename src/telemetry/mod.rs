//! Live telemetry for the `Solids` (TDS) feature
//!
//! The provider is a third party on every request's critical path, so a
//! failed read never fails a prediction. [`TelemetrySource::fetch`] reports
//! exactly what went wrong; [`fetch_or_default`] is the one place where
//! that error is collapsed into the fallback reading.


use crate::config::TelemetryConfig;
use crate::error::{FetchError, Result};
use crate::types::{ReadingSource, TelemetryReading};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Anything that can produce the current telemetry reading
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Read the latest value once, without retries
    async fn fetch(&self) -> std::result::Result<TelemetryReading, FetchError>;
}

/// Read the latest value, substituting the fallback on any failure
pub async fn fetch_or_default(source: &dyn TelemetrySource) -> TelemetryReading {
    match source.fetch().await {
        Ok(reading) => reading,
        Err(e) => {
            warn!(
                "Error fetching TDS: {}, setting TDS to {}",
                e,
                TelemetryReading::FALLBACK_VALUE
            );
            TelemetryReading::fallback()
        }
    }
}

/// Client for a ThingSpeak-style `last.json` endpoint
#[derive(Clone)]
pub struct TelemetryFetcher {
    http: Client,
    url: String,
    api_key: String,
    value_field: String,
}

impl TelemetryFetcher {
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let url = format!(
            "{}/channels/{}/fields/{}/last.json",
            config.base_url.trim_end_matches('/'),
            config.channel_id,
            config.field_id
        );

        Ok(Self {
            http,
            url,
            api_key: config.read_api_key.clone(),
            value_field: config.value_field.clone(),
        })
    }

    /// Endpoint URL, without the read key
    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TelemetrySource for TelemetryFetcher {
    async fn fetch(&self) -> std::result::Result<TelemetryReading, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let data: Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let value = parse_value(&self.value_field, data.get(&self.value_field))?;
        debug!("Fetched {} = {} from {}", self.value_field, value, self.url);

        Ok(TelemetryReading {
            value,
            source: ReadingSource::Provider,
            created_at: data
                .get("created_at")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<DateTime<Utc>>().ok()),
            entry_id: data.get("entry_id").and_then(Value::as_u64),
        })
    }
}

/// Parse a decimal string, allowing single `_` separators between digits
fn parse_number(text: &str) -> Option<f64> {
    if !text.contains('_') {
        return text.parse().ok();
    }

    let bytes = text.as_bytes();
    let separators_ok = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !separators_ok {
        return None;
    }

    text.replace('_', "").parse().ok()
}

/// Convert the provider's field value to a number.
///
/// The provider stores fields as strings; numbers are accepted too. An
/// absent, null or empty value counts as missing.
fn parse_value(field: &str, raw: Option<&Value>) -> std::result::Result<f64, FetchError> {
    match raw {
        None | Some(Value::Null) => Err(FetchError::MissingField(field.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(FetchError::MissingField(field.to_string()))
        }
        Some(Value::String(s)) => parse_number(s.trim()).ok_or_else(|| FetchError::NotNumeric {
            field: field.to_string(),
            value: s.clone(),
        }),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| FetchError::NotNumeric {
            field: field.to_string(),
            value: n.to_string(),
        }),
        Some(other) => Err(FetchError::NotNumeric {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}
