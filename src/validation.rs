//! Feature assembly and validation
//!
//! Merges the telemetry reading into the caller's payload and checks the
//! nine required features in training order, stopping at the first bad one.

use crate::error::ValidationError;
use crate::types::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES, SOLIDS_FIELD};
use serde_json::{Map, Value};

/// Build the classifier input from a request payload and the telemetry value.
///
/// `Solids` always comes from `telemetry`; any caller-supplied value is
/// ignored. Every other feature must be a JSON number. Strings, booleans,
/// null and nested values are rejected even when they look numeric.
pub fn validate(
    payload: &Map<String, Value>,
    telemetry: f64,
) -> Result<FeatureVector, ValidationError> {
    // Missing or non-numeric fields become NaN so the finiteness check in
    // `FeatureVector::new` reports them in training order with the rest
    let mut values = [f64::NAN; FEATURE_COUNT];

    for (slot, field) in values.iter_mut().zip(FEATURE_NAMES) {
        let value = if field == SOLIDS_FIELD {
            Some(telemetry)
        } else {
            payload.get(field).and_then(numeric)
        };

        if let Some(v) = value {
            *slot = v;
        }
    }

    FeatureVector::new(values).map_err(|field| ValidationError { field })
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
