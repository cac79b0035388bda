//! Water Quality Prediction API
//!
//! Classifies water potability from sensor readings with two pre-trained
//! models, filling in the dissolved-solids reading from live telemetry.
//!
//! ## Architecture
//!
//! ```text
//! POST /predict → PredictionService ─┬→ TelemetrySource (TDS, fallback 0)
//!                                    ├→ validate (9 features, fail-fast)
//!                                    └→ PredictionEngine (decision tree + KNN)
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod server;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod types_tests;
#[cfg(test)]
mod config_tests;
