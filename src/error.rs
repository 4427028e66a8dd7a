//! Error types for pulsecurve

use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to decode byte stream: {0}")]
    Decode(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Insufficient data: need {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Raw sequence contains no samples")]
    EmptySequence,
}
