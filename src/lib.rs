//! Pulsecurve - Compute core for escalator and lift brake curve analysis
//!
//! Pulsecurve turns a raw brake-encoder pulse log (DATA) and its companion
//! drive-controller parameter file (CF1) into a calibrated time/velocity
//! curve, an impact point, and a braking distance, through a deterministic
//! pipeline: decode → parse → calibrate → curve synthesis → impact
//! detection → braking distance.
//!
//! The crate is the numeric core only; plotting, file pickers, and marker
//! dragging belong to presentation shells that call in through
//! [`analyze_brake_data`], the stage functions re-exported below, or the
//! C FFI in [`ffi`].

pub mod calibration;
pub mod curve;
pub mod decoder;
pub mod error;
pub mod impact;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod sequence;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calibration::calibrate;
pub use curve::generate_curve;
pub use error::AnalysisError;
pub use impact::{braking_distance, detect_impact, DetectorConfig};
pub use params::parse_parameters;
pub use pipeline::{analyze_brake_data, BrakeAnalyzer};
pub use report::ReportEncoder;
pub use sequence::{parse_raw_sequence, TruncationPolicy};
pub use types::{
    AnalysisReport, Calibration, CalibrationCase, Curve, ImpactResult, ParameterMap, RawSequence,
};

/// Pulsecurve version embedded in all reports
pub const PULSECURVE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for analysis reports
pub const PRODUCER_NAME: &str = "pulsecurve";
