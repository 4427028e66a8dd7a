//! Pipeline orchestration
//!
//! This module provides the public API for pulsecurve. It runs the full
//! pipeline from the two raw byte streams (DATA, CF1) to an analysis
//! report: decode → parse → calibrate → curve → impact → braking distance.
//!
//! Each invocation is a pure function of its two inputs; nothing is shared
//! or mutated between calls, so concurrent analyses need no locking.

use crate::calibration::calibrate;
use crate::curve::generate_curve_with;
use crate::error::AnalysisError;
use crate::impact::{braking_distance, detect_impact_with, DetectorConfig, WINDOW_LEN};
use crate::params::parse_parameters;
use crate::report::ReportEncoder;
use crate::sequence::{parse_raw_sequence_with, TruncationPolicy};
use crate::types::{AnalysisReport, Curve};

/// Flag set when the parameter set cannot produce a calibration.
pub const FLAG_INVALID_CALIBRATION: &str = "invalid_calibration";
/// Flag set when the sequence is too short for impact detection.
pub const FLAG_INSUFFICIENT_SAMPLES: &str = "insufficient_samples_for_impact";
/// Flag set when the scan completed without finding an impact.
pub const FLAG_NO_IMPACT: &str = "no_impact_detected";

/// Analyze a DATA/CF1 input pair with default settings.
///
/// # Arguments
/// * `data_bytes` - Raw DATA file contents (pulse-interval counts)
/// * `cf1_bytes` - Raw CF1 file contents (drive-controller parameters)
///
/// # Returns
/// A full analysis report, or an error when a stream cannot be decoded or
/// the DATA stream carries no samples at all.
pub fn analyze_brake_data(
    data_bytes: &[u8],
    cf1_bytes: &[u8],
) -> Result<AnalysisReport, AnalysisError> {
    BrakeAnalyzer::new().analyze(data_bytes, cf1_bytes)
}

/// Configurable analyzer for repeated runs.
///
/// Holds the detector configuration, the truncation policy, and a report
/// encoder whose instance id is stable across reports from the same
/// analyzer.
pub struct BrakeAnalyzer {
    detector: DetectorConfig,
    policy: TruncationPolicy,
    encoder: ReportEncoder,
}

impl Default for BrakeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BrakeAnalyzer {
    /// Create an analyzer with default settings
    pub fn new() -> Self {
        Self {
            detector: DetectorConfig::default(),
            policy: TruncationPolicy::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create an analyzer with a specific detection threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            detector: DetectorConfig::with_threshold(threshold),
            ..Self::new()
        }
    }

    /// Override the detector configuration
    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Override the truncation policy
    pub fn policy(mut self, policy: TruncationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full pipeline on one DATA/CF1 input pair.
    ///
    /// Calibration failure and a too-short sequence degrade to a flagged
    /// report rather than an error, so shells can render a partial state.
    pub fn analyze(
        &self,
        data_bytes: &[u8],
        cf1_bytes: &[u8],
    ) -> Result<AnalysisReport, AnalysisError> {
        let params = parse_parameters(cf1_bytes)?;
        let sequence = parse_raw_sequence_with(data_bytes, self.policy)?;
        if sequence.is_empty() {
            return Err(AnalysisError::EmptySequence);
        }

        let mut flags = Vec::new();

        let calibration = match calibrate(&params) {
            Ok(cal) => Some(cal),
            Err(_) => {
                flags.push(FLAG_INVALID_CALIBRATION.to_string());
                None
            }
        };

        let curve = match calibration {
            Some(ref cal) => generate_curve_with(&sequence, cal),
            None => Curve::default(),
        };

        let impact = if sequence.len() < WINDOW_LEN {
            flags.push(FLAG_INSUFFICIENT_SAMPLES.to_string());
            None
        } else {
            let found = detect_impact_with(&sequence, &self.detector);
            if found.is_none() {
                flags.push(FLAG_NO_IMPACT.to_string());
            }
            found
        };

        let braking_distance_cm = match (&impact, &calibration) {
            (Some(imp), Some(cal)) => {
                Some(braking_distance(imp.non_zero_count, imp.index, cal))
            }
            _ => None,
        };

        Ok(self.encoder.encode(
            &params,
            &sequence,
            calibration,
            curve,
            impact,
            braking_distance_cm,
            flags,
        ))
    }
}
