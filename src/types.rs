//! Core types for the pulsecurve pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: the parameter map, the raw pulse sequence, calibration, the
//! time/velocity curve, impact detection results, and the analysis report.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sparse drive-controller parameter map parsed from a CF1 stream.
///
/// Keys are parameter identifiers as they appear in the file (e.g. `"P0251"`),
/// values are base-10 integers. Identifiers are unique; when a file repeats
/// an identifier the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMap(HashMap<String, i32>);

impl ParameterMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Look up a parameter value by identifier.
    pub fn get(&self, id: &str) -> Option<i32> {
        self.0.get(id).copied()
    }

    /// Insert or overwrite a parameter value.
    pub fn insert(&mut self, id: impl Into<String>, value: i32) {
        self.0.insert(id.into(), value);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered pulse-interval counts parsed from a DATA stream.
///
/// One entry per valid numeric line, unit 0.0125 ms per count, already
/// truncated by the policy selected at parse time. Immutable after
/// construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSequence(Vec<i32>);

impl RawSequence {
    pub fn new(counts: Vec<i32>) -> Self {
        Self(counts)
    }

    /// Pulse-interval counts in file order.
    pub fn counts(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-zero entries across the whole sequence.
    pub fn non_zero_count(&self) -> usize {
        self.0.iter().filter(|&&c| c != 0).count()
    }
}

impl From<Vec<i32>> for RawSequence {
    fn from(counts: Vec<i32>) -> Self {
        Self(counts)
    }
}

/// Which physical model produced a calibration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationCase {
    /// Pulse frequency in the thousands: distance derived from motor rpm
    /// and holes per revolution.
    GearedEncoder,
    /// Low pulse frequency: distance derived directly from speed over
    /// pulse rate.
    DirectPulse,
}

impl CalibrationCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationCase::GearedEncoder => "geared_encoder",
            CalibrationCase::DirectPulse => "direct_pulse",
        }
    }
}

/// Distance travelled between two consecutive encoder pulses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Distance per pulse in centimeters, strictly positive.
    pub cm_per_pulse: f64,
    /// Formula branch that produced the value.
    pub case: CalibrationCase,
}

/// Calibrated time/velocity curve.
///
/// `times_s` and `velocities_mm_s` always have equal length; points with a
/// non-finite member are dropped from both in lock-step at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Cumulative elapsed time per sample, seconds, non-decreasing.
    pub times_s: Vec<f64>,
    /// Instantaneous velocity per sample, mm/s, non-negative.
    pub velocities_mm_s: Vec<f64>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.times_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times_s.is_empty()
    }

    /// Index of the curve point whose time is nearest to `t` seconds.
    ///
    /// Used by presentation shells that let the operator reposition the
    /// impact marker and recompute the braking distance from the new index.
    pub fn nearest_time_index(&self, t: f64) -> Option<usize> {
        if self.times_s.is_empty() {
            return None;
        }
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, &time) in self.times_s.iter().enumerate() {
            let dist = (time - t).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        Some(best)
    }
}

/// Raw values the detector saw at the impact window.
///
/// Carries everything a shell needs to render the detection rationale, so
/// the core never writes diagnostics to stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactDiagnostics {
    /// The 16 pulse-interval counts of the matching window.
    pub window: [i32; 16],
    /// Second-half minus first-half deltas, `b_j = window[j+8] - window[j]`.
    pub deltas: [i64; 8],
    /// Paired delta ratios, `c_j = b_{j+4} / b_j` (0 when `b_j` is 0).
    pub ratios: [f64; 4],
    /// How many ratios exceeded the detection threshold.
    pub above_threshold: u32,
}

/// Result of a successful impact scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Index of the detected deceleration onset within the full sequence.
    pub index: usize,
    /// Non-zero entries across the whole sequence, independent of the scan.
    pub non_zero_count: usize,
    /// Window values, deltas, and ratios at the matching offset.
    pub diagnostics: ImpactDiagnostics,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub computed_at_utc: String,
}

/// Summary of the parsed raw sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSummary {
    /// Entries kept after truncation.
    pub kept: usize,
    /// Non-zero entries among the kept values.
    pub non_zero: usize,
    /// Smallest kept count, if any.
    pub min: Option<i32>,
    /// Largest kept count, if any.
    pub max: Option<i32>,
}

/// Echo of the calibration-relevant parameters, absent when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterEcho {
    /// P0251 - nominal speed (mm/s)
    pub speed_mm_s: Option<i32>,
    /// P0360 - motor speed (rpm)
    pub motor_rpm: Option<i32>,
    /// P0361 - holes per wheel revolution
    pub holes_per_rev: Option<i32>,
    /// P0544 - pulse frequency (Hz)
    pub pulse_hz: Option<i32>,
}

/// Complete analysis report for one DATA/CF1 input pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub parameters: ParameterEcho,
    pub sequence: SequenceSummary,
    /// Calibration, absent when the parameter set cannot produce one.
    pub calibration: Option<Calibration>,
    /// Empty when the calibration is absent.
    pub curve: Curve,
    /// Absent when no impact was detected.
    pub impact: Option<ImpactResult>,
    /// `(non_zero - impact_index) * cm_per_pulse`; absent without both an
    /// impact and a calibration. May be negative.
    pub braking_distance_cm: Option<f64>,
    /// Degradation flags, e.g. `"invalid_calibration"`.
    pub flags: Vec<String>,
}
