//! Analysis report encoding
//!
//! Assembles the outputs of the numeric stages into a single report
//! structure with producer and provenance metadata, and serializes it to
//! JSON for shells and downstream tooling.

use crate::error::AnalysisError;
use crate::params::{PARAM_HOLES_PER_REV, PARAM_MOTOR_RPM, PARAM_PULSE_HZ, PARAM_SPEED};
use crate::types::{
    AnalysisReport, Calibration, Curve, ImpactResult, ParameterEcho, ParameterMap, RawSequence,
    ReportProducer, ReportProvenance, SequenceSummary,
};
use crate::{PRODUCER_NAME, PULSECURVE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Report encoder carrying a stable instance id across reports.
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Assemble a report from the stage outputs.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        &self,
        params: &ParameterMap,
        sequence: &RawSequence,
        calibration: Option<Calibration>,
        curve: Curve,
        impact: Option<ImpactResult>,
        braking_distance_cm: Option<f64>,
        flags: Vec<String>,
    ) -> AnalysisReport {
        AnalysisReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PULSECURVE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                computed_at_utc: Utc::now().to_rfc3339(),
            },
            parameters: ParameterEcho {
                speed_mm_s: params.get(PARAM_SPEED),
                motor_rpm: params.get(PARAM_MOTOR_RPM),
                holes_per_rev: params.get(PARAM_HOLES_PER_REV),
                pulse_hz: params.get(PARAM_PULSE_HZ),
            },
            sequence: summarize(sequence),
            calibration,
            curve,
            impact,
            braking_distance_cm,
            flags,
        }
    }
}

fn summarize(sequence: &RawSequence) -> SequenceSummary {
    SequenceSummary {
        kept: sequence.len(),
        non_zero: sequence.non_zero_count(),
        min: sequence.counts().iter().min().copied(),
        max: sequence.counts().iter().max().copied(),
    }
}

impl AnalysisReport {
    /// Serialize the report to a JSON string.
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_carries_metadata_and_summary() {
        let mut params = ParameterMap::new();
        params.insert(PARAM_SPEED, 670);
        params.insert(PARAM_PULSE_HZ, 900);
        let sequence = RawSequence::new(vec![100, 0, 200]);

        let encoder = ReportEncoder::with_instance_id("inst-1".to_string());
        let report = encoder.encode(
            &params,
            &sequence,
            None,
            Curve::default(),
            None,
            None,
            vec!["invalid_calibration".to_string()],
        );

        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "inst-1");
        assert_eq!(report.parameters.speed_mm_s, Some(670));
        assert_eq!(report.parameters.motor_rpm, None);
        assert_eq!(report.sequence.kept, 3);
        assert_eq!(report.sequence.non_zero, 2);
        assert_eq!(report.sequence.min, Some(0));
        assert_eq!(report.sequence.max, Some(200));
        assert_eq!(report.flags, vec!["invalid_calibration"]);
    }

    #[test]
    fn test_report_json_round_trip() {
        let encoder = ReportEncoder::new();
        let report = encoder.encode(
            &ParameterMap::new(),
            &RawSequence::default(),
            None,
            Curve::default(),
            None,
            None,
            Vec::new(),
        );

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["sequence"]["kept"], 0);
        assert!(value["calibration"].is_null());
        assert!(value["braking_distance_cm"].is_null());
    }

    #[test]
    fn test_default_encoder_has_unique_instance_ids() {
        let a = ReportEncoder::new();
        let b = ReportEncoder::new();
        assert_ne!(a.instance_id, b.instance_id);
    }
}
