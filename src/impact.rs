//! Impact detection and braking distance
//!
//! Slides a 16-sample window over the pulse-interval sequence looking for
//! the signature of sudden deceleration: the second half of the window
//! pulling away from the first half in at least 3 of 4 paired delta
//! comparisons. Pulse intervals lengthen sharply as the mechanism
//! decelerates, so the ratios spike at the onset.

use crate::error::AnalysisError;
use crate::types::{Calibration, ImpactDiagnostics, ImpactResult, RawSequence};

/// Samples per detection window.
pub const WINDOW_LEN: usize = 16;

/// Offset of the reported impact index within a matching window.
pub const IMPACT_OFFSET: usize = 13;

/// Offset used by the earlier detector variant. Selectable through
/// [`DetectorConfig`], never the default.
pub const LEGACY_IMPACT_OFFSET: usize = 12;

/// Default ratio threshold.
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Detector tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Ratio threshold; a window matches when at least 3 of 4 ratios
    /// exceed it.
    pub threshold: f64,
    /// Offset added to the window start to form the reported index.
    pub impact_offset: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            impact_offset: IMPACT_OFFSET,
        }
    }
}

impl DetectorConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

/// Scan a sequence for the onset of deceleration.
///
/// Returns `None` when the sequence is shorter than [`WINDOW_LEN`], when no
/// window matches, or when a zero 16th window element ends the scan before
/// a match.
pub fn detect_impact(sequence: &RawSequence, threshold: f64) -> Option<ImpactResult> {
    detect_impact_with(sequence, &DetectorConfig::with_threshold(threshold))
}

/// Scan with an explicit detector configuration.
pub fn detect_impact_with(
    sequence: &RawSequence,
    config: &DetectorConfig,
) -> Option<ImpactResult> {
    let counts = sequence.counts();
    if counts.len() < WINDOW_LEN {
        return None;
    }

    let non_zero_count = sequence.non_zero_count();

    for (i, window) in counts.windows(WINDOW_LEN).enumerate() {
        // A zero at the window tail means motion has ended: stop scanning
        // entirely, even if a later window would match.
        if window[WINDOW_LEN - 1] == 0 {
            return None;
        }

        let mut deltas = [0_i64; 8];
        for (j, delta) in deltas.iter_mut().enumerate() {
            *delta = window[j + 8] as i64 - window[j] as i64;
        }

        let mut ratios = [0.0_f64; 4];
        for (j, ratio) in ratios.iter_mut().enumerate() {
            // Zero denominator contributes a zero ratio and never counts
            // toward the threshold.
            *ratio = if deltas[j] == 0 {
                0.0
            } else {
                deltas[j + 4] as f64 / deltas[j] as f64
            };
        }

        let above_threshold = ratios.iter().filter(|&&c| c > config.threshold).count() as u32;

        if above_threshold >= 3 {
            let mut window_values = [0_i32; WINDOW_LEN];
            window_values.copy_from_slice(window);
            return Some(ImpactResult {
                index: i + config.impact_offset,
                non_zero_count,
                diagnostics: ImpactDiagnostics {
                    window: window_values,
                    deltas,
                    ratios,
                    above_threshold,
                },
            });
        }
    }

    None
}

/// Like [`detect_impact_with`], but reports a sequence shorter than
/// [`WINDOW_LEN`] as a typed error so callers can tell "not enough data"
/// apart from "no impact". Used by the FFI and CLI surfaces.
pub fn detect_impact_checked(
    sequence: &RawSequence,
    config: &DetectorConfig,
) -> Result<Option<ImpactResult>, AnalysisError> {
    if sequence.len() < WINDOW_LEN {
        return Err(AnalysisError::InsufficientData {
            needed: WINDOW_LEN,
            got: sequence.len(),
        });
    }
    Ok(detect_impact_with(sequence, config))
}

/// Distance travelled between the impact point and the end of recorded
/// motion, centimeters.
///
/// Sign is not validated: a negative result signals an impact index past
/// the end of motion and is surfaced as-is.
pub fn braking_distance(
    non_zero_count: usize,
    impact_index: usize,
    calibration: &Calibration,
) -> f64 {
    (non_zero_count as i64 - impact_index as i64) as f64 * calibration.cm_per_pulse
}
