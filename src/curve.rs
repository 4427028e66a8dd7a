//! Brake curve synthesis
//!
//! Combines the raw pulse-interval sequence with the calibration into a
//! cumulative time / instantaneous velocity curve.

use crate::calibration::calibrate;
use crate::types::{Calibration, Curve, ParameterMap, RawSequence};

/// Duration of one pulse-interval count, milliseconds.
pub const COUNT_UNIT_MS: f64 = 0.0125;

/// Generate the brake curve for a sequence under the given parameters.
///
/// An invalid calibration yields an empty curve rather than an error so
/// shells can render a partial state.
pub fn generate_curve(sequence: &RawSequence, params: &ParameterMap) -> Curve {
    match calibrate(params) {
        Ok(cal) => generate_curve_with(sequence, &cal),
        Err(_) => Curve::default(),
    }
}

/// Generate the brake curve from an already-computed calibration.
pub fn generate_curve_with(sequence: &RawSequence, calibration: &Calibration) -> Curve {
    let mut times_s = Vec::with_capacity(sequence.len());
    let mut velocities_mm_s = Vec::with_capacity(sequence.len());

    let mut t_cumulative = 0.0_f64;
    for &count in sequence.counts() {
        let dt_s = count as f64 * COUNT_UNIT_MS / 1000.0;
        t_cumulative += dt_s;

        // Per-interval velocity, mm/s: cm -> mm over the elapsed seconds of
        // this single interval. Zero counts carry zero velocity but still
        // produce a curve point.
        let velocity = if count == 0 {
            0.0
        } else {
            (calibration.cm_per_pulse * 100.0) / dt_s
        };

        if t_cumulative.is_finite() && velocity.is_finite() {
            times_s.push(t_cumulative);
            velocities_mm_s.push(velocity);
        }
    }

    Curve {
        times_s,
        velocities_mm_s,
    }
}
