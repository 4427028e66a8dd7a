//! Distance-per-pulse calibration
//!
//! Derives the physical distance travelled between two consecutive encoder
//! pulses from the drive-controller parameters. Two mutually exclusive
//! formulas exist; the thousands digit of the pulse frequency selects
//! between them.

use crate::error::AnalysisError;
use crate::params::{PARAM_HOLES_PER_REV, PARAM_MOTOR_RPM, PARAM_PULSE_HZ, PARAM_SPEED};
use crate::types::{Calibration, CalibrationCase, ParameterMap};

/// Compute the distance per pulse in centimeters.
///
/// Requires `P0251` (speed, mm/s) and `P0544` (pulse frequency, Hz), both
/// non-zero. When the thousands digit of `P0544` is non-zero the geared
/// formula applies and `P0360` (motor rpm) and `P0361` (holes per
/// revolution) are additionally required; otherwise the direct formula
/// divides speed by pulse rate.
pub fn calibrate(params: &ParameterMap) -> Result<Calibration, AnalysisError> {
    let speed = require_non_zero(params, PARAM_SPEED)?;
    let pulse_hz = require_non_zero(params, PARAM_PULSE_HZ)?;

    let thousands_digit = (pulse_hz / 1000) % 10;
    if thousands_digit > 0 {
        let motor_rpm = require_non_zero(params, PARAM_MOTOR_RPM)?;
        let holes_per_rev = require_non_zero(params, PARAM_HOLES_PER_REV)?;
        // (speed mm/s -> cm) * 60 s/min over pulses per minute
        let cm_per_pulse =
            (speed as f64 * 6.0) / (motor_rpm as f64 * holes_per_rev as f64);
        Ok(Calibration {
            cm_per_pulse,
            case: CalibrationCase::GearedEncoder,
        })
    } else {
        let cm_per_pulse = speed as f64 / pulse_hz as f64 / 10.0;
        Ok(Calibration {
            cm_per_pulse,
            case: CalibrationCase::DirectPulse,
        })
    }
}

fn require_non_zero(params: &ParameterMap, id: &str) -> Result<i32, AnalysisError> {
    match params.get(id) {
        None => Err(AnalysisError::MissingParameter(id.to_string())),
        Some(0) => Err(AnalysisError::InvalidCalibration(format!("{id} is zero"))),
        Some(v) => Ok(v),
    }
}
