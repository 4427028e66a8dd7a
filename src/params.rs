//! CF1 parameter parsing
//!
//! Extracts the sparse drive-controller parameter map from a CF1 stream.
//! Lines look like `P0251;670;...`; anything that does not start with `P`
//! or does not carry a parseable integer in its second field is skipped.

use crate::decoder::decode_bytes;
use crate::error::AnalysisError;
use crate::types::ParameterMap;

/// Nominal speed, mm/s
pub const PARAM_SPEED: &str = "P0251";
/// Motor speed, rpm
pub const PARAM_MOTOR_RPM: &str = "P0360";
/// Holes per wheel revolution
pub const PARAM_HOLES_PER_REV: &str = "P0361";
/// Pulse frequency, Hz
pub const PARAM_PULSE_HZ: &str = "P0544";

/// Fallback hole count when `P0361` is absent or zero.
pub const DEFAULT_HOLES_PER_REV: i32 = 4;

/// Parse a CF1 byte stream into a parameter map.
///
/// Fails only when the byte stream itself cannot be decoded; unparseable
/// lines are skipped, and a repeated identifier keeps its last value.
/// `P0361` is guaranteed present in the result: absent or zero values are
/// replaced by [`DEFAULT_HOLES_PER_REV`]. No other parameter is defaulted.
pub fn parse_parameters(bytes: &[u8]) -> Result<ParameterMap, AnalysisError> {
    let text = decode_bytes(bytes)?;
    let mut params = ParameterMap::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with('P') {
            continue;
        }
        let mut fields = line.split(';');
        let id = match fields.next() {
            Some(id) => id.trim(),
            None => continue,
        };
        let value_field = match fields.next() {
            Some(v) if !v.trim().is_empty() => v.trim(),
            _ => continue,
        };
        match value_field.parse::<i32>() {
            Ok(value) => params.insert(id, value),
            Err(_) => continue,
        }
    }

    match params.get(PARAM_HOLES_PER_REV) {
        None | Some(0) => params.insert(PARAM_HOLES_PER_REV, DEFAULT_HOLES_PER_REV),
        Some(_) => {}
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parameters() {
        let text = b"P0251;670\nP0360;1500\nP0361;4\nP0544;5017\n";
        let params = parse_parameters(text).unwrap();
        assert_eq!(params.get(PARAM_SPEED), Some(670));
        assert_eq!(params.get(PARAM_MOTOR_RPM), Some(1500));
        assert_eq!(params.get(PARAM_HOLES_PER_REV), Some(4));
        assert_eq!(params.get(PARAM_PULSE_HZ), Some(5017));
    }

    #[test]
    fn test_extra_fields_and_whitespace() {
        let text = b"  P0251 ; 670 ; comment ; more \n";
        let params = parse_parameters(text).unwrap();
        assert_eq!(params.get(PARAM_SPEED), Some(670));
    }

    #[test]
    fn test_non_parameter_lines_skipped() {
        let text = b"# header\nQ0001;5\nP0251;670\n\nnoise\n";
        let params = parse_parameters(text).unwrap();
        assert_eq!(params.get(PARAM_SPEED), Some(670));
        assert!(!params.contains("Q0001"));
    }

    #[test]
    fn test_unparseable_value_skipped() {
        let text = b"P0251;abc\nP0544;900\n";
        let params = parse_parameters(text).unwrap();
        assert_eq!(params.get(PARAM_SPEED), None);
        assert_eq!(params.get(PARAM_PULSE_HZ), Some(900));
    }

    #[test]
    fn test_blank_second_field_skipped() {
        let text = b"P0251;;670\nP0251; \n";
        let params = parse_parameters(text).unwrap();
        assert_eq!(params.get(PARAM_SPEED), None);
    }

    #[test]
    fn test_duplicate_identifier_last_wins() {
        let text = b"P0251;100\nP0251;670\n";
        let params = parse_parameters(text).unwrap();
        assert_eq!(params.get(PARAM_SPEED), Some(670));
    }

    #[test]
    fn test_holes_per_rev_defaults_when_absent() {
        let params = parse_parameters(b"P0251;670\n").unwrap();
        assert_eq!(params.get(PARAM_HOLES_PER_REV), Some(DEFAULT_HOLES_PER_REV));
    }

    #[test]
    fn test_holes_per_rev_defaults_when_zero() {
        let params = parse_parameters(b"P0361;0\n").unwrap();
        assert_eq!(params.get(PARAM_HOLES_PER_REV), Some(DEFAULT_HOLES_PER_REV));
    }

    #[test]
    fn test_holes_per_rev_defaults_when_unparseable() {
        let params = parse_parameters(b"P0361;xyz\n").unwrap();
        assert_eq!(params.get(PARAM_HOLES_PER_REV), Some(DEFAULT_HOLES_PER_REV));
    }

    #[test]
    fn test_holes_per_rev_kept_when_non_zero() {
        let params = parse_parameters(b"P0361;6\n").unwrap();
        assert_eq!(params.get(PARAM_HOLES_PER_REV), Some(6));
    }

    #[test]
    fn test_utf16_cf1_stream() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "P0544;5017\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let params = parse_parameters(&bytes).unwrap();
        assert_eq!(params.get(PARAM_PULSE_HZ), Some(5017));
    }

    #[test]
    fn test_negative_value() {
        let params = parse_parameters(b"P0999;-12\n").unwrap();
        assert_eq!(params.get("P0999"), Some(-12));
    }
}
