//! DATA stream parsing and sequence truncation
//!
//! Turns a raw DATA byte stream into an ordered pulse-interval sequence.
//! After the line scan a truncation policy decides where the recording
//! effectively ends; the windowed-prefix policy is the canonical one and
//! anchors the impact detector's window indexing.

use crate::decoder::decode_bytes;
use crate::error::AnalysisError;
use crate::types::RawSequence;

/// Entries kept unconditionally before the truncation rule engages.
pub const TRUNCATION_PREFIX_LEN: usize = 16;

/// Slack added to a value before comparing against the last kept value.
/// Compensates for a known small noise artifact in the source instrument.
pub const DROP_SLACK: i32 = 50;

/// How the line-scanned values are truncated into the final sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Keep the first [`TRUNCATION_PREFIX_LEN`] values unconditionally, then
    /// stop at the first zero (dropped) or at the first value more than
    /// [`DROP_SLACK`] below the last kept value (kept, then stop).
    #[default]
    WindowedPrefix,
    /// Earlier variant: drop values equal to their immediate predecessor.
    /// Selectable for comparison against old recordings, never the default.
    DedupConsecutive,
}

/// Parse a DATA byte stream with the canonical truncation policy.
pub fn parse_raw_sequence(bytes: &[u8]) -> Result<RawSequence, AnalysisError> {
    parse_raw_sequence_with(bytes, TruncationPolicy::WindowedPrefix)
}

/// Parse a DATA byte stream with an explicit truncation policy.
///
/// Blank and non-numeric lines are skipped; fails only when the byte stream
/// cannot be decoded.
pub fn parse_raw_sequence_with(
    bytes: &[u8],
    policy: TruncationPolicy,
) -> Result<RawSequence, AnalysisError> {
    let text = decode_bytes(bytes)?;
    let raw = scan_lines(&text);
    let counts = match policy {
        TruncationPolicy::WindowedPrefix => truncate_windowed_prefix(&raw),
        TruncationPolicy::DedupConsecutive => dedup_consecutive(&raw),
    };
    Ok(RawSequence::new(counts))
}

/// Parse every line as an optional integer, skipping blanks and non-numeric
/// lines.
fn scan_lines(text: &str) -> Vec<i32> {
    text.lines()
        .filter_map(|line| line.trim().parse::<i32>().ok())
        .collect()
}

/// Canonical truncation: unconditional 16-prefix, then stop on zero or on a
/// drop of more than [`DROP_SLACK`] below the running last kept value.
fn truncate_windowed_prefix(raw: &[i32]) -> Vec<i32> {
    let (prefix, tail) = if raw.len() >= TRUNCATION_PREFIX_LEN {
        raw.split_at(TRUNCATION_PREFIX_LEN)
    } else {
        // Too short for a prefix: the rule applies from the first element.
        raw.split_at(0)
    };

    let mut kept: Vec<i32> = prefix.to_vec();
    let mut last = kept.last().copied();

    for &v in tail {
        if v == 0 {
            break;
        }
        if let Some(l) = last {
            if v + DROP_SLACK < l {
                // Decreasing/impact tail: keep the first dropped-off value,
                // then stop.
                kept.push(v);
                break;
            }
        }
        kept.push(v);
        last = Some(v);
    }

    kept
}

/// Legacy truncation: keep the first value, drop consecutive duplicates.
fn dedup_consecutive(raw: &[i32]) -> Vec<i32> {
    let mut kept: Vec<i32> = Vec::with_capacity(raw.len());
    for &v in raw {
        if kept.last() != Some(&v) {
            kept.push(v);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data_text(counts: &[i32]) -> Vec<u8> {
        counts
            .iter()
            .map(|c| format!("{c}\n"))
            .collect::<String>()
            .into_bytes()
    }

    #[test]
    fn test_prefix_kept_unconditionally() {
        // Zeros and drops inside the first 16 must survive
        let mut counts = vec![100, 0, 5, 200, 100, 3, 0, 9, 8, 7, 6, 5, 4, 3, 2, 1];
        counts.push(1);
        let seq = parse_raw_sequence(&data_text(&counts)).unwrap();
        assert_eq!(&seq.counts()[..16], &counts[..16]);
        assert_eq!(seq.len(), 17);
    }

    #[test]
    fn test_zero_after_prefix_stops_and_is_dropped() {
        let mut counts = vec![100; 16];
        counts.extend([101, 0, 102, 103]);
        let seq = parse_raw_sequence(&data_text(&counts)).unwrap();
        assert_eq!(seq.len(), 17);
        assert_eq!(seq.counts()[16], 101);
    }

    #[test]
    fn test_drop_beyond_slack_keeps_value_then_stops() {
        let mut counts = vec![200; 16];
        counts.extend([210, 159, 300, 400]);
        // 159 + 50 < 210, so 159 is appended and the scan stops
        let seq = parse_raw_sequence(&data_text(&counts)).unwrap();
        assert_eq!(seq.len(), 18);
        assert_eq!(seq.counts()[17], 159);
    }

    #[test]
    fn test_drop_within_slack_continues() {
        let mut counts = vec![200; 16];
        counts.extend([210, 160, 170]);
        // 160 + 50 == 210, not strictly below, scan continues
        let seq = parse_raw_sequence(&data_text(&counts)).unwrap();
        assert_eq!(seq.len(), 19);
    }

    #[test]
    fn test_short_sequence_applies_rule_from_start() {
        let seq = parse_raw_sequence(&data_text(&[100, 101, 0, 102])).unwrap();
        assert_eq!(seq.counts(), &[100, 101]);

        let seq = parse_raw_sequence(&data_text(&[200, 100, 300])).unwrap();
        assert_eq!(seq.counts(), &[200, 100]);
    }

    #[test]
    fn test_short_sequence_leading_zero_yields_empty() {
        let seq = parse_raw_sequence(&data_text(&[0, 100, 200])).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_blank_and_non_numeric_lines_skipped() {
        let bytes = b"100\n\nabc\n 101 \n1.5\n102\n";
        let seq = parse_raw_sequence(bytes).unwrap();
        assert_eq!(seq.counts(), &[100, 101, 102]);
    }

    #[test]
    fn test_negative_values_parse() {
        let seq = parse_raw_sequence(b"-5\n-4\n").unwrap();
        assert_eq!(seq.counts(), &[-5, -4]);
    }

    #[test]
    fn test_truncation_idempotent_without_triggers() {
        let mut counts: Vec<i32> = (0..30).map(|i| 200 + i).collect();
        counts[20] = 0; // triggers the stop once
        let first = parse_raw_sequence(&data_text(&counts)).unwrap();
        let second = parse_raw_sequence(&data_text(first.counts())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dedup_policy_drops_consecutive_duplicates() {
        let seq = parse_raw_sequence_with(
            &data_text(&[100, 100, 101, 101, 101, 100]),
            TruncationPolicy::DedupConsecutive,
        )
        .unwrap();
        assert_eq!(seq.counts(), &[100, 101, 100]);
    }

    #[test]
    fn test_dedup_policy_keeps_zeros() {
        let seq = parse_raw_sequence_with(
            &data_text(&[100, 0, 0, 100]),
            TruncationPolicy::DedupConsecutive,
        )
        .unwrap();
        assert_eq!(seq.counts(), &[100, 0, 100]);
    }

    #[test]
    fn test_empty_input_yields_empty_sequence() {
        let seq = parse_raw_sequence(b"").unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_utf16_data_stream() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "100\n101\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let seq = parse_raw_sequence(&bytes).unwrap();
        assert_eq!(seq.counts(), &[100, 101]);
    }

    #[test]
    fn test_non_zero_count_spans_whole_sequence() {
        let mut counts = vec![100; 16];
        counts[3] = 0;
        let seq = parse_raw_sequence(&data_text(&counts)).unwrap();
        assert_eq!(seq.non_zero_count(), 15);
    }
}
