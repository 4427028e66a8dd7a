//! Byte stream decoding
//!
//! DATA and CF1 files come off the drive controller either as UTF-16LE with
//! a BOM or as an unlabeled single-byte encoding. A `FF FE` prefix selects
//! the UTF-16LE path; everything else is decoded as Latin-1 passthrough so
//! arbitrary binary noise still yields a string.

use crate::error::AnalysisError;

/// UTF-16 little-endian byte order mark.
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Decode a raw DATA/CF1 byte stream into text.
///
/// The Latin-1 path cannot fail. The UTF-16LE path fails on an odd-length
/// payload or an unpaired surrogate; that indicates a corrupt file and is
/// surfaced rather than substituted.
pub fn decode_bytes(bytes: &[u8]) -> Result<String, AnalysisError> {
    match bytes.strip_prefix(&UTF16_LE_BOM) {
        Some(rest) => decode_utf16_le(rest),
        None => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}

fn decode_utf16_le(bytes: &[u8]) -> Result<String, AnalysisError> {
    if bytes.len() % 2 != 0 {
        return Err(AnalysisError::Decode(format!(
            "UTF-16LE payload has odd length {}",
            bytes.len()
        )));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    char::decode_utf16(units.into_iter())
        .collect::<Result<String, _>>()
        .map_err(|e| {
            AnalysisError::Decode(format!(
                "invalid UTF-16LE surrogate 0x{:04X}",
                e.unpaired_surrogate()
            ))
        })
}
