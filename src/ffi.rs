//! FFI bindings for pulsecurve
//!
//! This module provides C-compatible functions for calling pulsecurve from
//! other languages (the desktop shell links against the cdylib). Input
//! buffers are raw bytes with explicit lengths because DATA/CF1 files may
//! contain embedded NULs; returned strings are allocated and must be freed
//! by the caller using `pulsecurve_free_string`.

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use std::slice;

use crate::error::AnalysisError;
use crate::impact::{detect_impact_checked, DetectorConfig};
use crate::pipeline::analyze_brake_data;
use crate::sequence::parse_raw_sequence;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to view a raw pointer/length pair as a byte slice
unsafe fn bytes_from_raw<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(slice::from_raw_parts(ptr, len))
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Analysis API
// ============================================================================

/// Analyze a DATA/CF1 input pair and return the report as JSON.
///
/// # Safety
/// - `data` must point to `data_len` readable bytes, `cf1` to `cf1_len`
///   readable bytes (either pointer may be NULL only when its length is 0).
/// - Returns a newly allocated string that must be freed with
///   `pulsecurve_free_string`.
/// - Returns NULL on error; call `pulsecurve_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn pulsecurve_analyze(
    data: *const u8,
    data_len: usize,
    cf1: *const u8,
    cf1_len: usize,
) -> *mut c_char {
    clear_last_error();

    let data_bytes = match bytes_from_raw(data, data_len) {
        Some(b) => b,
        None => {
            set_last_error("Invalid DATA buffer pointer");
            return ptr::null_mut();
        }
    };

    let cf1_bytes = match bytes_from_raw(cf1, cf1_len) {
        Some(b) => b,
        None => {
            set_last_error("Invalid CF1 buffer pointer");
            return ptr::null_mut();
        }
    };

    let report = match analyze_brake_data(data_bytes, cf1_bytes) {
        Ok(report) => report,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match report.to_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Detect the impact point in a DATA stream and return it as JSON.
///
/// A sequence shorter than the detector window reports the
/// insufficient-data error; a completed scan without a match returns the
/// JSON literal `null`.
///
/// # Safety
/// - `data` must point to `data_len` readable bytes (NULL only when
///   `data_len` is 0).
/// - Returns a newly allocated string that must be freed with
///   `pulsecurve_free_string`.
/// - Returns NULL on error; call `pulsecurve_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn pulsecurve_detect_impact(
    data: *const u8,
    data_len: usize,
    threshold: f64,
) -> *mut c_char {
    clear_last_error();

    let data_bytes = match bytes_from_raw(data, data_len) {
        Some(b) => b,
        None => {
            set_last_error("Invalid DATA buffer pointer");
            return ptr::null_mut();
        }
    };

    let result = parse_raw_sequence(data_bytes).and_then(|sequence| {
        detect_impact_checked(&sequence, &DetectorConfig::with_threshold(threshold))
    });

    match result {
        Ok(impact) => match serde_json::to_string(&impact).map_err(AnalysisError::from) {
            Ok(json) => string_to_cstr(&json),
            Err(e) => {
                set_last_error(&e.to_string());
                ptr::null_mut()
            }
        },
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by pulsecurve functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a pulsecurve function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulsecurve_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next pulsecurve call on this
///   thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulsecurve_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the pulsecurve library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulsecurve_version() -> *const c_char {
    // Use a static CString to avoid allocation
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
