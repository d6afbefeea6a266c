//! FFI bindings for circadian-lights
//!
//! This module provides C-compatible functions for building and evaluating
//! light schedules from other languages. Schedules are built from a JSON
//! [`LightConfig`] and handed out as opaque handles; strings returned by
//! these functions must be freed with `lights_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::slice;

use crate::config::LightConfig;
use crate::error::ConfigError;
use crate::light::Light;

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

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// `NaN` from C means "no repeat period"
fn repeat_period(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

// ============================================================================
// Schedule Handles
// ============================================================================

/// Opaque handle to a built light schedule
pub struct LightHandle {
    light: Light,
}

/// Build a light schedule from a JSON configuration.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `lights_free`.
/// - Returns NULL on error; call `lights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lights_build(config_json: *const c_char) -> *mut LightHandle {
    clear_last_error();

    let json_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid configuration string pointer");
            return ptr::null_mut();
        }
    };

    let built = LightConfig::from_json(&json_str)
        .and_then(|config| config.build().map_err(ConfigError::from));
    let light = match built {
        Ok(light) => light,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    Box::into_raw(Box::new(LightHandle { light }))
}

/// Free a light schedule.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `lights_build`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lights_free(handle: *mut LightHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Evaluate a schedule at `len` times, writing intensities into `out`.
///
/// Pass `NaN` as `repeat_period` to evaluate without periodic wrapping.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `lights_build`.
/// - `times` and `out` must each point to at least `len` doubles.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `lights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lights_evaluate(
    handle: *const LightHandle,
    times: *const f64,
    len: usize,
    repeat: f64,
    out: *mut f64,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null schedule pointer");
        return -1;
    }
    if len > 0 && (times.is_null() || out.is_null()) {
        set_last_error("Null buffer pointer");
        return -1;
    }
    if len == 0 {
        return 0;
    }

    let handle = &*handle;
    let times = slice::from_raw_parts(times, len);

    match handle.light.evaluate(times, repeat_period(repeat)) {
        Ok(values) => {
            slice::from_raw_parts_mut(out, len).copy_from_slice(&values);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Sample a schedule at `num_samples` evenly spaced times between `from`
/// and `to` and return the samples as JSON (`{"times": [...], "values": [...]}`).
///
/// # Safety
/// - `handle` must be a valid pointer returned by `lights_build`.
/// - Returns a newly allocated string that must be freed with `lights_free_string`.
/// - Returns NULL on error; call `lights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lights_sample_json(
    handle: *const LightHandle,
    from: f64,
    to: f64,
    num_samples: usize,
    repeat: f64,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null schedule pointer");
        return ptr::null_mut();
    }

    let handle = &*handle;
    let samples = match handle
        .light
        .sample(Some(from), Some(to), repeat_period(repeat), num_samples)
    {
        Ok(samples) => samples,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&samples) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by lights functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a lights function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lights_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next lights function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn lights_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn lights_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn regular_config() -> CString {
        CString::new(r#"{"protocol": "regular", "lux": 150.0, "lights_on": 8.0, "lights_off": 16.0}"#)
            .unwrap()
    }

    #[test]
    fn test_ffi_build_and_evaluate() {
        let config = regular_config();

        unsafe {
            let handle = lights_build(config.as_ptr());
            assert!(!handle.is_null());

            let times = [2.0, 10.0, 34.0];
            let mut out = [f64::NAN; 3];
            let status = lights_evaluate(handle, times.as_ptr(), times.len(), 24.0, out.as_mut_ptr());
            assert_eq!(status, 0);
            assert_eq!(out, [0.0, 150.0, 150.0]);

            let status = lights_evaluate(handle, times.as_ptr(), times.len(), f64::NAN, out.as_mut_ptr());
            assert_eq!(status, 0);
            assert_eq!(out, [0.0, 150.0, 0.0]);

            lights_free(handle);
        }
    }

    #[test]
    fn test_ffi_sample_json() {
        let config = regular_config();

        unsafe {
            let handle = lights_build(config.as_ptr());
            let result = lights_sample_json(handle, 0.0, 24.0, 5, f64::NAN);
            assert!(!result.is_null());

            let json = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(json).unwrap();
            assert_eq!(value["times"].as_array().unwrap().len(), 5);
            assert_eq!(value["values"][2], 150.0);

            lights_free_string(result);
            lights_free(handle);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid = CString::new(r#"{"protocol": "regular", "lux": -1.0}"#).unwrap();
            let handle = lights_build(invalid.as_ptr());
            assert!(handle.is_null());

            let error = lights_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("lux"));

            let status = lights_evaluate(ptr::null(), ptr::null(), 0, f64::NAN, ptr::null_mut());
            assert_eq!(status, -1);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = lights_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
