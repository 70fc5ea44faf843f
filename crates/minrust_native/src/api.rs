//! C ABI surface loaded by minrust hosts.
//!
//! # Responsibility
//! - Expose the toolbox operations through stable `extern "C"` symbols.
//! - Report failures as status codes plus an owned UTF-8 message.
//!
//! # Invariants
//! - Exported functions never unwind across the FFI boundary.
//! - `*out_err` is null on `STATUS_OK` and owns a message otherwise.
//! - Strings handed to the caller are released only via `minrust_string_free`.
//! - A null `out_err` is allowed; the status code is still returned.
//! - Nothing is logged here. A dynamically loaded artifact has no logger
//!   installed, so the host records every outcome with `origin=native`.

use crate::{ABI_VERSION, PROCESS_PREFIX, STATUS_ERROR, STATUS_OK, STATUS_PANIC};
use std::any::Any;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

const PANIC_REQUESTED_MESSAGE: &str = "panic requested by caller";

/// Returns the ABI revision implemented by this artifact.
#[no_mangle]
pub extern "C" fn minrust_abi_version() -> u32 {
    ABI_VERSION
}

/// Adds two integers.
///
/// # FFI contract
/// - Writes the sum to `out` and returns `STATUS_OK`.
/// - Overflow or a null `out` returns `STATUS_ERROR`.
#[no_mangle]
pub extern "C" fn minrust_add(a: i32, b: i32, out: *mut i32, out_err: *mut *mut c_char) -> i32 {
    guard("minrust_add", out_err, || {
        if out.is_null() {
            return Err("out is null".to_string());
        }
        let sum = a
            .checked_add(b)
            .ok_or_else(|| format!("integer overflow: {a} + {b}"))?;
        unsafe {
            *out = sum;
        }
        Ok(())
    })
}

/// Prefixes `input` with `[RUST] ` and returns the result through `out`.
///
/// # FFI contract
/// - `input` must be a NUL-terminated UTF-8 string.
/// - On success `*out` owns a new string; free it with `minrust_string_free`.
/// - Null or non-UTF-8 input returns `STATUS_ERROR` and leaves `*out` null.
#[no_mangle]
pub extern "C" fn minrust_process_string(
    input: *const c_char,
    out: *mut *mut c_char,
    out_err: *mut *mut c_char,
) -> i32 {
    guard("minrust_process_string", out_err, || {
        if out.is_null() {
            return Err("out is null".to_string());
        }
        unsafe {
            *out = ptr::null_mut();
        }
        if input.is_null() {
            return Err("input is null".to_string());
        }
        let input = unsafe { CStr::from_ptr(input) }
            .to_str()
            .map_err(|_| "input is not valid UTF-8".to_string())?;
        let output = to_c_string(&format!("{PROCESS_PREFIX}{input}"));
        unsafe {
            *out = output;
        }
        Ok(())
    })
}

/// Panics when `should_panic` is true; otherwise does nothing.
///
/// The panic is caught before it reaches the caller and reported as
/// `STATUS_PANIC`.
#[no_mangle]
pub extern "C" fn minrust_might_panic(should_panic: bool, out_err: *mut *mut c_char) -> i32 {
    guard("minrust_might_panic", out_err, || {
        if should_panic {
            panic!("{PANIC_REQUESTED_MESSAGE}");
        }
        Ok(())
    })
}

/// Releases a string previously returned by this library. Null is a no-op.
#[no_mangle]
pub extern "C" fn minrust_string_free(value: *mut c_char) {
    if value.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(value));
    }
}

fn guard<F>(export: &'static str, out_err: *mut *mut c_char, body: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    if !out_err.is_null() {
        unsafe {
            *out_err = ptr::null_mut();
        }
    }

    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => STATUS_OK,
        Ok(Err(message)) => fail(out_err, STATUS_ERROR, &message),
        Err(payload) => fail(out_err, STATUS_PANIC, &panic_message(export, payload.as_ref())),
    }
}

fn fail(out_err: *mut *mut c_char, status: i32, message: &str) -> i32 {
    if !out_err.is_null() {
        unsafe {
            *out_err = to_c_string(message);
        }
    }
    status
}

fn panic_message(export: &str, payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        format!("panic occurred in {export}")
    }
}

fn to_c_string(value: &str) -> *mut c_char {
    CString::new(value.replace('\0', "\\0"))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}
