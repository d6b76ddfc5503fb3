//! Translate Rust results into the `out_err` convention.

use std::any::Any;
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::error::{
    error_set, error_set_ok, weaveffi_error, AbiError, ERROR_CODE_PANIC, ERROR_CODE_UNSPECIFIED,
};

/// Map a `Result` onto `out_err`: `Ok` clears it, `Err` stores
/// [`ERROR_CODE_UNSPECIFIED`] with the error's display text.
///
/// # Safety
///
/// `out_err` must be null or point to a valid `weaveffi_error`.
pub unsafe fn result_to_out_err<T, E: Display>(
    result: Result<T, E>,
    out_err: *mut weaveffi_error,
) -> Option<T> {
    match result {
        Ok(value) => {
            // SAFETY: forwarded contract
            unsafe { error_set_ok(out_err) };
            Some(value)
        }
        Err(e) => {
            // SAFETY: forwarded contract
            unsafe { error_set(out_err, ERROR_CODE_UNSPECIFIED, &e.to_string()) };
            None
        }
    }
}

/// Run `body` at the ABI boundary.
///
/// `Ok` clears `out_err` and yields the value. `Err` stores the error's code
/// and message. A panic is caught and stored as [`ERROR_CODE_PANIC`]; it never
/// unwinds into foreign code.
///
/// # Safety
///
/// `out_err` must be null or point to a valid `weaveffi_error`.
pub unsafe fn call_with_error<T, E, F>(out_err: *mut weaveffi_error, body: F) -> Option<T>
where
    E: Into<AbiError>,
    F: FnOnce() -> Result<T, E>,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => {
            // SAFETY: forwarded contract
            unsafe { error_set_ok(out_err) };
            Some(value)
        }
        Ok(Err(e)) => {
            let e: AbiError = e.into();
            // SAFETY: forwarded contract
            unsafe { error_set(out_err, e.code, &e.message) };
            None
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "panic caught at FFI boundary");
            // SAFETY: forwarded contract
            unsafe { error_set(out_err, ERROR_CODE_PANIC, &format!("panic: {message}")) };
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
