//! The error out-parameter.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::memory::{release_message, track_alloc};

/// Opaque handle type exposed to foreign callers.
pub type weaveffi_handle_t = u64;

/// Code stored when a failure carries no domain-specific code.
pub const ERROR_CODE_UNSPECIFIED: i32 = -1;

/// Code stored when the library panicked during a call.
pub const ERROR_CODE_PANIC: i32 = -2;

/// Error struct passed across the C ABI boundary.
///
/// `code == 0` means success. A non-null `message` is a NUL-terminated UTF-8
/// string allocated by this runtime; release it with `weaveffi_error_clear`.
#[repr(C)]
#[derive(Debug)]
pub struct weaveffi_error {
    pub code: i32,
    pub message: *const c_char,
}

impl Default for weaveffi_error {
    fn default() -> Self {
        Self {
            code: 0,
            message: ptr::null(),
        }
    }
}

impl weaveffi_error {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Borrow the message text.
    ///
    /// # Safety
    ///
    /// `message` must be null or a NUL-terminated string that outlives the
    /// returned borrow.
    pub unsafe fn message_str(&self) -> Option<&str> {
        if self.message.is_null() {
            return None;
        }
        // SAFETY: non-null and NUL-terminated per the caller's contract
        unsafe { CStr::from_ptr(self.message) }.to_str().ok()
    }
}

/// A failure headed for an `out_err` parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("({code}) {message}")]
pub struct AbiError {
    pub code: i32,
    pub message: String,
}

impl AbiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unspecified(message: impl Into<String>) -> Self {
        Self::new(ERROR_CODE_UNSPECIFIED, message)
    }
}

/// Set the error to OK (`code = 0`) and free any prior message.
///
/// # Safety
///
/// `out_err` must be null or point to a valid `weaveffi_error` whose message
/// is null or was allocated by this runtime.
pub unsafe fn error_set_ok(out_err: *mut weaveffi_error) {
    if out_err.is_null() {
        return;
    }
    // SAFETY: checked for null above; validity is the caller's contract
    let err = unsafe { &mut *out_err };
    // SAFETY: message was allocated by this runtime or is null
    unsafe { release_message(err.message) };
    err.code = 0;
    err.message = ptr::null();
}

/// Store `code` and a copy of `message`, freeing any prior message.
///
/// Interior NUL bytes are stripped from the copy.
///
/// # Safety
///
/// Same contract as [`error_set_ok`].
pub unsafe fn error_set(out_err: *mut weaveffi_error, code: i32, message: &str) {
    if out_err.is_null() {
        return;
    }
    // SAFETY: checked for null above; validity is the caller's contract
    let err = unsafe { &mut *out_err };
    // SAFETY: message was allocated by this runtime or is null
    unsafe { release_message(err.message) };
    err.code = code;
    err.message = new_message(message);
}

/// Clear an error: free its message and zero both fields.
///
/// # Safety
///
/// Same contract as [`error_set_ok`].
pub unsafe fn error_clear(err: *mut weaveffi_error) {
    // SAFETY: forwarded contract
    unsafe { error_set_ok(err) }
}

fn new_message(message: &str) -> *const c_char {
    let sanitized: Vec<u8> = message.bytes().filter(|b| *b != 0).collect();
    // No interior NULs remain, so this cannot fail.
    let cstr = CString::new(sanitized).unwrap_or_default();
    track_alloc();
    cstr.into_raw()
}
