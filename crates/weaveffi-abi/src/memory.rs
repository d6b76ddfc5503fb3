//! Ownership-transfer helpers for strings and byte buffers.
//!
//! Strings are handed out with `CString::into_raw` and reclaimed with
//! `CString::from_raw`; byte buffers are handed out as `Box<[u8]>` and
//! reclaimed with the same length. A process-wide counter tracks how many
//! allocations are currently owned by foreign code.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicIsize, Ordering};

static LIVE_ALLOCATIONS: AtomicIsize = AtomicIsize::new(0);

/// Number of strings, messages, and byte buffers handed out and not yet freed.
pub fn live_allocations() -> isize {
    LIVE_ALLOCATIONS.load(Ordering::SeqCst)
}

pub(crate) fn track_alloc() {
    LIVE_ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
}

fn track_free() {
    LIVE_ALLOCATIONS.fetch_sub(1, Ordering::SeqCst);
}

/// Reasons a caller-supplied buffer cannot be borrowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("null pointer with non-zero length {0}")]
    NullPointer(usize),

    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Allocate a NUL-terminated copy of `s` for the caller to own.
///
/// Interior NUL bytes are stripped. Release with [`free_string`].
pub fn string_to_c_ptr(s: impl AsRef<str>) -> *const c_char {
    let bytes: Vec<u8> = s.as_ref().bytes().filter(|b| *b != 0).collect();
    let cstr = CString::new(bytes).unwrap_or_default();
    track_alloc();
    cstr.into_raw()
}

/// Free a string previously returned by [`string_to_c_ptr`]. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or come from [`string_to_c_ptr`] and not have been
/// freed already.
pub unsafe fn free_string(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: pointer came from `CString::into_raw` per the caller's contract
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
    track_free();
}

/// Free an error message. Shares the string allocator.
pub(crate) unsafe fn release_message(ptr: *const c_char) {
    // SAFETY: forwarded contract
    unsafe { free_string(ptr) }
}

/// Hand a byte buffer to the caller, writing its length to `out_len`.
///
/// Release with [`free_bytes`] using the same length.
///
/// # Safety
///
/// `out_len` must be null or valid for a single `usize` write.
pub unsafe fn bytes_to_c_ptr(bytes: Vec<u8>, out_len: *mut usize) -> *const u8 {
    let boxed = bytes.into_boxed_slice();
    let len = boxed.len();
    if !out_len.is_null() {
        // SAFETY: non-null and writable per the caller's contract
        unsafe { *out_len = len };
    }
    track_alloc();
    Box::into_raw(boxed) as *const u8
}

/// Free a byte buffer previously returned by [`bytes_to_c_ptr`]. Null is a
/// no-op.
///
/// # Safety
///
/// `ptr` must be null or come from [`bytes_to_c_ptr`], and `len` must be the
/// length reported with it.
pub unsafe fn free_bytes(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: reconstructs the `Box<[u8]>` leaked by `bytes_to_c_ptr`
    drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) });
    track_free();
}

/// Borrow a `&str` from a NUL-terminated C string. Returns `None` for null or
/// non-UTF-8 input.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
pub unsafe fn c_ptr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Borrow a caller-supplied `(pointer, length)` pair as a byte slice.
///
/// Null with length zero is the empty slice; null with a non-zero length is
/// an error.
///
/// # Safety
///
/// A non-null `ptr` must be valid for reads of `len` bytes for `'a`.
pub unsafe fn bytes_from_raw<'a>(ptr: *const u8, len: usize) -> Result<&'a [u8], BufferError> {
    if ptr.is_null() {
        return if len == 0 {
            Ok(&[])
        } else {
            Err(BufferError::NullPointer(len))
        };
    }
    // SAFETY: non-null and readable for `len` bytes per the caller's contract
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Borrow a caller-supplied `(pointer, length)` pair as UTF-8 text.
///
/// # Safety
///
/// Same contract as [`bytes_from_raw`].
pub unsafe fn str_from_raw<'a>(ptr: *const u8, len: usize) -> Result<&'a str, BufferError> {
    // SAFETY: forwarded contract
    let bytes = unsafe { bytes_from_raw(ptr, len) }?;
    Ok(std::str::from_utf8(bytes)?)
}
