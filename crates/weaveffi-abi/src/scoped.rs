//! RAII wrappers for Rust code calling a WeaveFFI library in-process.
//!
//! Each wrapper releases its resource exactly once when dropped, so every
//! exit path (success, expected failure, early return) frees what it owns.

use std::ops::Deref;
use std::os::raw::c_char;

use crate::error::{error_clear, weaveffi_error, AbiError};
use crate::memory::{c_ptr_to_str, free_bytes, free_string};

/// An error out-parameter that clears itself on drop.
#[derive(Debug, Default)]
pub struct ScopedError {
    inner: weaveffi_error,
}

impl ScopedError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer to pass as `out_err`.
    pub fn as_mut_ptr(&mut self) -> *mut weaveffi_error {
        &mut self.inner
    }

    pub fn code(&self) -> i32 {
        self.inner.code
    }

    pub fn is_ok(&self) -> bool {
        self.inner.is_ok()
    }

    pub fn has_message(&self) -> bool {
        !self.inner.message.is_null()
    }

    /// Copy of the current message, if any.
    pub fn message(&self) -> Option<String> {
        // SAFETY: the message is null or was set by the runtime through `as_mut_ptr`
        unsafe { self.inner.message_str() }.map(str::to_string)
    }

    /// Convert a failure into an [`AbiError`] and clear the out-parameter.
    /// Returns `None` (leaving nothing to clear) on success.
    pub fn take(&mut self) -> Option<AbiError> {
        if self.inner.is_ok() {
            self.clear();
            return None;
        }
        let error = AbiError::new(self.inner.code, self.message().unwrap_or_default());
        self.clear();
        Some(error)
    }

    pub fn clear(&mut self) {
        // SAFETY: `inner` is a valid error whose message is null or runtime-owned
        unsafe { error_clear(&mut self.inner) };
    }
}

impl Drop for ScopedError {
    fn drop(&mut self) {
        self.clear();
    }
}

/// A string returned by a WeaveFFI function, freed on drop.
#[derive(Debug)]
pub struct OwnedCString {
    ptr: *const c_char,
}

impl OwnedCString {
    /// Take ownership of a returned string. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a string returned by the runtime that nobody
    /// else will free.
    pub unsafe fn from_raw(ptr: *const c_char) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self { ptr })
        }
    }

    /// Borrow the text. Non-UTF-8 content yields `None`.
    pub fn to_str(&self) -> Option<&str> {
        // SAFETY: `ptr` is a live, NUL-terminated runtime string
        unsafe { c_ptr_to_str(self.ptr) }
    }
}

impl Drop for OwnedCString {
    fn drop(&mut self) {
        // SAFETY: sole owner of a runtime-allocated string
        unsafe { free_string(self.ptr) };
    }
}

/// A byte buffer returned by a WeaveFFI function, freed on drop.
#[derive(Debug)]
pub struct OwnedBytes {
    ptr: *mut u8,
    len: usize,
}

impl OwnedBytes {
    /// Take ownership of a returned buffer. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `ptr`/`len` must be a buffer returned by the runtime that nobody else
    /// will free.
    pub unsafe fn from_raw(ptr: *const u8, len: usize) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self {
                ptr: ptr as *mut u8,
                len,
            })
        }
    }
}

impl Deref for OwnedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: live runtime buffer of exactly `len` bytes
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl Drop for OwnedBytes {
    fn drop(&mut self) {
        // SAFETY: sole owner of a runtime-allocated buffer
        unsafe { free_bytes(self.ptr, self.len) };
    }
}
