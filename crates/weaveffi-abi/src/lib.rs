//! C ABI runtime for WeaveFFI libraries.
//!
//! Every generated function takes a trailing `weaveffi_error* out_err`. On
//! success the runtime leaves it at `{0, NULL}`; on failure it stores a
//! non-zero code and a message allocated here. Anything handed to the caller
//! (error messages, strings, byte buffers) must come back through exactly one
//! matching release function:
//!
//! | Resource | Release |
//! |----------|---------|
//! | `out_err->message` | `weaveffi_error_clear` |
//! | returned `const char*` | `weaveffi_free_string` |
//! | returned `const uint8_t*` + `out_len` | `weaveffi_free_bytes` |
//!
//! ## Modules
//!
//! - [`error`]: The `weaveffi_error` struct and the set/clear operations
//! - [`memory`]: String and byte buffer allocation, release, and borrowing
//! - [`guard`]: Run a fallible body and translate its result (or panic) into `out_err`
//! - [`scoped`]: RAII wrappers for Rust callers of a C ABI library

#![allow(non_camel_case_types)]

pub mod error;
pub mod guard;
pub mod memory;
pub mod scoped;

pub use error::{
    error_clear, error_set, error_set_ok, weaveffi_error, weaveffi_handle_t, AbiError,
    ERROR_CODE_PANIC, ERROR_CODE_UNSPECIFIED,
};
pub use guard::{call_with_error, result_to_out_err};
pub use memory::{
    bytes_from_raw, bytes_to_c_ptr, c_ptr_to_str, free_bytes, free_string, live_allocations,
    str_from_raw, string_to_c_ptr, BufferError,
};
pub use scoped::{OwnedBytes, OwnedCString, ScopedError};

/// Define the runtime symbols every WeaveFFI library exports:
/// `weaveffi_error_clear`, `weaveffi_free_string`, and `weaveffi_free_bytes`.
///
/// Invoke once at the root of the `cdylib` crate:
///
/// ```ignore
/// weaveffi_abi::export_runtime!();
/// ```
#[macro_export]
macro_rules! export_runtime {
    () => {
        /// Free the message held by `err` and reset it to `{0, NULL}`.
        ///
        /// # Safety
        ///
        /// `err` must be null or point to a `weaveffi_error` whose message is
        /// null or was set by this library.
        #[no_mangle]
        pub unsafe extern "C" fn weaveffi_error_clear(err: *mut $crate::weaveffi_error) {
            $crate::error_clear(err)
        }

        /// Free a string returned by this library.
        ///
        /// # Safety
        ///
        /// `ptr` must be null or a string returned by this library that has not
        /// been freed yet.
        #[no_mangle]
        pub unsafe extern "C" fn weaveffi_free_string(ptr: *const ::std::os::raw::c_char) {
            $crate::free_string(ptr)
        }

        /// Free a byte buffer returned by this library.
        ///
        /// # Safety
        ///
        /// `ptr` must be null or a buffer returned by this library, and `len`
        /// the length reported alongside it.
        #[no_mangle]
        pub unsafe extern "C" fn weaveffi_free_bytes(ptr: *mut u8, len: usize) {
            $crate::free_bytes(ptr, len)
        }
    };
}
