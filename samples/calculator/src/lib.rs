//! Calculator sample: checked 32-bit arithmetic and string echo exported over
//! the WeaveFFI C ABI. `api.toml` next to this crate describes the interface.

use std::os::raw::c_char;
use std::ptr;

use weaveffi_abi::{
    call_with_error, str_from_raw, string_to_c_ptr, weaveffi_error, AbiError, BufferError,
};

weaveffi_abi::export_runtime!();

/// The `CalculatorError` domain. Discriminants are the codes reported in
/// `out_err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(i32)]
pub enum CalculatorError {
    #[error("division by zero")]
    DivisionByZero = 1,

    #[error("arithmetic overflow")]
    Overflow = 2,

    #[error("input is not valid UTF-8")]
    InvalidUtf8 = 3,

    #[error("null pointer with non-zero length")]
    NullPointer = 4,

    #[error("input contains an interior NUL byte")]
    InteriorNul = 5,
}

impl CalculatorError {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<CalculatorError> for AbiError {
    fn from(e: CalculatorError) -> Self {
        AbiError::new(e.code(), e.to_string())
    }
}

impl From<BufferError> for CalculatorError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::NullPointer(_) => Self::NullPointer,
            BufferError::InvalidUtf8(_) => Self::InvalidUtf8,
        }
    }
}

pub fn add(a: i32, b: i32) -> Result<i32, CalculatorError> {
    a.checked_add(b).ok_or(CalculatorError::Overflow)
}

pub fn mul(a: i32, b: i32) -> Result<i32, CalculatorError> {
    a.checked_mul(b).ok_or(CalculatorError::Overflow)
}

/// Truncating division. `i32::MIN / -1` overflows.
pub fn div(a: i32, b: i32) -> Result<i32, CalculatorError> {
    if b == 0 {
        return Err(CalculatorError::DivisionByZero);
    }
    a.checked_div(b).ok_or(CalculatorError::Overflow)
}

/// C strings end at the first NUL, so input containing one cannot come back
/// unchanged.
pub fn echo(s: &str) -> Result<String, CalculatorError> {
    if s.contains('\0') {
        return Err(CalculatorError::InteriorNul);
    }
    Ok(s.to_string())
}

/// # Safety
///
/// `out_err` must be null or point to a valid `weaveffi_error`.
#[no_mangle]
pub unsafe extern "C" fn weaveffi_calculator_add(
    a: i32,
    b: i32,
    out_err: *mut weaveffi_error,
) -> i32 {
    call_with_error(out_err, || add(a, b)).unwrap_or(0)
}

/// # Safety
///
/// `out_err` must be null or point to a valid `weaveffi_error`.
#[no_mangle]
pub unsafe extern "C" fn weaveffi_calculator_mul(
    a: i32,
    b: i32,
    out_err: *mut weaveffi_error,
) -> i32 {
    call_with_error(out_err, || mul(a, b)).unwrap_or(0)
}

/// # Safety
///
/// `out_err` must be null or point to a valid `weaveffi_error`.
#[no_mangle]
pub unsafe extern "C" fn weaveffi_calculator_div(
    a: i32,
    b: i32,
    out_err: *mut weaveffi_error,
) -> i32 {
    call_with_error(out_err, || div(a, b)).unwrap_or(0)
}

/// Returns a new string the caller frees with `weaveffi_free_string`.
///
/// # Safety
///
/// `s_ptr` must be null (with `s_len == 0`) or readable for `s_len` bytes.
/// `out_err` must be null or point to a valid `weaveffi_error`.
#[no_mangle]
pub unsafe extern "C" fn weaveffi_calculator_echo(
    s_ptr: *const u8,
    s_len: usize,
    out_err: *mut weaveffi_error,
) -> *const c_char {
    call_with_error(out_err, || -> Result<_, CalculatorError> {
        // SAFETY: forwarded contract
        let s = unsafe { str_from_raw(s_ptr, s_len) }?;
        Ok(string_to_c_ptr(echo(s)?))
    })
    .unwrap_or(ptr::null())
}
