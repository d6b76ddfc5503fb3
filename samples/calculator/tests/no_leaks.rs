//! Every allocation handed out by the library is released on every path.
//!
//! Kept as the only test in this binary: the allocation counter is
//! process-wide.

use calculator::*;
use weaveffi_abi::{live_allocations, weaveffi_error, OwnedCString, ScopedError};

#[test]
fn all_paths_release_allocations() {
    let baseline = live_allocations();

    // Successful string result, freed explicitly.
    let mut err = weaveffi_error::default();
    unsafe {
        let s = weaveffi_calculator_echo(b"abc".as_ptr(), 3, &mut err);
        assert!(!s.is_null());
        assert_eq!(live_allocations(), baseline + 1);
        weaveffi_free_string(s);
    }
    assert_eq!(live_allocations(), baseline);

    // Failure message, freed by error_clear.
    unsafe {
        weaveffi_calculator_div(1, 0, &mut err);
        assert_eq!(live_allocations(), baseline + 1);
        weaveffi_error_clear(&mut err);
    }
    assert_eq!(live_allocations(), baseline);

    // A second failure replaces the first message without leaking it.
    unsafe {
        weaveffi_calculator_div(1, 0, &mut err);
        weaveffi_calculator_add(i32::MAX, 1, &mut err);
        assert_eq!(live_allocations(), baseline + 1);
        // success frees the stale message
        weaveffi_calculator_add(1, 1, &mut err);
    }
    assert_eq!(live_allocations(), baseline);

    // RAII wrappers release on drop, including early exits.
    for input in ["x", "yy", ""] {
        let mut scoped = ScopedError::new();
        let owned = unsafe {
            OwnedCString::from_raw(weaveffi_calculator_echo(
                input.as_ptr(),
                input.len(),
                scoped.as_mut_ptr(),
            ))
        };
        if input.is_empty() {
            continue;
        }
        assert_eq!(owned.unwrap().to_str(), Some(input));
    }
    {
        let mut scoped = ScopedError::new();
        unsafe { weaveffi_calculator_div(3, 0, scoped.as_mut_ptr()) };
        assert!(scoped.has_message());
    }
    assert_eq!(live_allocations(), baseline);

    // Failed echo allocates only the message.
    unsafe {
        let bad = [0xffu8];
        let s = weaveffi_calculator_echo(bad.as_ptr(), 1, &mut err);
        assert!(s.is_null());
        weaveffi_error_clear(&mut err);
        let s = weaveffi_calculator_echo(b"a\0b".as_ptr(), 3, &mut err);
        assert!(s.is_null());
        assert_eq!(err.code, 5);
        weaveffi_error_clear(&mut err);
    }
    assert_eq!(live_allocations(), baseline);
}
