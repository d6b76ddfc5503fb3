//! Interface definition model for WeaveFFI.
//!
//! An interface definition (IDL) file describes the modules, functions and
//! error domains a native library exposes over the C ABI. Generators consume
//! the parsed [`Api`] to emit bindings for each target language.
//!
//! ## Modules
//!
//! - [`ir`]: The in-memory model (`Api`, `Module`, `Function`, ...)
//! - [`parse`]: TOML / JSON / YAML front ends
//! - [`error`]: Parse errors with source positions

pub mod error;
pub mod ir;
pub mod parse;

pub use error::ParseError;
pub use ir::{Api, ErrorCode, ErrorDomain, Function, Module, Param, TypeRef};
pub use parse::{load_api, parse_api_str, IdlFormat};
