//! Core logic for WeaveFFI: validation, naming, and codegen orchestration.
//!
//! ## Modules
//!
//! - [`validate`]: Structural checks on a parsed [`Api`](weaveffi_ir::Api)
//! - [`naming`]: C symbol, constant, and target-language identifier rules
//! - [`codegen`]: The [`Generator`] trait and the [`Orchestrator`] that runs generators
//! - [`error`]: Error types

pub mod codegen;
pub mod error;
pub mod naming;
pub mod validate;

pub use codegen::{write_file, GenerationReport, Generator, Orchestrator};
pub use error::{CodegenError, ValidationError};
pub use validate::validate_api;
