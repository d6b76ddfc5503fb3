//! Validation and codegen error types.

use std::path::PathBuf;

/// Structural problems in an interface definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("API version is empty")]
    MissingVersion,

    #[error("module has no name")]
    NoModuleName,

    #[error("duplicate module name: {0}")]
    DuplicateModuleName(String),

    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: &'static str },

    #[error("reserved keyword used as a name: {0}")]
    ReservedKeyword(String),

    #[error("duplicate function name in module '{module}': {function}")]
    DuplicateFunctionName { module: String, function: String },

    #[error("duplicate param name in function '{function}' of module '{module}': {param}")]
    DuplicateParamName {
        module: String,
        function: String,
        param: String,
    },

    /// A parameter name clashes with the `_ptr`/`_len` pair generated for a
    /// buffer parameter, or with a generated out-parameter.
    #[error("param '{param}' in {module}::{function} collides with a generated C parameter")]
    ParamNameCollision {
        module: String,
        function: String,
        param: String,
    },

    #[error("async functions are not supported: {module}::{function}")]
    AsyncNotSupported { module: String, function: String },

    #[error("error domain missing name in module '{0}'")]
    ErrorDomainMissingName(String),

    #[error("function name collides with error domain name in module '{module}': {name}")]
    NameCollisionWithErrorDomain { module: String, name: String },

    #[error("invalid error code in module '{module}' for '{name}': must be non-zero")]
    InvalidErrorCode { module: String, name: String },

    #[error("duplicate error code name in module '{module}': {name}")]
    DuplicateErrorName { module: String, name: String },

    #[error("duplicate error numeric code in module '{module}': {code}")]
    DuplicateErrorCode { module: String, code: i32 },

    /// Two declarations map to the same C symbol, error constant, or binding
    /// type name, e.g. `a_b::c` and `a::b_c`.
    #[error("generated name '{0}' is produced by more than one declaration")]
    SymbolCollision(String),

    /// A declaration maps onto a symbol or constant the runtime already
    /// exports, e.g. module `free` with function `string`.
    #[error("generated name '{0}' collides with a WeaveFFI runtime symbol")]
    RuntimeSymbolCollision(String),

    /// Two members of one module map to the same name in a binding, e.g.
    /// functions `get_x` and `getX` in Kotlin.
    #[error("generated member '{name}' in module '{module}' is produced more than once")]
    MemberNameCollision { module: String, name: String },

    #[error("module '{module}' maps to type name '{name}', which the bindings already use")]
    BindingTypeName { module: String, name: String },
}

/// Errors raised while generating bindings.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The API failed validation before any generator ran.
    #[error("invalid API: {0}")]
    Validation(#[from] ValidationError),

    /// Writing an output file failed.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No generator is registered under the requested name.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
}

/// Result type alias for codegen operations.
pub type Result<T> = std::result::Result<T, CodegenError>;
