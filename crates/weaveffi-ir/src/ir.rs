//! The interface definition model.
//!
//! Field names follow the IDL spelling: a function's return type is stored
//! under `return`, a parameter's type under `type`.

use serde::{Deserialize, Serialize};

/// A complete interface definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    /// Version of the described library API (not of the IDL format).
    pub version: String,
    /// Modules in declaration order.
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// A named group of functions sharing one symbol prefix and error domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<Function>,
    /// Optional error domain listing the non-zero codes this module reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorDomain>,
}

/// A single exported function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Parsed so that validation can reject it with a clear message.
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// Types that can cross the C ABI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    I32,
    U32,
    I64,
    F64,
    Bool,
    /// UTF-8 text. Passed in as pointer + length, returned as a
    /// NUL-terminated string owned by the caller.
    #[serde(rename = "string")]
    StringUtf8,
    /// Raw bytes. Passed in as pointer + length, returned as pointer with an
    /// `out_len` out-parameter.
    Bytes,
    /// Opaque 64-bit handle.
    Handle,
}

impl TypeRef {
    /// Whether the type is passed as a `(pointer, length)` pair.
    pub fn is_buffer(&self) -> bool {
        matches!(self, Self::StringUtf8 | Self::Bytes)
    }

    /// Whether a value of this type, when returned, is heap-allocated by the
    /// callee and must be released by the caller.
    pub fn is_owned_return(&self) -> bool {
        self.is_buffer()
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I32 => write!(f, "i32"),
            Self::U32 => write!(f, "u32"),
            Self::I64 => write!(f, "i64"),
            Self::F64 => write!(f, "f64"),
            Self::Bool => write!(f, "bool"),
            Self::StringUtf8 => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Handle => write!(f, "handle"),
        }
    }
}

/// The set of error codes a module can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDomain {
    pub name: String,
    #[serde(default)]
    pub codes: Vec<ErrorCode>,
}

/// One entry in an error domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode {
    /// Symbolic name, e.g. `DivisionByZero`.
    pub name: String,
    /// Numeric code. Must be non-zero; zero means success.
    pub code: i32,
    /// Default human-readable message.
    pub message: String,
}

impl Api {
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Total number of functions across all modules.
    pub fn function_count(&self) -> usize {
        self.modules.iter().map(|m| m.functions.len()).sum()
    }
}

impl Module {
    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl ErrorDomain {
    pub fn find_code(&self, name: &str) -> Option<&ErrorCode> {
        self.codes.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ref_display_matches_idl_spelling() {
        assert_eq!(TypeRef::StringUtf8.to_string(), "string");
        assert_eq!(TypeRef::Handle.to_string(), "handle");
        assert_eq!(TypeRef::I64.to_string(), "i64");
    }

    #[test]
    fn buffer_types() {
        assert!(TypeRef::StringUtf8.is_buffer());
        assert!(TypeRef::Bytes.is_buffer());
        assert!(!TypeRef::I32.is_buffer());
        assert!(!TypeRef::Handle.is_owned_return());
    }

    #[test]
    fn lookups() {
        let api = Api {
            version: "0.1.0".to_string(),
            modules: vec![Module {
                name: "calculator".to_string(),
                functions: vec![Function {
                    name: "add".to_string(),
                    params: vec![],
                    returns: Some(TypeRef::I32),
                    doc: None,
                    is_async: false,
                }],
                errors: Some(ErrorDomain {
                    name: "CalculatorError".to_string(),
                    codes: vec![ErrorCode {
                        name: "DivisionByZero".to_string(),
                        code: 1,
                        message: "division by zero".to_string(),
                    }],
                }),
            }],
        };
        let module = api.find_module("calculator").unwrap();
        assert!(module.find_function("add").is_some());
        assert!(module.find_function("sub").is_none());
        assert_eq!(
            module.errors.as_ref().unwrap().find_code("DivisionByZero").unwrap().code,
            1
        );
        assert_eq!(api.function_count(), 1);
        assert!(api.find_module("missing").is_none());
    }
}
