//! Target-language binding generators for WeaveFFI.
//!
//! Every generator writes under `<out_dir>/<target>/` and produces identical
//! bytes for identical input.
//!
//! ## Modules
//!
//! - [`c`]: `weaveffi.h`, the C header every other target builds on
//! - [`swift`]: SwiftPM package with a system-library module and a throwing wrapper
//! - [`node`]: `ffi-napi` package with TypeScript wrappers and declarations
//! - [`android`]: Gradle library with JNI glue and Kotlin `external` declarations
//! - [`wasm`]: Loader stub for a `wasm32-unknown-unknown` build

pub mod android;
pub mod c;
pub mod node;
pub mod swift;
pub mod wasm;

use weaveffi_core::{CodegenError, Generator};

pub use android::AndroidGenerator;
pub use c::CGenerator;
pub use node::NodeGenerator;
pub use swift::SwiftGenerator;
pub use wasm::WasmGenerator;

/// Target names in default run order.
pub const TARGETS: &[&str] = &["c", "swift", "node", "android", "wasm"];

/// Every generator, in the order of [`TARGETS`].
pub fn all_generators() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(CGenerator),
        Box::new(SwiftGenerator),
        Box::new(NodeGenerator),
        Box::new(AndroidGenerator),
        Box::new(WasmGenerator),
    ]
}

/// Resolve a single generator by target name.
pub fn generator_by_name(name: &str) -> Result<Box<dyn Generator>, CodegenError> {
    all_generators()
        .into_iter()
        .find(|g| g.name() == name)
        .ok_or_else(|| CodegenError::UnknownTarget(name.to_string()))
}

#[cfg(test)]
pub(crate) mod tests_support {
    use weaveffi_ir::{Api, ErrorCode, ErrorDomain, Function, Module, Param, TypeRef};

    fn func(name: &str, params: &[(&str, TypeRef)], returns: Option<TypeRef>, doc: Option<&str>) -> Function {
        Function {
            name: name.to_string(),
            params: params
                .iter()
                .map(|(n, ty)| Param {
                    name: n.to_string(),
                    ty: *ty,
                })
                .collect(),
            returns,
            doc: doc.map(str::to_string),
            is_async: false,
        }
    }

    /// Calculator module plus a `codec` module covering every type.
    pub(crate) fn sample_api() -> Api {
        let ab = [("a", TypeRef::I32), ("b", TypeRef::I32)];
        Api {
            version: "0.1.0".to_string(),
            modules: vec![
                Module {
                    name: "calculator".to_string(),
                    functions: vec![
                        func("add", &ab, Some(TypeRef::I32), None),
                        func("mul", &ab, Some(TypeRef::I32), None),
                        func("div", &ab, Some(TypeRef::I32), Some("Integer division.")),
                        func("echo", &[("s", TypeRef::StringUtf8)], Some(TypeRef::StringUtf8), None),
                    ],
                    errors: Some(ErrorDomain {
                        name: "CalculatorError".to_string(),
                        codes: vec![
                            ErrorCode {
                                name: "DivisionByZero".to_string(),
                                code: 1,
                                message: "division by zero".to_string(),
                            },
                            ErrorCode {
                                name: "Overflow".to_string(),
                                code: 2,
                                message: "arithmetic overflow".to_string(),
                            },
                        ],
                    }),
                },
                Module {
                    name: "codec".to_string(),
                    functions: vec![
                        func("compress", &[("data", TypeRef::Bytes)], Some(TypeRef::Bytes), None),
                        func("reset", &[("h", TypeRef::Handle), ("hard", TypeRef::Bool)], None, None),
                        func("ratio", &[("level", TypeRef::U32), ("seed", TypeRef::I64)], Some(TypeRef::F64), None),
                        func("open_stream", &[], Some(TypeRef::Handle), None),
                    ],
                    errors: None,
                },
            ],
        }
    }
}
