//! C header generation.
//!
//! Emits `c/weaveffi.h`: the runtime declarations (`weaveffi_error`, clear and
//! free functions), one `#define` per error code, and one prototype per
//! function. Buffer parameters expand to `<name>_ptr, <name>_len`; a `bytes`
//! return adds `size_t* out_len`; every function ends with
//! `weaveffi_error* out_err`.

use std::path::{Path, PathBuf};

use tracing::info;
use weaveffi_core::naming::{c_symbol_name, error_constant_name};
use weaveffi_core::{write_file, CodegenError, Generator};
use weaveffi_ir::{Api, Function, Module, Param, TypeRef};

/// Header guard and file name.
pub const HEADER_NAME: &str = "weaveffi.h";

pub struct CGenerator;

impl Generator for CGenerator {
    fn name(&self) -> &'static str {
        "c"
    }

    fn generate(&self, api: &Api, out_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        info!(modules = api.modules.len(), "generating C header");
        let path = write_file(&out_dir.join("c").join(HEADER_NAME), &render_c_header(api))?;
        Ok(vec![path])
    }
}

/// C type of a scalar value. Buffer types map to their element pointer.
pub fn c_scalar_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 => "int32_t",
        TypeRef::U32 => "uint32_t",
        TypeRef::I64 => "int64_t",
        TypeRef::F64 => "double",
        TypeRef::Bool => "bool",
        TypeRef::StringUtf8 | TypeRef::Bytes => "const uint8_t*",
        TypeRef::Handle => "weaveffi_handle_t",
    }
}

/// C return type. `string` returns a NUL-terminated `const char*`.
pub fn c_return_type(ret: Option<TypeRef>) -> &'static str {
    match ret {
        None => "void",
        Some(TypeRef::StringUtf8) => "const char*",
        Some(ty) => c_scalar_type(ty),
    }
}

/// Whether the function needs a trailing `size_t* out_len` parameter.
pub fn needs_out_len(f: &Function) -> bool {
    f.returns == Some(TypeRef::Bytes)
}

/// C parameter declarations for one IR parameter.
pub fn c_param_decls(p: &Param) -> Vec<String> {
    if p.ty.is_buffer() {
        vec![
            format!("const uint8_t* {}_ptr", p.name),
            format!("size_t {}_len", p.name),
        ]
    } else {
        vec![format!("{} {}", c_scalar_type(p.ty), p.name)]
    }
}

/// Full prototype (without trailing `;`) of a function.
pub fn c_prototype(module: &Module, f: &Function) -> String {
    let mut params: Vec<String> = f.params.iter().flat_map(c_param_decls).collect();
    if needs_out_len(f) {
        params.push("size_t* out_len".to_string());
    }
    params.push("weaveffi_error* out_err".to_string());
    format!(
        "{} {}({})",
        c_return_type(f.returns),
        c_symbol_name(&module.name, &f.name),
        params.join(", ")
    )
}

pub fn render_c_header(api: &Api) -> String {
    let mut out = String::new();
    out.push_str("/* Generated by WeaveFFI. Do not edit. */\n");
    out.push_str("#ifndef WEAVEFFI_H\n#define WEAVEFFI_H\n\n");
    out.push_str("#include <stdint.h>\n#include <stddef.h>\n#include <stdbool.h>\n\n");
    out.push_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");

    out.push_str(&format!("#define WEAVEFFI_API_VERSION \"{}\"\n\n", api.version.escape_default()));
    out.push_str("typedef uint64_t weaveffi_handle_t;\n\n");
    out.push_str("/* code == 0 means success. A non-NULL message is owned by the caller\n");
    out.push_str("   and must be released with weaveffi_error_clear. */\n");
    out.push_str("typedef struct weaveffi_error {\n    int32_t code;\n    const char* message;\n} weaveffi_error;\n\n");
    out.push_str("void weaveffi_error_clear(weaveffi_error* err);\n");
    out.push_str("void weaveffi_free_string(const char* ptr);\n");
    out.push_str("void weaveffi_free_bytes(uint8_t* ptr, size_t len);\n\n");

    for m in &api.modules {
        render_module(&mut out, m);
    }

    out.push_str("#ifdef __cplusplus\n}\n#endif\n\n");
    out.push_str("#endif /* WEAVEFFI_H */\n");
    out
}

fn render_module(out: &mut String, module: &Module) {
    out.push_str(&format!("/* Module: {} */\n", module.name));
    if let Some(errors) = &module.errors {
        out.push_str(&format!("/* Error domain: {} */\n", errors.name));
        for c in &errors.codes {
            out.push_str(&format!(
                "#define {} {} /* {} */\n",
                error_constant_name(&module.name, &c.name),
                c.code,
                comment_safe(&c.message)
            ));
        }
    }
    for f in &module.functions {
        if let Some(doc) = &f.doc {
            out.push_str(&format!("/** {} */\n", comment_safe(doc)));
        }
        out.push_str(&c_prototype(module, f));
        out.push_str(";\n");
    }
    out.push('\n');
}

/// Keep user text from terminating a C comment early.
fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::sample_api;

    #[test]
    fn header_declares_runtime() {
        let h = render_c_header(&sample_api());
        assert!(h.starts_with("/* Generated by WeaveFFI"));
        assert!(h.contains("#ifndef WEAVEFFI_H"));
        assert!(h.contains("typedef uint64_t weaveffi_handle_t;"));
        assert!(h.contains("typedef struct weaveffi_error {\n    int32_t code;\n    const char* message;\n} weaveffi_error;"));
        assert!(h.contains("void weaveffi_error_clear(weaveffi_error* err);"));
        assert!(h.contains("void weaveffi_free_string(const char* ptr);"));
        assert!(h.contains("void weaveffi_free_bytes(uint8_t* ptr, size_t len);"));
        assert!(h.contains("extern \"C\" {"));
        assert!(h.trim_end().ends_with("#endif /* WEAVEFFI_H */"));
    }

    #[test]
    fn calculator_prototypes() {
        let h = render_c_header(&sample_api());
        assert!(h.contains(
            "int32_t weaveffi_calculator_add(int32_t a, int32_t b, weaveffi_error* out_err);"
        ));
        assert!(h.contains(
            "const char* weaveffi_calculator_echo(const uint8_t* s_ptr, size_t s_len, weaveffi_error* out_err);"
        ));
        assert!(h.contains("/** Integer division. */\nint32_t weaveffi_calculator_div("));
    }

    #[test]
    fn bytes_return_gets_out_len() {
        let h = render_c_header(&sample_api());
        assert!(h.contains(
            "const uint8_t* weaveffi_codec_compress(const uint8_t* data_ptr, size_t data_len, size_t* out_len, weaveffi_error* out_err);"
        ));
        assert!(h.contains("void weaveffi_codec_reset(weaveffi_handle_t h, bool hard, weaveffi_error* out_err);"));
        assert!(h.contains("double weaveffi_codec_ratio(uint32_t level, int64_t seed, weaveffi_error* out_err);"));
    }

    #[test]
    fn error_constants() {
        let h = render_c_header(&sample_api());
        assert!(h.contains("#define WEAVEFFI_CALCULATOR_DIVISION_BY_ZERO 1 /* division by zero */"));
        assert!(h.contains("#define WEAVEFFI_CALCULATOR_OVERFLOW 2"));
    }

    #[test]
    fn doc_comments_cannot_escape() {
        assert_eq!(comment_safe("a */ b\nc"), "a * / b c");
    }

    #[test]
    fn deterministic_output() {
        assert_eq!(render_c_header(&sample_api()), render_c_header(&sample_api()));
    }

    #[test]
    fn generate_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let files = CGenerator.generate(&sample_api(), dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("c").join("weaveffi.h")]);
        assert!(files[0].is_file());
    }
}
