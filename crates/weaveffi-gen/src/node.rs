//! Node.js package generation over `ffi-napi`.
//!
//! `index.ts` loads the shared library, declares every symbol, and exports one
//! object per module whose functions check the error out-parameter, throw a
//! `WeaveFFIError`, and free returned strings and buffers.

use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::info;
use weaveffi_core::naming::c_symbol_name;
use weaveffi_core::{write_file, CodegenError, Generator};
use weaveffi_ir::{Api, Function, Module, TypeRef};

pub struct NodeGenerator;

impl Generator for NodeGenerator {
    fn name(&self) -> &'static str {
        "node"
    }

    fn generate(&self, api: &Api, out_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        info!("generating Node.js ffi-napi package");
        let dir = out_dir.join("node");
        Ok(vec![
            write_file(&dir.join("package.json"), &render_package_json(api))?,
            write_file(&dir.join("index.ts"), &render_node_index_ts(api))?,
            write_file(&dir.join("index.d.ts"), &render_node_dts(api))?,
        ])
    }
}

pub fn render_package_json(api: &Api) -> String {
    let manifest = json!({
        "name": "weaveffi-bindings",
        "version": api.version,
        "private": true,
        "main": "index.js",
        "types": "index.d.ts",
        "dependencies": {
            "ffi-napi": "^4.0.3",
            "ref-napi": "^3.0.3"
        }
    });
    let mut text = serde_json::to_string_pretty(&manifest).unwrap_or_default();
    text.push('\n');
    text
}

/// `ffi-napi` type identifier for a scalar argument or return.
fn ffi_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 => "__wf_t.int32",
        TypeRef::U32 => "__wf_t.uint32",
        TypeRef::I64 => "__wf_t.int64",
        TypeRef::F64 => "__wf_t.double",
        TypeRef::Bool => "__wf_t.bool",
        TypeRef::StringUtf8 | TypeRef::Bytes => "__wf_t.pointer",
        TypeRef::Handle => "__wf_t.uint64",
    }
}

fn ts_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 | TypeRef::U32 | TypeRef::I64 | TypeRef::F64 | TypeRef::Handle => "number",
        TypeRef::Bool => "boolean",
        TypeRef::StringUtf8 => "string",
        TypeRef::Bytes => "Buffer",
    }
}

fn ffi_signature(f: &Function) -> (String, Vec<&'static str>) {
    let ret = f.returns.map(ffi_type).unwrap_or("'void'").to_string();
    let mut args = Vec::new();
    for p in &f.params {
        if p.ty.is_buffer() {
            args.push("__wf_t.pointer");
            args.push("__wf_t.size_t");
        } else {
            args.push(ffi_type(p.ty));
        }
    }
    if f.returns == Some(TypeRef::Bytes) {
        args.push("__wf_t.pointer");
    }
    args.push("__wf_t.pointer");
    (ret, args)
}

// Every top-level name except the exports carries the `__wf_` prefix, which
// interface names cannot use, so module objects never shadow them.
const PRELUDE: &str = r#"// Generated by WeaveFFI. Do not edit.
import __wf_ffi from 'ffi-napi'
import __wf_ref from 'ref-napi'

const __wf_defaultLib =
  process.platform === 'darwin' ? './libweaveffi.dylib'
  : process.platform === 'win32' ? './weaveffi.dll'
  : './libweaveffi.so'
const __wf_libPath = process.env.WEAVEFFI_LIB || __wf_defaultLib

const __wf_t = {
  int32: __wf_ref.types.int32 as any,
  uint32: __wf_ref.types.uint32 as any,
  int64: __wf_ref.types.int64 as any,
  uint64: __wf_ref.types.uint64 as any,
  double: __wf_ref.types.double as any,
  bool: __wf_ref.types.bool as any,
  size_t: __wf_ref.types.size_t as any,
  pointer: __wf_ref.refType(__wf_ref.types.void) as any,
}

// struct weaveffi_error { int32_t code; const char* message; }
const __wf_ERR_MESSAGE_OFFSET = __wf_ref.sizeof.pointer
const __wf_ERR_SIZE = 2 * __wf_ref.sizeof.pointer

export class WeaveFFIError extends Error {
  readonly code: number

  constructor(code: number, message: string) {
    super(`(${code}) ${message}`)
    this.name = 'WeaveFFIError'
    this.code = code
  }
}

"#;

const HELPERS: &str = r#"function __wf_newError(): Buffer {
  return Buffer.alloc(__wf_ERR_SIZE)
}

function __wf_check(err: Buffer): void {
  const code = err.readInt32LE(0)
  if (code !== 0) {
    const msgPtr = __wf_ref.readPointer(err, __wf_ERR_MESSAGE_OFFSET, 0)
    const message = msgPtr.isNull() ? '' : __wf_ref.reinterpretUntilZeros(msgPtr, 1, 0).toString('utf8')
    __wf_lib.weaveffi_error_clear(err)
    throw new WeaveFFIError(code, message)
  }
}

function __wf_takeString(ptr: Buffer): string {
  if (ptr.isNull()) {
    throw new WeaveFFIError(-1, 'null string')
  }
  const text = __wf_ref.reinterpretUntilZeros(ptr, 1, 0).toString('utf8')
  __wf_lib.weaveffi_free_string(ptr)
  return text
}

function __wf_takeBytes(ptr: Buffer, outLen: Buffer): Buffer {
  const len = Number(outLen.deref())
  if (ptr.isNull()) {
    return Buffer.alloc(0)
  }
  const copy = Buffer.from(__wf_ref.reinterpret(ptr, len, 0))
  __wf_lib.weaveffi_free_bytes(ptr, len)
  return copy
}

"#;

pub fn render_node_index_ts(api: &Api) -> String {
    let mut out = String::from(PRELUDE);

    out.push_str("const __wf_lib = __wf_ffi.Library(__wf_libPath, {\n");
    out.push_str("  weaveffi_error_clear: ['void', [__wf_t.pointer]],\n");
    out.push_str("  weaveffi_free_string: ['void', [__wf_t.pointer]],\n");
    out.push_str("  weaveffi_free_bytes: ['void', [__wf_t.pointer, __wf_t.size_t]],\n");
    for m in &api.modules {
        for f in &m.functions {
            let (ret, args) = ffi_signature(f);
            out.push_str(&format!(
                "  {}: [{}, [{}]],\n",
                c_symbol_name(&m.name, &f.name),
                ret,
                args.join(", ")
            ));
        }
    }
    out.push_str("}) as any\n\n");

    out.push_str(HELPERS);

    for m in &api.modules {
        render_module(&mut out, m);
    }
    out.push_str("export default __wf_lib\n");
    out
}

fn render_module(out: &mut String, module: &Module) {
    out.push_str(&format!("export const {} = {{\n", module.name));
    if let Some(errors) = &module.errors {
        for c in &errors.codes {
            out.push_str(&format!("  {}: {},\n", c.name, c.code));
        }
    }
    for f in &module.functions {
        render_function(out, module, f);
    }
    out.push_str("}\n\n");
}

fn render_function(out: &mut String, module: &Module, f: &Function) {
    if let Some(doc) = &f.doc {
        out.push_str(&format!("  /** {} */\n", doc.replace("*/", "* /").replace('\n', " ")));
    }
    let params: Vec<String> = f
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, ts_type(p.ty)))
        .collect();
    let ret = f.returns.map(ts_type).unwrap_or("void");
    out.push_str(&format!("  {}({}): {} {{\n", f.name, params.join(", "), ret));
    out.push_str("    const __wf_err = __wf_newError()\n");

    let mut args = Vec::new();
    for p in &f.params {
        match p.ty {
            TypeRef::StringUtf8 => {
                out.push_str(&format!(
                    "    const __wf_{n}Buf = Buffer.from({n}, 'utf8')\n",
                    n = p.name
                ));
                args.push(format!("__wf_{}Buf", p.name));
                args.push(format!("__wf_{}Buf.length", p.name));
            }
            TypeRef::Bytes => {
                args.push(p.name.clone());
                args.push(format!("{}.length", p.name));
            }
            _ => args.push(p.name.clone()),
        }
    }
    if f.returns == Some(TypeRef::Bytes) {
        out.push_str("    const __wf_outLen = __wf_ref.alloc(__wf_t.size_t)\n");
        args.push("__wf_outLen".to_string());
    }
    args.push("__wf_err".to_string());

    let call = format!("__wf_lib.{}({})", c_symbol_name(&module.name, &f.name), args.join(", "));
    match f.returns {
        None => {
            out.push_str(&format!("    {call}\n"));
            out.push_str("    __wf_check(__wf_err)\n");
        }
        Some(TypeRef::StringUtf8) => {
            out.push_str(&format!("    const __wf_rv = {call}\n"));
            out.push_str("    __wf_check(__wf_err)\n");
            out.push_str("    return __wf_takeString(__wf_rv)\n");
        }
        Some(TypeRef::Bytes) => {
            out.push_str(&format!("    const __wf_rv = {call}\n"));
            out.push_str("    __wf_check(__wf_err)\n");
            out.push_str("    return __wf_takeBytes(__wf_rv, __wf_outLen)\n");
        }
        Some(_) => {
            out.push_str(&format!("    const __wf_rv = {call}\n"));
            out.push_str("    __wf_check(__wf_err)\n");
            out.push_str("    return __wf_rv\n");
        }
    }
    out.push_str("  },\n");
}

pub fn render_node_dts(api: &Api) -> String {
    let mut out = String::from("// Generated by WeaveFFI. Do not edit.\n\n");
    out.push_str("export declare class WeaveFFIError extends Error {\n");
    out.push_str("  readonly code: number\n");
    out.push_str("  constructor(code: number, message: string)\n");
    out.push_str("}\n\n");
    for m in &api.modules {
        out.push_str(&format!("export declare const {}: {{\n", m.name));
        if let Some(errors) = &m.errors {
            for c in &errors.codes {
                out.push_str(&format!("  readonly {}: {}\n", c.name, c.code));
            }
        }
        for f in &m.functions {
            let params: Vec<String> = f
                .params
                .iter()
                .map(|p| format!("{}: {}", p.name, ts_type(p.ty)))
                .collect();
            let ret = f.returns.map(ts_type).unwrap_or("void");
            out.push_str(&format!("  {}({}): {}\n", f.name, params.join(", "), ret));
        }
        out.push_str("}\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::sample_api;
    use weaveffi_ir::Param;

    #[test]
    fn library_declares_runtime_and_functions() {
        let ts = render_node_index_ts(&sample_api());
        assert!(ts.contains("  weaveffi_error_clear: ['void', [__wf_t.pointer]],"));
        assert!(ts.contains("  weaveffi_free_string: ['void', [__wf_t.pointer]],"));
        assert!(ts.contains(
            "  weaveffi_calculator_add: [__wf_t.int32, [__wf_t.int32, __wf_t.int32, __wf_t.pointer]],"
        ));
        assert!(ts.contains(
            "  weaveffi_calculator_echo: [__wf_t.pointer, [__wf_t.pointer, __wf_t.size_t, __wf_t.pointer]],"
        ));
        assert!(ts.contains(
            "  weaveffi_codec_compress: [__wf_t.pointer, [__wf_t.pointer, __wf_t.size_t, __wf_t.pointer, __wf_t.pointer]],"
        ));
        assert!(ts.contains(
            "  weaveffi_codec_reset: ['void', [__wf_t.uint64, __wf_t.bool, __wf_t.pointer]],"
        ));
    }

    #[test]
    fn wrappers_check_and_free() {
        let ts = render_node_index_ts(&sample_api());
        assert!(ts.contains("export const calculator = {"));
        assert!(ts.contains("  DivisionByZero: 1,"));
        assert!(ts.contains("  echo(s: string): string {"));
        assert!(ts.contains("    const __wf_sBuf = Buffer.from(s, 'utf8')"));
        assert!(ts.contains(
            "    const __wf_rv = __wf_lib.weaveffi_calculator_echo(__wf_sBuf, __wf_sBuf.length, __wf_err)"
        ));
        assert!(ts.contains("    return __wf_takeString(__wf_rv)"));
        assert!(ts.contains("    return __wf_takeBytes(__wf_rv, __wf_outLen)"));
        assert!(ts.contains(
            "    __wf_lib.weaveffi_codec_reset(h, hard, __wf_err)\n    __wf_check(__wf_err)\n"
        ));
        assert!(ts.ends_with("export default __wf_lib\n"));
    }

    #[test]
    fn params_named_like_locals_are_passed_through() {
        let mut api = sample_api();
        api.modules[0].functions[0].params = ["err", "rv", "outLen", "sBuf"]
            .iter()
            .map(|n| Param {
                name: n.to_string(),
                ty: TypeRef::I32,
            })
            .collect();
        let ts = render_node_index_ts(&api);
        assert!(ts.contains("  add(err: number, rv: number, outLen: number, sBuf: number): number {"));
        assert!(ts.contains(
            "    const __wf_rv = __wf_lib.weaveffi_calculator_add(err, rv, outLen, sBuf, __wf_err)"
        ));
        assert!(!ts.contains("const err "));
        assert!(!ts.contains("const rv "));
    }

    #[test]
    fn module_names_never_shadow_helpers() {
        let mut api = sample_api();
        api.modules[0].name = "check".to_string();
        api.modules[1].name = "lib".to_string();
        let ts = render_node_index_ts(&api);
        assert!(ts.contains("export const check = {"));
        assert!(ts.contains("export const lib = {"));
        for line in ts.lines().filter(|l| l.starts_with("const ") || l.starts_with("function ")) {
            let name = line.split_whitespace().nth(1).unwrap_or_default();
            assert!(name.starts_with("__wf_"), "unprefixed top-level name: {line}");
        }
    }

    #[test]
    fn declarations() {
        let dts = render_node_dts(&sample_api());
        assert!(dts.contains("export declare const calculator: {"));
        assert!(dts.contains("  add(a: number, b: number): number"));
        assert!(dts.contains("  echo(s: string): string"));
        assert!(dts.contains("  compress(data: Buffer): Buffer"));
        assert!(dts.contains("  reset(h: number, hard: boolean): void"));
        assert!(dts.contains("  readonly Overflow: 2"));
    }

    #[test]
    fn package_json_is_valid() {
        let text = render_package_json(&sample_api());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], "0.1.0");
        assert_eq!(value["types"], "index.d.ts");
    }

    #[test]
    fn generate_writes_package() {
        let dir = tempfile::tempdir().unwrap();
        let files = NodeGenerator.generate(&sample_api(), dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(dir.path().join("node/index.d.ts").is_file());
    }
}
