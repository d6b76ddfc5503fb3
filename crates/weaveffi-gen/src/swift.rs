//! SwiftPM package generation.
//!
//! Layout under `swift/`:
//!
//! ```text
//! Package.swift
//! Sources/CWeaveFFI/module.modulemap   system library over ../../../c/weaveffi.h
//! Sources/WeaveFFI/WeaveFFI.swift      throwing wrapper, one enum per module
//! ```

use std::path::{Path, PathBuf};

use tracing::info;
use weaveffi_core::naming::{c_symbol_name, to_camel, to_lower_camel};
use weaveffi_core::{write_file, CodegenError, Generator};
use weaveffi_ir::{Api, Function, Module, TypeRef};

pub struct SwiftGenerator;

impl Generator for SwiftGenerator {
    fn name(&self) -> &'static str {
        "swift"
    }

    fn generate(&self, api: &Api, out_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        info!("generating SwiftPM package");
        let dir = out_dir.join("swift");
        let sources = dir.join("Sources");
        Ok(vec![
            write_file(&dir.join("Package.swift"), &render_package_swift())?,
            write_file(
                &sources.join("CWeaveFFI").join("module.modulemap"),
                &render_modulemap(),
            )?,
            write_file(
                &sources.join("WeaveFFI").join("WeaveFFI.swift"),
                &render_swift_wrapper(api),
            )?,
        ])
    }
}

pub fn render_package_swift() -> String {
    r#"// swift-tools-version:5.7
import PackageDescription

let package = Package(
    name: "WeaveFFI",
    products: [
        .library(name: "WeaveFFI", targets: ["WeaveFFI"]),
    ],
    targets: [
        .systemLibrary(name: "CWeaveFFI", path: "Sources/CWeaveFFI"),
        .target(name: "WeaveFFI", dependencies: ["CWeaveFFI"], path: "Sources/WeaveFFI"),
    ]
)
"#
    .to_string()
}

pub fn render_modulemap() -> String {
    r#"module CWeaveFFI [system] {
  header "../../../c/weaveffi.h"
  link "weaveffi"
  export *
}
"#
    .to_string()
}

fn swift_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 => "Int32",
        TypeRef::U32 => "UInt32",
        TypeRef::I64 => "Int64",
        TypeRef::F64 => "Double",
        TypeRef::Bool => "Bool",
        TypeRef::StringUtf8 => "String",
        TypeRef::Bytes => "Data",
        TypeRef::Handle => "UInt64",
    }
}

const PRELUDE: &str = r#"// Generated by WeaveFFI. Do not edit.
import CWeaveFFI
import Foundation

public struct WeaveFFIError: Error, CustomStringConvertible {
    public let code: Int32
    public let message: String

    public var description: String { "(\(code)) \(message)" }
}

@inline(__always)
func __wf_check(_ err: inout weaveffi_error) throws {
    if err.code != 0 {
        let code = err.code
        let message = err.message.map { String(cString: $0) } ?? ""
        weaveffi_error_clear(&err)
        throw WeaveFFIError(code: code, message: message)
    }
}

"#;

pub fn render_swift_wrapper(api: &Api) -> String {
    let mut out = String::from(PRELUDE);
    for m in &api.modules {
        out.push_str(&format!("public enum {} {{\n", to_camel(&m.name)));
        if let Some(errors) = &m.errors {
            for c in &errors.codes {
                out.push_str(&format!(
                    "    public static let {}: Int32 = {}\n",
                    to_lower_camel(&c.name),
                    c.code
                ));
            }
            if !errors.codes.is_empty() {
                out.push('\n');
            }
        }
        for (i, f) in m.functions.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_function(&mut out, m, f);
        }
        out.push_str("}\n\n");
    }
    out
}

fn render_function(out: &mut String, module: &Module, f: &Function) {
    if let Some(doc) = &f.doc {
        out.push_str(&format!("    /// {}\n", doc.replace('\n', " ")));
    }
    let params: Vec<String> = f
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, swift_type(p.ty)))
        .collect();
    let ret = f.returns.map(swift_type).unwrap_or("Void");
    out.push_str(&format!(
        "    public static func {}({}) throws -> {} {{\n",
        f.name,
        params.join(", "),
        ret
    ));
    // Locals carry the `__wf_` prefix, which parameter names cannot use.
    out.push_str("        var __wf_err = weaveffi_error(code: 0, message: nil)\n");

    for p in f.params.iter().filter(|p| p.ty.is_buffer()) {
        let source = match p.ty {
            TypeRef::StringUtf8 => format!("Array({}.utf8)", p.name),
            _ => format!("[UInt8]({})", p.name),
        };
        out.push_str(&format!("        let __wf_{}_bytes = {}\n", p.name, source));
    }
    if f.returns == Some(TypeRef::Bytes) {
        out.push_str("        var __wf_out_len: Int = 0\n");
    }

    let mut args: Vec<String> = Vec::new();
    for p in &f.params {
        if p.ty.is_buffer() {
            args.push(format!("__wf_{}_buf.baseAddress", p.name));
            args.push(format!("__wf_{}_buf.count", p.name));
        } else {
            args.push(p.name.clone());
        }
    }
    if f.returns == Some(TypeRef::Bytes) {
        args.push("&__wf_out_len".to_string());
    }
    args.push("&__wf_err".to_string());

    let mut call = format!("{}({})", c_symbol_name(&module.name, &f.name), args.join(", "));
    for p in f.params.iter().rev().filter(|p| p.ty.is_buffer()) {
        call = format!(
            "__wf_{n}_bytes.withUnsafeBufferPointer {{ __wf_{n}_buf in {call} }}",
            n = p.name
        );
    }

    match f.returns {
        None => {
            out.push_str(&format!("        {call}\n"));
            out.push_str("        try __wf_check(&__wf_err)\n");
        }
        Some(TypeRef::StringUtf8) => {
            out.push_str(&format!("        let __wf_rv = {call}\n"));
            out.push_str("        try __wf_check(&__wf_err)\n");
            out.push_str("        guard let __wf_rv = __wf_rv else {\n");
            out.push_str("            throw WeaveFFIError(code: -1, message: \"null string\")\n");
            out.push_str("        }\n");
            out.push_str("        defer { weaveffi_free_string(__wf_rv) }\n");
            out.push_str("        return String(cString: __wf_rv)\n");
        }
        Some(TypeRef::Bytes) => {
            out.push_str(&format!("        let __wf_rv = {call}\n"));
            out.push_str("        try __wf_check(&__wf_err)\n");
            out.push_str("        guard let __wf_rv = __wf_rv else { return Data() }\n");
            out.push_str(
                "        defer { weaveffi_free_bytes(UnsafeMutablePointer(mutating: __wf_rv), __wf_out_len) }\n",
            );
            out.push_str("        return Data(bytes: __wf_rv, count: __wf_out_len)\n");
        }
        Some(_) => {
            out.push_str(&format!("        let __wf_rv = {call}\n"));
            out.push_str("        try __wf_check(&__wf_err)\n");
            out.push_str("        return __wf_rv\n");
        }
    }
    out.push_str("    }\n");
}
