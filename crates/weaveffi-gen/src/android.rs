//! Android library generation: Gradle project, JNI glue in C, and Kotlin
//! `external` declarations.
//!
//! Each Kotlin function is a public wrapper over a private `external` one.
//! Strings cross JNI as UTF-8 `ByteArray`s rather than `jstring`, because
//! JNI's string calls use modified UTF-8. The C glue pins byte arrays into
//! pointer/length pairs, calls the C ABI, and turns a non-zero `out_err`
//! into a `RuntimeException` whose message carries the code.

use std::path::{Path, PathBuf};

use tracing::info;
use weaveffi_core::naming::{
    c_symbol_name, to_camel, to_lower_camel, to_upper_snake, GENERATED_PREFIX,
};
use weaveffi_core::{write_file, CodegenError, Generator};
use weaveffi_ir::{Api, Function, Module, TypeRef};

use crate::c::c_scalar_type;

/// Java package of every generated class.
pub const PACKAGE: &str = "com.weaveffi";

pub struct AndroidGenerator;

impl Generator for AndroidGenerator {
    fn name(&self) -> &'static str {
        "android"
    }

    fn generate(&self, api: &Api, out_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        info!("generating Android JNI library");
        let dir = out_dir.join("android");
        let main = dir.join("src").join("main");
        let kotlin = main.join("kotlin").join(PACKAGE.replace('.', "/"));
        Ok(vec![
            write_file(&dir.join("settings.gradle"), &render_settings_gradle())?,
            write_file(&dir.join("build.gradle"), &render_build_gradle())?,
            write_file(&main.join("cpp").join("CMakeLists.txt"), &render_cmake())?,
            write_file(&main.join("cpp").join("weaveffi_jni.c"), &render_jni_c(api))?,
            write_file(&kotlin.join("WeaveFFI.kt"), &render_kotlin(api))?,
        ])
    }
}

pub fn render_settings_gradle() -> String {
    "rootProject.name = 'weaveffi'\n".to_string()
}

pub fn render_build_gradle() -> String {
    format!(
        r#"plugins {{
    id 'com.android.library'
    id 'org.jetbrains.kotlin.android'
}}

android {{
    namespace '{PACKAGE}'
    compileSdk 34

    defaultConfig {{
        minSdk 24
    }}

    externalNativeBuild {{
        cmake {{
            path 'src/main/cpp/CMakeLists.txt'
        }}
    }}
}}
"#
    )
}

pub fn render_cmake() -> String {
    r#"cmake_minimum_required(VERSION 3.18)
project(weaveffi_jni C)

add_library(weaveffi SHARED IMPORTED)
set_target_properties(weaveffi PROPERTIES
    IMPORTED_LOCATION ${CMAKE_SOURCE_DIR}/../jniLibs/${ANDROID_ABI}/libweaveffi.so)

add_library(weaveffi_jni SHARED weaveffi_jni.c)
target_include_directories(weaveffi_jni PRIVATE ${CMAKE_SOURCE_DIR}/../../../../c)
target_link_libraries(weaveffi_jni weaveffi)
"#
    .to_string()
}

/// Type of a parameter or return in the public Kotlin API.
fn kotlin_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 => "Int",
        TypeRef::U32 | TypeRef::I64 | TypeRef::Handle => "Long",
        TypeRef::F64 => "Double",
        TypeRef::Bool => "Boolean",
        TypeRef::StringUtf8 => "String",
        TypeRef::Bytes => "ByteArray",
    }
}

/// Type of a parameter or return in the private `external` declaration.
/// Strings cross JNI as UTF-8 byte arrays.
fn kotlin_native_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::StringUtf8 => "ByteArray",
        ty => kotlin_type(ty),
    }
}

fn jni_type(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 => "jint",
        TypeRef::U32 | TypeRef::I64 | TypeRef::Handle => "jlong",
        TypeRef::F64 => "jdouble",
        TypeRef::Bool => "jboolean",
        TypeRef::StringUtf8 | TypeRef::Bytes => "jbyteArray",
    }
}

/// C cast applied when passing a JNI scalar to the C ABI.
fn c_cast(ty: TypeRef) -> &'static str {
    match ty {
        TypeRef::I32 => "(int32_t)",
        TypeRef::U32 => "(uint32_t)",
        TypeRef::I64 => "(int64_t)",
        TypeRef::F64 => "(double)",
        TypeRef::Handle => "(weaveffi_handle_t)",
        TypeRef::Bool | TypeRef::StringUtf8 | TypeRef::Bytes => "",
    }
}

/// Statement that leaves a JNI function after an exception is pending.
fn jni_bail(returns: Option<TypeRef>) -> String {
    match returns {
        None => "return;".to_string(),
        Some(TypeRef::Bool) => "return JNI_FALSE;".to_string(),
        Some(TypeRef::StringUtf8 | TypeRef::Bytes) => "return NULL;".to_string(),
        Some(_) => "return 0;".to_string(),
    }
}

/// Name of the private `external` function behind a public Kotlin wrapper.
fn native_name(f: &Function) -> String {
    format!("{GENERATED_PREFIX}{}", to_lower_camel(&f.name))
}

/// JNI short-name escaping: `_` becomes `_1`. Identifiers are ASCII, so no
/// other escapes apply.
fn jni_mangle(name: &str) -> String {
    name.replace('_', "_1")
}

const JNI_PRELUDE: &str = r#"/* Generated by WeaveFFI. Do not edit. */
#include <jni.h>
#include <stdio.h>
#include <string.h>
#include "weaveffi.h"

static void weaveffi_raise(JNIEnv* env, const char* message) {
    jclass cls = (*env)->FindClass(env, "java/lang/RuntimeException");
    if (cls != NULL) {
        (*env)->ThrowNew(env, cls, message);
    }
}

/* Throws RuntimeException("(code) message") and clears err. Returns 1 if thrown. */
static int weaveffi_throw(JNIEnv* env, weaveffi_error* err) {
    if (err->code == 0) {
        return 0;
    }
    char buf[512];
    snprintf(buf, sizeof(buf), "(%d) %s", err->code, err->message ? err->message : "");
    weaveffi_error_clear(err);
    weaveffi_raise(env, buf);
    return 1;
}

/* Copies len bytes into a new byte[]. NULL with an exception pending on failure. */
static jbyteArray weaveffi_bytes(JNIEnv* env, const void* data, size_t len) {
    jbyteArray arr = (*env)->NewByteArray(env, (jsize)len);
    if (arr != NULL && len > 0) {
        (*env)->SetByteArrayRegion(env, arr, 0, (jsize)len, (const jbyte*)data);
    }
    return arr;
}

"#;

pub fn render_jni_c(api: &Api) -> String {
    let mut out = String::from(JNI_PRELUDE);
    for m in &api.modules {
        for f in &m.functions {
            render_jni_function(&mut out, m, f);
        }
    }
    out
}

fn jni_export_name(module: &Module, f: &Function) -> String {
    format!(
        "Java_{}_{}_{}",
        PACKAGE.replace('.', "_"),
        jni_mangle(&to_camel(&module.name)),
        jni_mangle(&native_name(f))
    )
}

// Locals carry the `__wf_` prefix, which parameter names cannot use.
fn render_jni_function(out: &mut String, module: &Module, f: &Function) {
    let ret = f.returns.map(jni_type).unwrap_or("void");
    let bail = jni_bail(f.returns);
    let mut params = vec!["JNIEnv* __wf_env".to_string(), "jclass __wf_cls".to_string()];
    params.extend(f.params.iter().map(|p| format!("{} {}", jni_type(p.ty), p.name)));
    out.push_str(&format!(
        "JNIEXPORT {} JNICALL {}({}) {{\n",
        ret,
        jni_export_name(module, f),
        params.join(", ")
    ));
    out.push_str("    (void)__wf_cls;\n");
    out.push_str("    weaveffi_error __wf_err = {0, NULL};\n");

    let buffers: Vec<&str> = f
        .params
        .iter()
        .filter(|p| p.ty.is_buffer())
        .map(|p| p.name.as_str())
        .collect();
    for (i, n) in buffers.iter().enumerate() {
        out.push_str(&format!(
            "    jsize __wf_{n}_len = (*__wf_env)->GetArrayLength(__wf_env, {n});\n"
        ));
        out.push_str(&format!(
            "    jbyte* __wf_{n}_elems = (*__wf_env)->GetByteArrayElements(__wf_env, {n}, NULL);\n"
        ));
        out.push_str(&format!("    if (__wf_{n}_elems == NULL) {{\n"));
        for held in &buffers[..i] {
            out.push_str(&format!("        {}\n", release(held)));
        }
        out.push_str(&format!("        {bail}\n    }}\n"));
    }
    if f.returns == Some(TypeRef::Bytes) {
        out.push_str("    size_t __wf_out_len = 0;\n");
    }

    let mut args = Vec::new();
    for p in &f.params {
        match p.ty {
            TypeRef::StringUtf8 | TypeRef::Bytes => {
                args.push(format!("(const uint8_t*)__wf_{}_elems", p.name));
                args.push(format!("(size_t)__wf_{}_len", p.name));
            }
            TypeRef::Bool => args.push(format!("{} == JNI_TRUE", p.name)),
            ty => args.push(format!("{}{}", c_cast(ty), p.name)),
        }
    }
    if f.returns == Some(TypeRef::Bytes) {
        args.push("&__wf_out_len".to_string());
    }
    args.push("&__wf_err".to_string());

    let call = format!("{}({})", c_symbol_name(&module.name, &f.name), args.join(", "));
    match f.returns {
        None => out.push_str(&format!("    {call};\n")),
        Some(TypeRef::StringUtf8) => out.push_str(&format!("    const char* __wf_rv = {call};\n")),
        Some(TypeRef::Bytes) => out.push_str(&format!("    const uint8_t* __wf_rv = {call};\n")),
        Some(ty) => out.push_str(&format!("    {} __wf_rv = {call};\n", c_scalar_type(ty))),
    }

    for n in &buffers {
        out.push_str(&format!("    {}\n", release(n)));
    }

    if f.returns.is_none() {
        out.push_str("    weaveffi_throw(__wf_env, &__wf_err);\n}\n\n");
        return;
    }
    out.push_str(&format!(
        "    if (weaveffi_throw(__wf_env, &__wf_err)) {{\n        {bail}\n    }}\n"
    ));
    match f.returns {
        Some(TypeRef::StringUtf8) => {
            out.push_str("    if (__wf_rv == NULL) {\n");
            out.push_str("        weaveffi_raise(__wf_env, \"(-1) null string\");\n");
            out.push_str("        return NULL;\n    }\n");
            out.push_str(
                "    jbyteArray __wf_jrv = weaveffi_bytes(__wf_env, __wf_rv, strlen(__wf_rv));\n",
            );
            out.push_str("    weaveffi_free_string(__wf_rv);\n");
            out.push_str("    return __wf_jrv;\n");
        }
        Some(TypeRef::Bytes) => {
            out.push_str(
                "    jbyteArray __wf_jrv = weaveffi_bytes(__wf_env, __wf_rv, __wf_out_len);\n",
            );
            out.push_str("    weaveffi_free_bytes((uint8_t*)__wf_rv, __wf_out_len);\n");
            out.push_str("    return __wf_jrv;\n");
        }
        Some(TypeRef::Bool) => out.push_str("    return __wf_rv ? JNI_TRUE : JNI_FALSE;\n"),
        Some(ty) => out.push_str(&format!("    return ({})__wf_rv;\n", jni_type(ty))),
        None => {}
    }
    out.push_str("}\n\n");
}

fn release(n: &str) -> String {
    format!("(*__wf_env)->ReleaseByteArrayElements(__wf_env, {n}, __wf_{n}_elems, JNI_ABORT);")
}

pub fn render_kotlin(api: &Api) -> String {
    let mut out = String::from("// Generated by WeaveFFI. Do not edit.\n");
    out.push_str(&format!("package {PACKAGE}\n\n"));
    for m in &api.modules {
        out.push_str(&format!("object {} {{\n", to_camel(&m.name)));
        out.push_str("    init {\n        System.loadLibrary(\"weaveffi_jni\")\n    }\n\n");
        if let Some(errors) = &m.errors {
            for c in &errors.codes {
                out.push_str(&format!(
                    "    const val {}: Int = {}\n",
                    to_upper_snake(&c.name),
                    c.code
                ));
            }
            if !errors.codes.is_empty() {
                out.push('\n');
            }
        }
        for f in &m.functions {
            render_kotlin_function(&mut out, f);
        }
        out.push_str("}\n\n");
    }
    out
}

/// A public wrapper that converts strings to and from UTF-8, over a private
/// `external` declaration bound to the JNI glue.
fn render_kotlin_function(out: &mut String, f: &Function) {
    let native = native_name(f);
    if let Some(doc) = &f.doc {
        out.push_str(&format!("    /** {} */\n", doc.replace("*/", "* /").replace('\n', " ")));
    }

    let params: Vec<String> = f
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, kotlin_type(p.ty)))
        .collect();
    let args: Vec<String> = f
        .params
        .iter()
        .map(|p| match p.ty {
            TypeRef::StringUtf8 => format!("{}.toByteArray(Charsets.UTF_8)", p.name),
            _ => p.name.clone(),
        })
        .collect();
    let call = format!("{native}({})", args.join(", "));
    let body = match f.returns {
        Some(TypeRef::StringUtf8) => format!("String({call}, Charsets.UTF_8)"),
        _ => call,
    };
    let ret = f
        .returns
        .map(|ty| format!(": {}", kotlin_type(ty)))
        .unwrap_or_default();
    out.push_str(&format!(
        "    @JvmStatic fun {}({}){} = {}\n",
        to_lower_camel(&f.name),
        params.join(", "),
        ret,
        body
    ));

    let native_params: Vec<String> = f
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, kotlin_native_type(p.ty)))
        .collect();
    let native_ret = f
        .returns
        .map(|ty| format!(": {}", kotlin_native_type(ty)))
        .unwrap_or_default();
    out.push_str(&format!(
        "    @JvmStatic private external fun {}({}){}\n\n",
        native,
        native_params.join(", "),
        native_ret
    ));
}
