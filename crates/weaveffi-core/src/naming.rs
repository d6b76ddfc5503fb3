//! Naming rules shared by all generators.
//!
//! Every exported symbol is `weaveffi_<module>_<function>`, so module and
//! function names must be plain C identifiers.

/// Prefix for every exported C symbol.
pub const SYMBOL_PREFIX: &str = "weaveffi";

/// Names that break at least one target language when used as an identifier:
/// keywords of Rust, C, Swift, Kotlin and TypeScript, plus type names the
/// generated code declares or refers to.
pub const RESERVED: &[&str] = &[
    // Rust
    "if", "else", "for", "while", "loop", "match", "type", "return", "async", "await", "break",
    "continue", "fn", "struct", "enum", "mod", "use", "impl", "trait", "let", "mut", "ref",
    "self", "Self", "super", "crate", "pub", "where", "move", "dyn", "unsafe", "true", "false",
    "in", "as",
    // C
    "int", "char", "void", "const", "static", "extern", "auto", "case", "default", "do",
    "double", "float", "goto", "inline", "long", "register", "restrict", "short", "signed",
    "sizeof", "switch", "typedef", "union", "unsigned", "volatile", "bool", "NULL",
    // Swift
    "associatedtype", "class", "deinit", "extension", "fileprivate", "func", "import", "init",
    "inout", "internal", "operator", "private", "protocol", "public", "rethrows", "subscript",
    "typealias", "var", "defer", "fallthrough", "guard", "repeat", "throw", "catch", "Any",
    "is", "nil", "throws", "try",
    // Kotlin
    "fun", "val", "object", "interface", "package", "this", "typeof", "when", "null",
    // JavaScript / TypeScript
    "function", "new", "delete", "instanceof", "with", "yield", "export", "extends", "finally",
    "debugger", "implements", "protected", "arguments", "eval",
    // Types named in generated C and JNI code
    "int8_t", "uint8_t", "int32_t", "uint32_t", "int64_t", "uint64_t", "size_t", "jint",
    "jlong", "jdouble", "jboolean", "jbyte", "jbyteArray", "jsize", "jclass", "jstring",
    "jobject", "JNIEnv",
    // Declared by the generated bindings
    "WeaveFFIError",
];

/// Type names the bindings refer to. A module whose type name (`to_camel`)
/// matches one of these would shadow it in Swift or Kotlin.
pub const BINDING_TYPE_NAMES: &[&str] = &[
    "Int", "Int32", "UInt32", "Int64", "UInt64", "Long", "Double", "Bool", "Boolean", "String",
    "Data", "ByteArray", "Buffer", "Void", "Unit", "Error", "Foundation", "System", "Charsets",
    "WeaveFFI", "CWeaveFFI",
];

/// Prefix of every local and helper name the generators emit. Interface
/// names may not start with it.
pub const GENERATED_PREFIX: &str = "__wf_";

/// Parameter names used by generated C signatures.
pub const GENERATED_PARAMS: &[&str] = &["out_err", "out_len"];

/// Symbols exported by the runtime and types declared in the C header.
pub const RUNTIME_SYMBOLS: &[&str] = &[
    "weaveffi_error_clear",
    "weaveffi_free_string",
    "weaveffi_free_bytes",
    "weaveffi_handle_t",
];

/// Preprocessor constants declared by the C header.
pub const RUNTIME_CONSTANTS: &[&str] = &["WEAVEFFI_API_VERSION"];

/// Whether `name` is on the reserved list.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Whether a module's generated type name would shadow a type the bindings
/// use.
pub fn is_binding_type_name(name: &str) -> bool {
    BINDING_TYPE_NAMES.contains(&name)
}

/// Check that `name` is a C identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn check_identifier(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("empty name"),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Err("must start with a letter or underscore"),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("may only contain ASCII letters, digits, and underscores");
    }
    if name.starts_with(GENERATED_PREFIX.trim_end_matches('_')) {
        return Err("the __wf prefix is reserved for generated code");
    }
    Ok(())
}

/// The exported C symbol for a function.
pub fn c_symbol_name(module: &str, function: &str) -> String {
    format!("{SYMBOL_PREFIX}_{module}_{function}")
}

/// The C preprocessor constant for an error code, e.g.
/// `WEAVEFFI_CALCULATOR_DIVISION_BY_ZERO`.
pub fn error_constant_name(module: &str, code_name: &str) -> String {
    format!(
        "{}_{}_{}",
        SYMBOL_PREFIX.to_ascii_uppercase(),
        to_upper_snake(module),
        to_upper_snake(code_name)
    )
}

/// `snake_case` → `UpperCamelCase`. Empty segments are skipped.
pub fn to_camel(s: &str) -> String {
    s.split('_').filter(|p| !p.is_empty()).map(capitalize).collect()
}

/// `snake_case` → `lowerCamelCase`.
pub fn to_lower_camel(s: &str) -> String {
    let camel = to_camel(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `UpperCamelCase` or `snake_case` → `UPPER_SNAKE_CASE`.
pub fn to_upper_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in s.chars() {
        if c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower_or_digit {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
        prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    out
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_names() {
        assert_eq!(c_symbol_name("calculator", "add"), "weaveffi_calculator_add");
    }

    #[test]
    fn error_constants() {
        assert_eq!(
            error_constant_name("calculator", "DivisionByZero"),
            "WEAVEFFI_CALCULATOR_DIVISION_BY_ZERO"
        );
        assert_eq!(
            error_constant_name("key_store", "IoFailure2"),
            "WEAVEFFI_KEY_STORE_IO_FAILURE2"
        );
    }

    #[test]
    fn camel_case() {
        assert_eq!(to_camel("calculator"), "Calculator");
        assert_eq!(to_camel("key_store"), "KeyStore");
        assert_eq!(to_camel("__a"), "A");
        assert_eq!(to_camel(""), "");
        assert_eq!(to_lower_camel("get_value"), "getValue");
        assert_eq!(to_lower_camel("add"), "add");
    }

    #[test]
    fn upper_snake() {
        assert_eq!(to_upper_snake("Overflow"), "OVERFLOW");
        assert_eq!(to_upper_snake("InvalidUtf8"), "INVALID_UTF8");
        assert_eq!(to_upper_snake("already_snake"), "ALREADY_SNAKE");
    }

    #[test]
    fn identifiers() {
        assert!(check_identifier("calculator").is_ok());
        assert!(check_identifier("_private9").is_ok());
        assert!(check_identifier("").is_err());
        assert!(check_identifier("9lives").is_err());
        assert!(check_identifier("has-dash").is_err());
        assert!(check_identifier("ünicode").is_err());
        assert!(check_identifier("__wf_err").is_err());
        assert!(check_identifier("__wfx").is_err());
        assert!(check_identifier("__w").is_ok());
    }

    #[test]
    fn reserved_words() {
        assert!(is_reserved("match"));
        assert!(is_reserved("void"));
        assert!(!is_reserved("add"));
        for word in ["class", "default", "new", "fun", "val", "func", "guard", "nil", "object"] {
            assert!(is_reserved(word), "{word}");
        }
        assert!(!is_reserved("Match"));
        assert!(is_binding_type_name(&to_camel("data")));
        assert!(!is_binding_type_name(&to_camel("calculator")));
    }
}
