//! Structural validation of an interface definition.
//!
//! Checks run in declaration order and stop at the first problem, so the
//! reported error always refers to the earliest offending item. Besides the
//! names in the definition itself, the names the generators derive from them
//! (C symbols, error constants, binding type and member names) must be
//! unique and must not shadow anything the runtime or a binding declares.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;
use weaveffi_ir::{Api, ErrorDomain, Function, Module};

use crate::error::ValidationError;
use crate::naming::{
    c_symbol_name, check_identifier, error_constant_name, is_binding_type_name, is_reserved,
    to_camel, to_lower_camel, GENERATED_PARAMS, RUNTIME_CONSTANTS, RUNTIME_SYMBOLS,
};

/// Validate a parsed API.
pub fn validate_api(api: &Api) -> Result<(), ValidationError> {
    if api.version.trim().is_empty() {
        return Err(ValidationError::MissingVersion);
    }

    let mut module_names = BTreeSet::new();
    let mut emitted = EmittedNames::default();
    for m in &api.modules {
        validate_module(m)?;
        if !module_names.insert(m.name.as_str()) {
            return Err(ValidationError::DuplicateModuleName(m.name.clone()));
        }
        emitted.record(m)?;
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    check_identifier(name).map_err(|reason| ValidationError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    })?;
    if is_reserved(name) {
        return Err(ValidationError::ReservedKeyword(name.to_string()));
    }
    Ok(())
}

fn validate_module(module: &Module) -> Result<(), ValidationError> {
    if module.name.trim().is_empty() {
        return Err(ValidationError::NoModuleName);
    }
    validate_name(&module.name)?;

    let type_name = to_camel(&module.name);
    validate_name(&type_name)?;
    if is_binding_type_name(&type_name) {
        return Err(ValidationError::BindingTypeName {
            module: module.name.clone(),
            name: type_name,
        });
    }

    if module.functions.is_empty() {
        warn!(module = %module.name, "module declares no functions");
    }

    let mut function_names = BTreeSet::new();
    for f in &module.functions {
        validate_function(module, f)?;
        if !function_names.insert(f.name.as_str()) {
            return Err(ValidationError::DuplicateFunctionName {
                module: module.name.clone(),
                function: f.name.clone(),
            });
        }
    }

    if let Some(errors) = &module.errors {
        validate_error_domain(module, errors, &function_names)?;
    }
    validate_members(module)
}

fn validate_function(module: &Module, f: &Function) -> Result<(), ValidationError> {
    validate_name(&f.name)?;
    if f.is_async {
        return Err(ValidationError::AsyncNotSupported {
            module: module.name.clone(),
            function: f.name.clone(),
        });
    }

    let mut param_names = BTreeSet::new();
    for p in &f.params {
        validate_name(&p.name)?;
        if !param_names.insert(p.name.as_str()) {
            return Err(ValidationError::DuplicateParamName {
                module: module.name.clone(),
                function: f.name.clone(),
                param: p.name.clone(),
            });
        }
    }

    // Buffer params expand to `<name>_ptr` / `<name>_len` in C.
    let mut c_names: BTreeSet<String> = GENERATED_PARAMS.iter().map(|s| s.to_string()).collect();
    for p in &f.params {
        let expanded = if p.ty.is_buffer() {
            vec![format!("{}_ptr", p.name), format!("{}_len", p.name)]
        } else {
            vec![p.name.clone()]
        };
        for name in expanded {
            if !c_names.insert(name) {
                return Err(ValidationError::ParamNameCollision {
                    module: module.name.clone(),
                    function: f.name.clone(),
                    param: p.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_error_domain(
    module: &Module,
    errors: &ErrorDomain,
    function_names: &BTreeSet<&str>,
) -> Result<(), ValidationError> {
    if errors.name.trim().is_empty() {
        return Err(ValidationError::ErrorDomainMissingName(module.name.clone()));
    }
    check_identifier(&errors.name).map_err(|reason| ValidationError::InvalidIdentifier {
        name: errors.name.clone(),
        reason,
    })?;
    if function_names.contains(errors.name.as_str()) {
        return Err(ValidationError::NameCollisionWithErrorDomain {
            module: module.name.clone(),
            name: errors.name.clone(),
        });
    }

    let mut by_name = BTreeSet::new();
    let mut by_code = BTreeMap::new();
    for c in &errors.codes {
        validate_name(&c.name)?;
        if c.code == 0 {
            return Err(ValidationError::InvalidErrorCode {
                module: module.name.clone(),
                name: c.name.clone(),
            });
        }
        if !by_name.insert(c.name.as_str()) {
            return Err(ValidationError::DuplicateErrorName {
                module: module.name.clone(),
                name: c.name.clone(),
            });
        }
        if by_code.insert(c.code, c.name.as_str()).is_some() {
            return Err(ValidationError::DuplicateErrorCode {
                module: module.name.clone(),
                code: c.code,
            });
        }
    }
    Ok(())
}

/// Member names as each binding spells them. Node and Swift put functions
/// and error codes in one namespace per module; Kotlin camel-cases function
/// names.
fn validate_members(module: &Module) -> Result<(), ValidationError> {
    let codes = module.errors.iter().flat_map(|e| e.codes.iter());

    let node = module
        .functions
        .iter()
        .map(|f| f.name.clone())
        .chain(codes.clone().map(|c| c.name.clone()));
    let swift = module
        .functions
        .iter()
        .map(|f| f.name.clone())
        .chain(codes.map(|c| to_lower_camel(&c.name)));
    let kotlin = module.functions.iter().map(|f| to_lower_camel(&f.name));

    for names in [node.collect::<Vec<_>>(), swift.collect(), kotlin.collect()] {
        let mut seen = BTreeSet::new();
        for name in names {
            validate_name(&name)?;
            if !seen.insert(name.clone()) {
                return Err(ValidationError::MemberNameCollision {
                    module: module.name.clone(),
                    name,
                });
            }
        }
    }
    Ok(())
}

/// Names that share one namespace across every module.
#[derive(Default)]
struct EmittedNames {
    symbols: BTreeSet<String>,
    constants: BTreeSet<String>,
    types: BTreeSet<String>,
}

impl EmittedNames {
    fn record(&mut self, module: &Module) -> Result<(), ValidationError> {
        let type_name = to_camel(&module.name);
        if !self.types.insert(type_name.clone()) {
            return Err(ValidationError::SymbolCollision(type_name));
        }

        for f in &module.functions {
            let symbol = c_symbol_name(&module.name, &f.name);
            if RUNTIME_SYMBOLS.contains(&symbol.as_str()) {
                return Err(ValidationError::RuntimeSymbolCollision(symbol));
            }
            if !self.symbols.insert(symbol.clone()) {
                return Err(ValidationError::SymbolCollision(symbol));
            }
        }

        for c in module.errors.iter().flat_map(|e| e.codes.iter()) {
            let constant = error_constant_name(&module.name, &c.name);
            if RUNTIME_CONSTANTS.contains(&constant.as_str()) {
                return Err(ValidationError::RuntimeSymbolCollision(constant));
            }
            if !self.constants.insert(constant.clone()) {
                return Err(ValidationError::SymbolCollision(constant));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaveffi_ir::{ErrorCode, Param, TypeRef};

    fn func(name: &str, params: &[(&str, TypeRef)]) -> Function {
        Function {
            name: name.to_string(),
            params: params
                .iter()
                .map(|(n, ty)| Param {
                    name: n.to_string(),
                    ty: *ty,
                })
                .collect(),
            returns: Some(TypeRef::I32),
            doc: None,
            is_async: false,
        }
    }

    fn api_with(functions: Vec<Function>, errors: Option<ErrorDomain>) -> Api {
        Api {
            version: "0.1.0".to_string(),
            modules: vec![Module {
                name: "calculator".to_string(),
                functions,
                errors,
            }],
        }
    }

    fn domain(codes: &[(&str, i32)]) -> ErrorDomain {
        ErrorDomain {
            name: "CalculatorError".to_string(),
            codes: codes
                .iter()
                .map(|(n, c)| ErrorCode {
                    name: n.to_string(),
                    code: *c,
                    message: format!("{n} happened"),
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_calculator() {
        let api = api_with(
            vec![
                func("add", &[("a", TypeRef::I32), ("b", TypeRef::I32)]),
                func("echo", &[("s", TypeRef::StringUtf8)]),
            ],
            Some(domain(&[("DivisionByZero", 1), ("Overflow", 2)])),
        );
        assert_eq!(validate_api(&api), Ok(()));
    }

    #[test]
    fn rejects_empty_version() {
        let mut api = api_with(vec![], None);
        api.version = "  ".to_string();
        assert_eq!(validate_api(&api), Err(ValidationError::MissingVersion));
    }

    #[test]
    fn rejects_duplicate_modules() {
        let mut api = api_with(vec![func("add", &[])], None);
        api.modules.push(api.modules[0].clone());
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::DuplicateModuleName("calculator".to_string()))
        );
    }

    #[test]
    fn rejects_empty_module_name() {
        let mut api = api_with(vec![], None);
        api.modules[0].name = String::new();
        assert_eq!(validate_api(&api), Err(ValidationError::NoModuleName));
    }

    #[test]
    fn rejects_bad_identifiers() {
        let api = api_with(vec![func("add-two", &[])], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::InvalidIdentifier { ref name, .. }) if name == "add-two"
        ));
    }

    #[test]
    fn rejects_reserved_names() {
        let api = api_with(vec![func("match", &[])], None);
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::ReservedKeyword("match".to_string()))
        );

        let api = api_with(vec![func("f", &[("type", TypeRef::I32)])], None);
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::ReservedKeyword("type".to_string()))
        );
    }

    #[test]
    fn rejects_duplicate_functions_and_params() {
        let api = api_with(vec![func("add", &[]), func("add", &[])], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::DuplicateFunctionName { .. })
        ));

        let api = api_with(vec![func("add", &[("a", TypeRef::I32), ("a", TypeRef::I64)])], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::DuplicateParamName { ref param, .. }) if param == "a"
        ));
    }

    #[test]
    fn rejects_async() {
        let mut f = func("later", &[]);
        f.is_async = true;
        let api = api_with(vec![f], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::AsyncNotSupported { .. })
        ));
    }

    #[test]
    fn rejects_generated_param_collisions() {
        let api = api_with(
            vec![func("f", &[("s", TypeRef::StringUtf8), ("s_len", TypeRef::I32)])],
            None,
        );
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::ParamNameCollision { ref param, .. }) if param == "s_len"
        ));

        let api = api_with(vec![func("f", &[("out_err", TypeRef::I32)])], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::ParamNameCollision { .. })
        ));
    }

    #[test]
    fn rejects_error_domain_problems() {
        let api = api_with(vec![func("add", &[])], Some(domain(&[("Zero", 0)])));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::InvalidErrorCode { .. })
        ));

        let api = api_with(vec![], Some(domain(&[("A", 1), ("A", 2)])));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::DuplicateErrorName { .. })
        ));

        let api = api_with(vec![], Some(domain(&[("A", 1), ("B", 1)])));
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::DuplicateErrorCode {
                module: "calculator".to_string(),
                code: 1
            })
        );

        let mut d = domain(&[]);
        d.name = String::new();
        let api = api_with(vec![], Some(d));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::ErrorDomainMissingName(_))
        ));

        let mut d = domain(&[]);
        d.name = "add".to_string();
        let api = api_with(vec![func("add", &[])], Some(d));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::NameCollisionWithErrorDomain { .. })
        ));
    }

    fn module(name: &str, functions: Vec<Function>, errors: Option<ErrorDomain>) -> Module {
        Module {
            name: name.to_string(),
            functions,
            errors,
        }
    }

    #[test]
    fn rejects_c_symbol_collisions_across_modules() {
        let mut api = api_with(vec![], None);
        api.modules = vec![
            module("a_b", vec![func("c", &[])], None),
            module("a", vec![func("b_c", &[])], None),
        ];
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::SymbolCollision("weaveffi_a_b_c".to_string()))
        );
    }

    #[test]
    fn rejects_runtime_symbol_collisions() {
        for (m, f, symbol) in [
            ("free", "string", "weaveffi_free_string"),
            ("free", "bytes", "weaveffi_free_bytes"),
            ("handle", "t", "weaveffi_handle_t"),
        ] {
            let mut api = api_with(vec![], None);
            api.modules = vec![module(m, vec![func(f, &[("x", TypeRef::I32)])], None)];
            assert_eq!(
                validate_api(&api),
                Err(ValidationError::RuntimeSymbolCollision(symbol.to_string()))
            );
        }

        let mut api = api_with(vec![], None);
        api.modules = vec![module("api", vec![], Some(domain(&[("Version", 1)])))];
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::RuntimeSymbolCollision("WEAVEFFI_API_VERSION".to_string()))
        );
    }

    #[test]
    fn rejects_invalid_error_code_names() {
        let api = api_with(vec![], Some(domain(&[("HAS-DASH", 1)])));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::InvalidIdentifier { ref name, .. }) if name == "HAS-DASH"
        ));

        let mut d = domain(&[("A", 1)]);
        d.name = "Calculator Error".to_string();
        let api = api_with(vec![], Some(d));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::InvalidIdentifier { .. })
        ));

        // Swift spells the code `default`.
        let api = api_with(vec![], Some(domain(&[("Default", 1)])));
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::ReservedKeyword("default".to_string()))
        );
    }

    #[test]
    fn rejects_error_constant_collisions() {
        let api = api_with(vec![], Some(domain(&[("Io2", 1), ("IO2", 2)])));
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::SymbolCollision(
                "WEAVEFFI_CALCULATOR_IO2".to_string()
            ))
        );

        let mut api = api_with(vec![], None);
        api.modules = vec![
            module("a_b", vec![], Some(domain(&[("C", 1)]))),
            module("a", vec![], Some(domain(&[("B_C", 1)]))),
        ];
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::SymbolCollision("WEAVEFFI_A_B_C".to_string()))
        );
    }

    #[test]
    fn rejects_binding_member_collisions() {
        // Both become `ioError` in Swift.
        let api = api_with(vec![], Some(domain(&[("IoError", 2), ("Io_Error", 3)])));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::MemberNameCollision { ref name, .. }) if name == "ioError"
        ));

        // Both become `getX` in Kotlin.
        let api = api_with(vec![func("get_x", &[]), func("getX", &[])], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::MemberNameCollision { ref name, .. }) if name == "getX"
        ));

        // Functions and codes share the module object in Node.
        let api = api_with(vec![func("Overflow", &[])], Some(domain(&[("Overflow", 2)])));
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::MemberNameCollision { ref name, .. }) if name == "Overflow"
        ));

        // Kotlin spells `fun_` as `fun`.
        let api = api_with(vec![func("fun_", &[])], None);
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::ReservedKeyword("fun".to_string()))
        );
    }

    #[test]
    fn rejects_binding_type_collisions() {
        let mut api = api_with(vec![], None);
        api.modules = vec![module("key_store", vec![], None), module("keyStore", vec![], None)];
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::SymbolCollision("KeyStore".to_string()))
        );

        let mut api = api_with(vec![], None);
        api.modules = vec![module("data", vec![func("f", &[])], None)];
        assert_eq!(
            validate_api(&api),
            Err(ValidationError::BindingTypeName {
                module: "data".to_string(),
                name: "Data".to_string()
            })
        );
    }

    #[test]
    fn rejects_target_language_keywords() {
        for word in ["class", "default", "new", "function", "val", "object", "guard"] {
            let mut api = api_with(vec![], None);
            api.modules = vec![module(word, vec![func("f", &[])], None)];
            assert_eq!(
                validate_api(&api),
                Err(ValidationError::ReservedKeyword(word.to_string())),
                "{word}"
            );
        }
    }

    #[test]
    fn generated_prefix_is_reserved() {
        let api = api_with(vec![func("f", &[("__wf_err", TypeRef::I32)])], None);
        assert!(matches!(
            validate_api(&api),
            Err(ValidationError::InvalidIdentifier { ref name, .. }) if name == "__wf_err"
        ));

        // Locals the generators emit are prefixed, so these stay legal.
        let api = api_with(
            vec![func("f", &[("err", TypeRef::I32), ("rv", TypeRef::I32), ("env", TypeRef::I32)])],
            None,
        );
        assert_eq!(validate_api(&api), Ok(()));
    }
}
