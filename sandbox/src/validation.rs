//! WASM module validation — harness ABI checks.
//!
//! Run right after compilation so that a guest that cannot possibly work
//! fails at load time instead of partway through a run:
//!
//! 1. The entry point, if required, is a function export taking no params
//! 2. A guest importing any memory-touching `env` function exports `memory`
//! 3. No WASI imports (the harness provides no WASI)

use wasmtime::{ExternType, Module};

use scout_hostapi::types::{ENV_NAMESPACE, MEMORY_IMPORTS};

use crate::error::HarnessError;

/// Validate a module against the harness ABI.
///
/// `entry_point` is `None` when the caller runs all exports instead of one.
pub fn validate_module(module: &Module, entry_point: Option<&str>) -> Result<(), HarnessError> {
    if let Some(name) = entry_point {
        validate_entry_point(module, name)?;
    }
    validate_imports(module)?;
    Ok(())
}

/// Check that `name` is exported as a function with no params.
pub fn validate_entry_point(module: &Module, name: &str) -> Result<(), HarnessError> {
    let export = module
        .exports()
        .find(|e| e.name() == name)
        .ok_or_else(|| HarnessError::MissingExport(name.to_string()))?;

    let func_ty = match export.ty() {
        ExternType::Func(ft) => ft,
        _ => {
            return Err(HarnessError::Validation(format!(
                "export '{}' must be a function",
                name
            )));
        }
    };

    if func_ty.params().len() != 0 {
        return Err(HarnessError::Validation(format!(
            "export '{}' must take no params, takes {}",
            name,
            func_ty.params().len()
        )));
    }
    Ok(())
}

fn exports_memory(module: &Module) -> bool {
    module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)))
}

fn validate_imports(module: &Module) -> Result<(), HarnessError> {
    let mut needs_memory = None;
    for import in module.imports() {
        let module_name = import.module();

        if module_name.starts_with("wasi") {
            return Err(HarnessError::Validation(format!(
                "WASI import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }

        if module_name == ENV_NAMESPACE && MEMORY_IMPORTS.contains(&import.name()) {
            needs_memory.get_or_insert_with(|| import.name().to_string());
        }
    }

    if let Some(import) = needs_memory {
        if !exports_memory(module) {
            return Err(HarnessError::Validation(format!(
                "module imports '{}' but does not export 'memory'",
                import
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime::Engine;

    fn compile(wat: &str) -> Module {
        Module::new(&Engine::default(), wat).unwrap()
    }

    #[test]
    fn test_validate_minimal_valid_module() {
        let module = compile(r#"(module (func (export "main")))"#);
        validate_module(&module, Some("main")).unwrap();
    }

    #[test]
    fn test_reject_missing_entry_point() {
        let module = compile(r#"(module (func (export "start_here")))"#);
        let err = validate_module(&module, Some("main")).unwrap_err();
        assert!(matches!(err, HarnessError::MissingExport(ref n) if n == "main"));
    }

    #[test]
    fn test_no_entry_point_required() {
        let module = compile(r#"(module)"#);
        validate_module(&module, None).unwrap();
    }

    #[test]
    fn test_reject_entry_point_with_params() {
        let module = compile(r#"(module (func (export "main") (param i32)))"#);
        let err = validate_module(&module, Some("main")).unwrap_err();
        assert!(matches!(err, HarnessError::Validation(_)));
    }

    #[test]
    fn test_reject_non_function_entry_point() {
        let module = compile(r#"(module (memory (export "main") 1))"#);
        let err = validate_module(&module, Some("main")).unwrap_err();
        assert!(matches!(err, HarnessError::Validation(_)));
    }

    #[test]
    fn test_reject_memory_import_without_memory_export() {
        let module = compile(
            r#"
            (module
                (import "env" "eth2_blockDataCopy" (func (param i32 i32 i32)))
                (func (export "main"))
            )
        "#,
        );
        let err = validate_module(&module, Some("main")).unwrap_err();
        assert!(err.to_string().contains("eth2_blockDataCopy"));
    }

    #[test]
    fn test_size_only_guest_needs_no_memory() {
        let module = compile(
            r#"
            (module
                (import "env" "eth2_blockDataSize" (func (result i32)))
                (import "env" "bignum_f1m_mul" (func (param i32 i32 i32)))
                (func (export "main"))
            )
        "#,
        );
        validate_module(&module, Some("main")).unwrap();
    }

    #[test]
    fn test_reject_wasi_import() {
        let module = compile(
            r#"
            (module
                (import "wasi_snapshot_preview1" "fd_write"
                    (func (param i32 i32 i32 i32) (result i32)))
                (memory (export "memory") 1)
                (func (export "main"))
            )
        "#,
        );
        let err = validate_module(&module, Some("main")).unwrap_err();
        assert!(matches!(err, HarnessError::Validation(_)));
    }
}
