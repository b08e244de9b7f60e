//! Fallback resolution for imports the static registrations do not cover.
//!
//! Before instantiation the harness walks the module's function imports. Any
//! import the linker cannot already satisfy is offered to each registered
//! [`ImportResolver`] in turn; the first callable returned is defined on the
//! linker under that import's name and signature.

use std::sync::Arc;

use wasmtime::{Caller, FuncType, Linker, Module, Store, Val, ValType};

use scout_hostapi::types::HOST_NAMESPACE;

use crate::error::HarnessError;
use crate::host_impl::HostContext;

/// Host callable created on demand: `(qualified_name, args, results)`.
pub type DynamicHostFn = Arc<dyn Fn(&str, &[Val], &mut [Val]) -> anyhow::Result<()> + Send + Sync>;

/// Supplies host functions for imports nothing else resolved.
pub trait ImportResolver: Send + Sync {
    fn resolve(&self, namespace: &str, name: &str, ty: &FuncType) -> Option<DynamicHostFn>;
}

/// Binds `host.print` with whatever signature the guest declares. Arguments
/// are echoed to stdout; results are zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPrintResolver;

impl ImportResolver for HostPrintResolver {
    fn resolve(&self, namespace: &str, name: &str, ty: &FuncType) -> Option<DynamicHostFn> {
        if namespace != HOST_NAMESPACE || name != "print" {
            return None;
        }
        // Only numeric results can be zero-filled.
        let zeros = ty
            .results()
            .map(|t| zero_value(&t))
            .collect::<Option<Vec<Val>>>()?;
        let print: DynamicHostFn = Arc::new(
            move |qualified: &str, args: &[Val], results: &mut [Val]| -> anyhow::Result<()> {
                results.clone_from_slice(&zeros);
                println!(
                    "called host {}({}) => ({})",
                    qualified,
                    format_vals(args),
                    format_vals(results)
                );
                Ok(())
            },
        );
        Some(print)
    }
}

fn zero_value(ty: &ValType) -> Option<Val> {
    match ty {
        ValType::I32 => Some(Val::I32(0)),
        ValType::I64 => Some(Val::I64(0)),
        ValType::F32 => Some(Val::F32(0)),
        ValType::F64 => Some(Val::F64(0)),
        _ => None,
    }
}

/// Render values as `i32:1, f64:0.5`.
pub fn format_vals(vals: &[Val]) -> String {
    vals.iter()
        .map(|v| match v {
            Val::I32(x) => format!("i32:{}", x),
            Val::I64(x) => format!("i64:{}", x),
            Val::F32(bits) => format!("f32:{}", f32::from_bits(*bits)),
            Val::F64(bits) => format!("f64:{}", f64::from_bits(*bits)),
            other => format!("{:?}", other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Define every unresolved function import of `module` that a resolver can
/// supply. Returns the qualified names bound this way.
pub fn resolve_imports(
    linker: &mut Linker<HostContext>,
    store: &mut Store<HostContext>,
    module: &Module,
    resolvers: &[Box<dyn ImportResolver>],
) -> Result<Vec<String>, HarnessError> {
    let mut bound = Vec::new();
    for import in module.imports() {
        let ty = match import.ty() {
            wasmtime::ExternType::Func(ty) => ty,
            _ => continue,
        };
        if linker.get(&mut *store, import.module(), import.name()).is_some() {
            continue;
        }
        let Some(callable) = resolvers
            .iter()
            .find_map(|r| r.resolve(import.module(), import.name(), &ty))
        else {
            continue;
        };

        let qualified = format!("{}.{}", import.module(), import.name());
        let label = qualified.clone();
        linker.func_new(
            import.module(),
            import.name(),
            ty,
            move |_caller: Caller<'_, HostContext>, args: &[Val], results: &mut [Val]| {
                callable(&label, args, results)
            },
        )?;
        bound.push(qualified);
    }
    Ok(bound)
}
