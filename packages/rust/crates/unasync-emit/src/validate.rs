//! Rename-table completeness checks.
//!
//! Compares the public symbols actually defined in the sources and in the
//! rewritten mirror with the rename tables, so a new async class or factory
//! cannot slip into the mirror under its async name.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use unasync_ast::{Symbol, SymbolKind};
use unasync_rewrite::RenameTable;

use crate::config::EmitConfig;
use crate::error::EmitError;

/// Prefix marking a class as part of the async surface.
const ASYNC_TYPE_PREFIX: &str = "Async";

/// Top-level symbols of one input before and after rewriting.
#[derive(Debug, Clone)]
pub struct ModuleSymbols {
    /// Path relative to the source root.
    pub relative: PathBuf,
    /// Symbols of the async source.
    pub source: Vec<Symbol>,
    /// Symbols of the rewritten output.
    pub output: Vec<Symbol>,
}

/// Check the tables against the scanned modules.
///
/// # Errors
/// `EmitError::RenameDrift` listing every missing entry.
pub fn check_rename_drift(
    modules: &[ModuleSymbols],
    config: &EmitConfig,
    table: &RenameTable,
) -> Result<(), EmitError> {
    let registry = config.module_file(&config.registry_module);
    let client = config.module_file(&config.client_module);
    let factory_keys: HashSet<&str> = table
        .factory_renames()
        .iter()
        .map(|(from, _)| from.as_str())
        .collect();

    let mut missing = Vec::new();
    for module in modules {
        for symbol in module.source.iter().filter(|s| s.is_public()) {
            let unmapped_type = symbol.kind == SymbolKind::Class
                && symbol.name.starts_with(ASYNC_TYPE_PREFIX)
                && !table.type_renames().contains_key(&symbol.name);
            if unmapped_type {
                missing.push(format!(
                    "type `{}` ({}:{}) has no type rename",
                    symbol.name,
                    display(&module.relative),
                    symbol.line
                ));
            }

            let unmapped_factory = module.relative == registry
                && symbol.kind == SymbolKind::Function
                && !factory_keys.contains(symbol.name.as_str());
            if unmapped_factory {
                missing.push(format!(
                    "factory `{}` ({}:{}) has no factory rename",
                    symbol.name,
                    display(&module.relative),
                    symbol.line
                ));
            }
        }
    }

    let exported: HashSet<&str> = modules
        .iter()
        .filter(|m| m.relative == client || m.relative == registry)
        .flat_map(|m| m.output.iter().map(|s| s.name.as_str()))
        .collect();
    for name in table.manifest_exports() {
        if !exported.contains(name) {
            missing.push(format!(
                "manifest export `{name}` is not defined in {} or {}",
                display(&client),
                display(&registry)
            ));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = missing.len(), "rename drift detected");
        Err(EmitError::RenameDrift { missing })
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
