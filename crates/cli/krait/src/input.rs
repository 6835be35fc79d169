//! Tree-file loading
//!
//! The external front end writes one pre-parsed tree per module as JSON.
//! The module name comes from the file name, with the `.ast.json` suffix
//! stripped and identifier-hostile characters replaced.

use anyhow::{Context, Result};
use kr_ast::Module;
use kr_driver::CompileError;
use std::fs;
use std::path::{Path, PathBuf};

/// One loaded compilation unit
pub struct Unit {
    pub name: String,
    pub module: Module,
}

/// Load every input file, preserving order
pub fn load_units(paths: &[PathBuf]) -> Result<Vec<Unit>> {
    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let module: Module = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid tree file", path.display()))?;
        units.push(Unit {
            name: module_name(path),
            module,
        });
    }
    Ok(units)
}

/// Derive a module name from an input path
pub fn module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");
    let stem = stem.strip_suffix(".ast").unwrap_or(stem);
    stem.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// Format a compile error for terminal output
pub fn describe(err: &CompileError) -> String {
    match err.pos() {
        Some(pos) => format!("{err} (at {pos})"),
        None => err.to_string(),
    }
}
