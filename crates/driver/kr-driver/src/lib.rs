//! Compilation driver
//!
//! Composes the pipeline for whole programs: platform preamble, then each
//! unit's declarations, init function and named functions, then a program
//! entry point invoking the first unit's init symbol. Compilation is
//! single-pass and synchronous; a failed unit aborts the program build
//! with no partial output. The driver itself never logs.

pub mod platform;

pub use kr_resolve::CompileError;
pub use platform::Platform;

use kr_ast::Module;
use kr_cgen::ModuleCompiler;

/// Compile one module as a complete program
///
/// The unit doubles as the program entry, so its self-name is `__main__`.
pub fn compile(
    module: &Module,
    module_name: &str,
    platform: &Platform,
) -> Result<String, CompileError> {
    compile_program(&[(module_name, module)], platform)
}

/// Compile an ordered list of units into one program
///
/// The first unit is the entry: its self-name is `__main__` and the emitted
/// `main` invokes its init symbol. Later units keep their own names. Units
/// are independent — cross-unit references are out of scope — so they all
/// share the platform's read-only registry.
pub fn compile_program(
    units: &[(&str, &Module)],
    platform: &Platform,
) -> Result<String, CompileError> {
    if units.is_empty() {
        return Err(CompileError::UnsupportedConstruct {
            detail: "a program with no compilation units".to_string(),
            pos: None,
        });
    }

    let mut sections: Vec<String> = vec![platform.preamble().to_string()];
    let mut entry_symbol = String::new();
    for (index, (name, module)) in units.iter().enumerate() {
        let self_name = if index == 0 { "__main__" } else { name };
        let compiler = ModuleCompiler::new(platform.registry(), name, self_name);
        let output = compiler.compile(module)?;
        if index == 0 {
            entry_symbol = output.init_symbol.clone();
        }
        sections.push(output.declarations);
        sections.push(output.init);
        if !output.functions.is_empty() {
            sections.push(output.functions);
        }
    }
    sections.push(format!("int main(void) {{\nreturn {entry_symbol}();\n}}\n"));
    Ok(sections.join("\n"))
}
