//! Build command implementation

use crate::input;
use anyhow::{anyhow, Result};
use colored::Colorize;
use kr_ast::Module;
use kr_driver::{compile_program, Platform};
use std::fs;
use std::path::{Path, PathBuf};

pub fn build(inputs: &[PathBuf], platform_name: &str, output: Option<&Path>) -> Result<()> {
    let platform = Platform::by_name(platform_name)
        .ok_or_else(|| anyhow!("unknown platform `{platform_name}` (expected `host` or `avr`)"))?;

    let units = input::load_units(inputs)?;
    println!(
        "{} {} unit(s) for {}",
        "Compiling".green().bold(),
        units.len(),
        platform.name()
    );

    let refs: Vec<(&str, &Module)> = units
        .iter()
        .map(|unit| (unit.name.as_str(), &unit.module))
        .collect();
    let source = compile_program(&refs, &platform)
        .map_err(|err| anyhow!("{}", input::describe(&err)))?;

    match output {
        Some(path) => {
            fs::write(path, &source)?;
            println!("  {} Wrote {}", "Finished".green().bold(), path.display());
        }
        None => print!("{source}"),
    }
    Ok(())
}
