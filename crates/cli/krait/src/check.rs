//! Check command implementation

use crate::input;
use anyhow::{anyhow, Result};
use colored::Colorize;
use kr_driver::{compile, Platform};
use std::path::PathBuf;

pub fn check(inputs: &[PathBuf], platform_name: &str) -> Result<()> {
    let platform = Platform::by_name(platform_name)
        .ok_or_else(|| anyhow!("unknown platform `{platform_name}` (expected `host` or `avr`)"))?;

    let units = input::load_units(inputs)?;
    let mut failures = 0usize;
    for unit in &units {
        match compile(&unit.module, &unit.name, &platform) {
            Ok(_) => println!("  {} {}", "✓".green(), unit.name),
            Err(err) => {
                failures += 1;
                println!("  {} {}: {}", "✗".red(), unit.name, input::describe(&err));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} unit(s) failed to compile");
    }
    println!("{} {} unit(s)", "Checked".green().bold(), units.len());
    Ok(())
}
