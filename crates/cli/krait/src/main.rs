//! Krait compiler CLI
//!
//! Thin shell around the driver: argument parsing, reading pre-parsed tree
//! files, platform selection, and writing the composed C source. All
//! compilation semantics live in the library crates.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod build;
mod check;
mod input;

#[derive(Parser)]
#[command(name = "krait")]
#[command(about = "Typed scripting subset to C compiler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile tree files into one C source file
    Build {
        /// Pre-parsed tree files (`<module>.ast.json`); the first is the
        /// program entry
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target platform (host or avr)
        #[arg(long, default_value = "host")]
        platform: String,

        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile without writing output, reporting errors only
    Check {
        /// Pre-parsed tree files (`<module>.ast.json`)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target platform (host or avr)
        #[arg(long, default_value = "host")]
        platform: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            inputs,
            platform,
            output,
        } => {
            build::build(&inputs, &platform, output.as_deref())?;
        }
        Commands::Check { inputs, platform } => {
            check::check(&inputs, &platform)?;
        }
    }

    Ok(())
}
