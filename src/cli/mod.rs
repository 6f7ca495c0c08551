//! CLI command definitions and handlers

mod check;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// ilcheck - heuristic defect checks over .NET assembly metadata
#[derive(Parser, Debug)]
#[command(name = "ilcheck")]
#[command(
    version,
    about = "Heuristic defect checks over .NET assembly metadata",
    long_about = "ilcheck reads a JSON metadata dump of a compiled .NET assembly \
(types, fields, methods, CIL instruction streams and optional debug line mappings) \
and runs structural rules over it: method size, property candidates, static \
candidates and finalizer presence.",
    after_help = "\
Examples:
  ilcheck check Lib.json                       Check an assembly dump
  ilcheck check Lib.json --format json         JSON output for scripting
  ilcheck check Lib.json --approximate         Measure size by instruction count
  ilcheck check Lib.json --fail-on high        Exit code 1 if high+ defects (CI mode)
  ilcheck rules                                List built-in rules"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: auto)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run all enabled rules over an assembly metadata dump
    #[command(after_help = "\
Configuration is read from --config, or else from ilcheck.toml or
.ilcheckrc.json next to the metadata dump.")]
    Check {
        /// Path to the JSON metadata dump
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// Project config file (TOML, or JSON by extension)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: text, json (default: text)
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Measure method size by instruction count even when line mappings exist
        #[arg(long)]
        approximate: bool,

        /// Maximum defects to keep
        #[arg(long)]
        max_defects: Option<usize>,

        /// Skip specific rules
        #[arg(long)]
        skip_rule: Vec<String>,

        /// Exit with code 1 if defects at this severity or higher exist
        #[arg(long, value_parser = ["critical", "high", "medium", "low", "audit"])]
        fail_on: Option<String>,
    },

    /// List built-in rules
    Rules,
}

/// Run the CLI command, returning the process exit code
pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            model,
            config,
            format,
            output,
            approximate,
            max_defects,
            skip_rule,
            fail_on,
        } => check::run(check::CheckArgs {
            model,
            config,
            format,
            output,
            approximate,
            max_defects,
            skip_rules: skip_rule,
            fail_on,
            workers: cli.workers,
        }),

        Commands::Rules => {
            print!("{}", check::list_rules());
            Ok(ExitCode::SUCCESS)
        }
    }
}
