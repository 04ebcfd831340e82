//! linqguard command-line interface
//!
//! Finds calls to `CollectionUtilities.IsNullOrEmpty` in C# sources and
//! rewrites them to plain null and `Any()` checks.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing::error;

mod commands;
mod output;

/// Lint and autofix for CollectionUtilities.IsNullOrEmpty calls
#[derive(Parser)]
#[command(
    name = "linqguard",
    version,
    about = "Flags CollectionUtilities.IsNullOrEmpty calls in C# code and rewrites them",
    long_about = "linqguard finds calls to Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty \
                  and rewrites each one to `x is null || x.Any() is false`, adding `using System.Linq;` \
                  where needed."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report IsNullOrEmpty calls
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// Rewrite IsNullOrEmpty calls in place
    Fix {
        /// Files or directories to fix
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Show a diff instead of writing files
        #[arg(long)]
        dry_run: bool,

        /// Also rewrite receivers that would be evaluated twice
        #[arg(long)]
        r#unsafe: bool,
    },

    /// Describe the built-in rule
    Rules {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    // An explicit RUST_LOG wins over -v
    if std::env::var_os("RUST_LOG").is_none() {
        let log_level = match cli.verbose {
            0 => "linqguard=warn",
            1 => "linqguard=info",
            2 => "linqguard=debug",
            _ => "linqguard=trace",
        };
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    linqguard_core::init_tracing();

    match run_command(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Check { paths, format } => commands::check_command(&paths, format, config),
        Commands::Fix {
            paths,
            dry_run,
            r#unsafe,
        } => commands::fix_command(&paths, dry_run, r#unsafe, config),
        Commands::Rules { format } => commands::rules_command(format),
    }
}
