mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{cmd_check, cmd_eval};

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Serialization format for an evaluated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ValueFormat {
    Json,
    Toml,
}

/// Sheaf configuration language toolchain.
#[derive(Parser)]
#[command(
    name = "sheaf",
    version,
    about = "Sheaf configuration language toolchain"
)]
struct Cli {
    /// Diagnostic format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log pipeline stages to stderr (same as SHEAF_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a document and print the resulting value
    Eval {
        /// Path to the source file, or '-' for stdin
        file: PathBuf,
        /// Serialization of the printed value
        #[arg(long, default_value = "json", value_enum)]
        format: ValueFormat,
        /// Print only the value at this dotted key path (e.g. icons.volume_high)
        #[arg(long)]
        select: Option<String>,
    },

    /// Check that a document evaluates without errors
    Check {
        /// Path to the source file, or '-' for stdin
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Eval {
            file,
            format,
            select,
        } => {
            cmd_eval(&file, format, select.as_deref(), cli.output, cli.quiet);
        }
        Commands::Check { file } => {
            cmd_check(&file, cli.output, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
