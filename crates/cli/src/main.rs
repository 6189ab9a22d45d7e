mod find;
mod inspect;

use std::path::{Path, PathBuf};
use std::process;

use assay_core::ResultNode;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Assessment result document toolkit.
#[derive(Parser)]
#[command(name = "assay", version, about = "Assessment result document toolkit")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log decode details to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a result document and print its outline
    Inspect {
        /// Path to the result JSON document
        file: PathBuf,
    },

    /// Look up an answer (or, with --result, a step) by identifier
    Find {
        /// Path to the result JSON document
        file: PathBuf,
        /// Identifier of the question or step
        identifier: String,
        /// Search the root step history for any result instead of an answer
        #[arg(long)]
        result: bool,
    },

    /// Decode a result document and re-encode it canonically
    Normalize {
        /// Path to the result JSON document
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { file } => {
            inspect::cmd_inspect(&file, cli.output, cli.quiet);
        }
        Commands::Find {
            file,
            identifier,
            result,
        } => {
            find::cmd_find(&file, &identifier, result, cli.output, cli.quiet);
        }
        Commands::Normalize { file } => {
            cmd_normalize(&file, cli.output, cli.quiet);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_normalize(file: &Path, output: OutputFormat, quiet: bool) {
    let root = load_document(file, output, quiet);
    match assay_core::to_string_pretty(&root) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            report_error(&format!("error encoding '{}': {}", file.display(), e), output, quiet);
            process::exit(1);
        }
    }
}

/// Read and decode a result document, exiting on failure.
pub(crate) fn load_document(path: &Path, output: OutputFormat, quiet: bool) -> ResultNode {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            report_error(
                &format!("error reading file '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };
    match assay_core::from_str(&text) {
        Ok(root) => {
            debug!(
                file = %path.display(),
                root = %root.identifier(),
                kind = root.type_name(),
                "decoded result document"
            );
            root
        }
        Err(e) => {
            report_error(
                &format!("error decoding '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
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
