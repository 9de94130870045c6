//! describe-openapi CLI
//!
//! Command-line interface for converting and linting validation descriptors.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use describe_openapi::{
    convert_with, lint, load_descriptor, ConvertOptions, DefaultPresence, FileStatus, Severity,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "describe-openapi")]
#[command(about = "Convert validation schema descriptors into OpenAPI schema objects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a descriptor file into an OpenAPI schema object
    Convert {
        /// Descriptor file (JSON output of describe())
        descriptor: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Emit falsy defaults (0, "", false, null) instead of dropping them
        #[arg(long)]
        explicit_defaults: bool,

        /// Give plain numbers format "float"
        #[arg(long)]
        float_fallback: bool,
    },

    /// Lint descriptor files for unsupported kinds and rules that would be dropped
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            descriptor,
            output,
            pretty,
            explicit_defaults,
            float_fallback,
        } => {
            let presence = if explicit_defaults {
                DefaultPresence::Explicit
            } else {
                DefaultPresence::Truthy
            };
            let options = ConvertOptions::new()
                .default_presence(presence)
                .float_fallback(float_fallback);
            run_convert(&descriptor, output, pretty, &options)
        }

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_convert(
    descriptor_path: &Path,
    output: Option<PathBuf>,
    pretty: bool,
    options: &ConvertOptions,
) -> Result<(), u8> {
    let schema = load_descriptor(descriptor_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    tracing::debug!(path = %descriptor_path.display(), kind = %schema.kind(), "loaded descriptor");
    let converted = convert_with(&schema, options);

    let json_output = if pretty {
        serde_json::to_string_pretty(&converted)
    } else {
        serde_json::to_string(&converted)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
