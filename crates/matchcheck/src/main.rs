//! matchcheck - Check that tests and implementation agree
//!
//! Reads a test file and an implementation file, cross-references calls and
//! definitions, and exits non-zero when tests call something that doesn't
//! exist or call it with the wrong number of arguments.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use eyre::{Result, WrapErr};
use figue as args;
use matchcheck::config::load_config;
use matchcheck::output::{OutputFormat, render_validation};
use matchcheck::validate_files;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: matchcheck <test_file> <impl_file> [--config PATH] [--format text|json] [--verbose] [--no-color]";

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Test source file
    #[facet(args::positional, default)]
    test_file: Option<PathBuf>,

    /// Implementation source file
    #[facet(args::positional, default)]
    impl_file: Option<PathBuf>,

    /// Path to config file (default: .config/matchcheck/config.styx)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Output format: text, json
    #[facet(args::named, args::short = 'f', default)]
    format: Option<String>,

    /// Log extraction and rule details to stderr
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,

    /// Never color the text report
    #[facet(args::named, default)]
    no_color: bool,
}

fn main() -> Result<()> {
    let args: Args = figue::from_std_args()
        .into_result()
        .map(|output| output.get())
        .wrap_err("Failed to parse command line arguments")?;

    init_tracing(args.verbose);

    let (Some(test_file), Some(impl_file)) = (args.test_file, args.impl_file) else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = load_config(args.config.as_deref())?;
    let conventions = config.conventions();

    let format = args
        .format
        .as_deref()
        .and_then(OutputFormat::parse)
        .unwrap_or_default();
    let color = !args.no_color && std::io::stdout().is_terminal();

    let validation = validate_files(&test_file, &impl_file, &conventions);
    let rendered = render_validation(&validation, format, color)?;
    let mut stdout = std::io::stdout();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .wrap_err("Failed to write report")?;

    std::process::exit(validation.exit_code());
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
