//! tjson CLI - Command-line driver for the tjson engines
//!
//! This binary provides:
//! - examples: run every sample model through the standard and the extended
//!   engine and print the results side by side
//! - check: decode an unsigned literal through the extended engine and print
//!   it re-encoded

mod config;
mod report;
mod samples;

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tjson_io::{Engine, EngineOptions, Reflect, UnsignedWidth};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tjson")]
#[command(about = "Transparent wrapper and unsigned integer JSON adapters")]
#[command(version)]
struct Cli {
    /// Log resolution decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Engine options file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the standard and extended engines on the sample models
    ///
    /// Examples:
    ///   tjson examples
    ///   tjson examples --format json
    Examples {
        /// Output format (markdown, json)
        #[arg(long, value_enum, default_value_t = ExamplesFormat::Markdown)]
        format: ExamplesFormat,
    },
    /// Decode an unsigned literal and print it re-encoded
    ///
    /// Examples:
    ///   tjson check --width u32 2147516414
    ///   tjson check --width u8 -- -1
    Check {
        /// Unsigned width (u8, u16, u32, u64)
        #[arg(long)]
        width: UnsignedWidth,
        /// JSON literal to decode
        #[arg(allow_hyphen_values = true)]
        literal: String,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ExamplesFormat {
    Markdown,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(io::stderr)
        .init();
}

/// `-v` forces debug; otherwise `RUST_LOG`, falling back to warnings only
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let options = config::load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Examples { format } => handle_examples(options, format),
        Commands::Check { width, literal } => handle_check(options, width, &literal),
    }
}

fn handle_examples(options: EngineOptions, format: ExamplesFormat) -> Result<(), Box<dyn Error>> {
    let standard = Engine::builder().options(options.clone()).build()?;
    let extended = Engine::builder()
        .with_extensions()
        .options(options)
        .build()?;

    let comparisons: Vec<_> = samples::catalog()
        .iter()
        .map(|sample| sample.compare(&standard, &extended))
        .collect();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    match format {
        ExamplesFormat::Markdown => report::write_markdown(&mut out, &comparisons)?,
        ExamplesFormat::Json => report::write_json_lines(&mut out, &comparisons)?,
    }
    out.flush()?;
    Ok(())
}

fn handle_check(
    options: EngineOptions,
    width: UnsignedWidth,
    literal: &str,
) -> Result<(), Box<dyn Error>> {
    let engine = Engine::builder()
        .with_extensions()
        .options(options)
        .build()?;

    let encoded = match width {
        UnsignedWidth::U8 => reencode::<u8>(&engine, literal)?,
        UnsignedWidth::U16 => reencode::<u16>(&engine, literal)?,
        UnsignedWidth::U32 => reencode::<u32>(&engine, literal)?,
        UnsignedWidth::U64 => reencode::<u64>(&engine, literal)?,
    };
    println!("{}", encoded);
    Ok(())
}

fn reencode<T: Reflect>(engine: &Engine, literal: &str) -> tjson_io::Result<String> {
    let value: T = engine.from_str(literal)?;
    engine.to_string(&value)
}
