/*!
# Neuromask Binary Log Parser

Converts binary sensor logs recorded by Neuromask devices into JSON lines,
one object per record.

## Features

- Marker-based record synchronization tolerant of stream noise
- Size validation and best-effort field extraction per record
- Configurable decimal precision for sensor values
- Directory batch mode or single-file mode
- Synthetic log generation for testing without a device

## Usage

### Convert using the configuration file (default)
```bash
neuromask-binparser --config binparser.toml
```

### Convert with explicit locations
```bash
neuromask-binparser parse --input ./input --output ./output --precision 6
```

### Generate a synthetic log
```bash
neuromask-binparser synth --output ./input/synthetic.bin --records 500
```
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neuromask_shared::MissingFields;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::{info, warn, Level};

mod batch;
mod config;
mod synth;

use batch::BatchProcessor;
use config::{AppConfig, ParserConfig};

#[derive(Parser)]
#[command(name = "neuromask-binparser")]
#[command(about = "Convert Neuromask binary sensor logs to JSON lines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "binparser.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert .bin logs to JSON lines
    Parse {
        /// Input .bin file or directory
        #[arg(short, long)]
        input: Option<String>,

        /// Output directory for .json files
        #[arg(short, long)]
        output: Option<String>,

        /// Decimal places kept on sensor values
        #[arg(short, long)]
        precision: Option<u32>,

        /// Absent sensor fields: omit or null
        #[arg(long)]
        missing_fields: Option<MissingFields>,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "binparser.toml")]
        output: PathBuf,
    },

    /// Write a synthetic .bin log
    Synth {
        /// Output path for the log
        #[arg(short, long, default_value = "./input/synthetic.bin")]
        output: PathBuf,

        /// Number of records to generate
        #[arg(short = 'n', long, default_value = "100")]
        records: u32,

        /// Timestamp of the first record
        #[arg(long, default_value = "0")]
        start_timestamp: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_found = cli.config.exists();
    let config = if config_found {
        AppConfig::load_from_file(&cli.config)?
    } else {
        AppConfig::new()
    };

    init_logging(&config, cli.verbose);

    if !config_found && !matches!(cli.command, Some(Commands::Config { .. })) {
        warn!("⚠️ Config file {} not found, using defaults", cli.config.display());
    }

    match cli.command {
        Some(Commands::Parse { input, output, precision, missing_fields }) => {
            let mut parser = config.parser;
            if let Some(input) = input {
                parser.input_directory = input;
            }
            if let Some(output) = output {
                parser.output_directory = output;
            }
            if let Some(precision) = precision {
                parser.float_precision = precision;
            }
            if let Some(missing_fields) = missing_fields {
                parser.missing_fields = missing_fields;
            }
            run_parse(parser)
        }

        Some(Commands::Config { output }) => generate_config_file(&output),

        Some(Commands::Synth { output, records, start_timestamp }) => {
            synth::write_synthetic_log(&output, records, start_timestamp)?;
            Ok(())
        }

        None => run_parse(config.parser),
    }
}

/// Initialize logging to stderr at the configured level
fn init_logging(config: &AppConfig, verbose: bool) {
    let (level, unknown) = if verbose {
        (Level::DEBUG, false)
    } else {
        match config.logging.level.parse::<Level>() {
            Ok(level) => (level, false),
            Err(_) => (Level::INFO, true),
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if unknown {
        warn!("Unknown log level '{}', using info", config.logging.level);
    }
}

/// Convert every input file described by `parser`
fn run_parse(parser: ParserConfig) -> Result<()> {
    info!("🚀 Parsing {} -> {}", parser.input_directory, parser.output_directory);
    info!("🔧 Float precision: {}, missing fields: {}", parser.float_precision, parser.missing_fields);

    let processor = BatchProcessor::new(&parser);

    // Set up Ctrl+C handler
    let running = processor.get_running_flag();
    ctrlc::set_handler(move || {
        eprintln!("\n🛑 Received Ctrl+C, stopping after the current read...");
        running.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    let summary = processor.run()?;
    if summary.files_failed > 0 {
        warn!("{} file(s) could not be converted", summary.files_failed);
    }

    Ok(())
}

/// Generate a default configuration file
fn generate_config_file(output_path: &Path) -> Result<()> {
    let config = AppConfig::new();
    config.save_to_file(output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   neuromask-binparser --config {}", output_path.display());

    Ok(())
}
