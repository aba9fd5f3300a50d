use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tarshell")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive shell over a tar-backed virtual filesystem")]
#[command(
    long_about = "tarshell unpacks the archive named in config.yaml into the current directory \
                  and opens a small interactive shell (ls, cd, chown, date, uptime, exit) \
                  that records every command in a JSON action log."
)]
#[command(after_help = "EXAMPLES:\n  \
    tarshell\n  \
    tarshell --config lab/config.yaml --verbose\n  \
    tarshell --generate-config")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, help = "Path to YAML configuration file")]
    pub config: PathBuf,

    /// Output format for status messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress startup messages)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file and exit")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_file(&self.config)
    }

    pub fn output_mode(&self) -> OutputMode {
        match self.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        match self.verbosity_level() {
            0 => "tarshell=warn",
            1 => "tarshell=info",
            _ => "tarshell=debug",
        }
    }
}
