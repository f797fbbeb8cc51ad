//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Action Dispatch - multiplex many JSON actions through one entry point
#[derive(Parser, Debug)]
#[command(
    name = "action-dispatch",
    author,
    version,
    about = "JSON action dispatcher",
    long_about = "Dispatches JSON action requests to a built-in set of handlers.\n\n\
                  Reads one request per line, enforces the action allow-list from \n\
                  the configuration file, and writes one response envelope per line."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ACTION_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "ACTION_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch JSON-lines requests read from a file or stdin
    Dispatch(DispatchArgs),

    /// Validate an actions file without dispatching
    Validate(ValidateArgs),

    /// Show which actions are configured and callable
    Info(InfoArgs),
}

/// Arguments for the `dispatch` command
#[derive(Parser, Debug, Clone)]
pub struct DispatchArgs {
    /// Path to actions file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "actions.toml",
        env = "ACTION_DISPATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Requests file, one JSON body per line (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Header passed to every request as metadata (NAME=VALUE, repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Dispatch all requests concurrently (responses keep input order)
    #[arg(long)]
    pub concurrent: bool,

    /// Print a dispatch summary to stderr when done
    #[arg(long)]
    pub stats: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "ACTION_DISPATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to actions file to validate
    #[arg(short, long, default_value = "actions.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to actions file
    #[arg(short, long, default_value = "actions.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
