// src/cli.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::frame::FrameFormat;

/// MCP tool server that executes Python code over HTTP.
///
/// `config.yaml` is optional; CLI flags override its values.
#[derive(Parser, Debug)]
#[command(name = "mcp-exec", version, disable_help_subcommand = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server.
    Serve {
        /// Path to config file
        ///
        /// Defaults to ./config.yaml (optional when left at the default)
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Override the listen address
        ///
        /// Example:
        /// --addr 0.0.0.0:8787
        #[arg(long)]
        addr: Option<String>,
    },

    /// Execute code locally with the configured interpreter.
    ///
    /// Prints the sync JSON result, or event frames with --stream.
    /// Exits non-zero when the code raised.
    Exec {
        /// Path to config file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Code to execute
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,

        /// File containing the code to execute
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print execution events instead of a single result
        #[arg(long)]
        stream: bool,

        /// Frame format used with --stream
        #[arg(long, value_enum, default_value_t = FrameArg::Ndjson)]
        format: FrameArg,
    },
}

pub const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrameArg {
    Ndjson,
    Sse,
}

impl From<FrameArg> for FrameFormat {
    fn from(arg: FrameArg) -> Self {
        match arg {
            FrameArg::Ndjson => FrameFormat::NdJson,
            FrameArg::Sse => FrameFormat::Sse,
        }
    }
}
