// src/main.rs

//! mcp-exec
//!
//! Entry point for the mcp-exec binary.
//!
//! This binary serves a small MCP-style tool server over HTTP whose main
//! tool executes Python code and reports captured output, either as one
//! result or as a stream of lifecycle events. It delegates all real work to
//! the `runner` module.
//!
//! Submitted code runs with the privileges of this process. Isolate the
//! server at the process/VM level before exposing it.

mod cli;
mod config;
mod cors;
mod engine;
mod error;
mod execution_id;
mod logging;
mod mcp;
mod runner;
mod runtime;
mod shim;
mod sinks;

use anyhow::Result;
use clap::Parser;

/// Program entry point.
///
/// Uses Tokio because the server streams responses and each execution
/// spawns and waits on an interpreter process.
#[tokio::main]
async fn main() -> Result<()> {
    // Pick up RUST_LOG and friends from a local .env, if present
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();

    runner::run(cli).await
}
