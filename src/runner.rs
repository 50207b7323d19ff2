// src/runner.rs

use crate::cli::{Cli, Command, DEFAULT_CONFIG};
use crate::config::Config;
use crate::engine::{
    emit::emit_events, frame::FrameFormat, ExecutionResult, Executor, PythonExecutor,
};
use crate::execution_id::ExecutionId;
use crate::sinks::WriterSink;
use crate::{logging, runtime};

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { config, addr } => {
            let mut cfg = load_config(&config)?;

            // CLI overrides
            if let Some(addr) = addr {
                cfg.server.addr = addr;
            }

            logging::init(&cfg.logging)?;
            runtime::serve(&cfg).await
        }

        Command::Exec {
            config,
            code,
            file,
            stream,
            format,
        } => {
            let cfg = load_config(&config)?;
            logging::init(&cfg.logging)?;

            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read code file {:?}", path))?,
                (None, None) => bail!("Either --code or --file is required"),
            };

            if code.is_empty() {
                bail!("No code provided");
            }

            let executor = PythonExecutor::new(&cfg.executor);
            let ok = if stream {
                exec_streaming(&executor, &code, format.into(), std::io::stdout()).await?
            } else {
                exec_once(&executor, &code, std::io::stdout()).await?
            };

            if !ok {
                bail!("Execution failed");
            }
            Ok(())
        }
    }
}

/// The default config path is optional; any other path must exist.
fn load_config(path: &Path) -> Result<Config> {
    if path == PathBuf::from(DEFAULT_CONFIG) {
        Config::load_or_default(path)
    } else {
        Config::load(path)
    }
}

/* ---------------- local execution ---------------- */

async fn exec_once<W: Write>(executor: &dyn Executor, code: &str, mut out: W) -> Result<bool> {
    let result = ExecutionResult::from(executor.execute(code).await?);
    let json = serde_json::to_string_pretty(&result).context("Failed to format result as JSON")?;
    writeln!(out, "{}", json).context("Failed to write result")?;
    Ok(result.success)
}

async fn exec_streaming<W: Write + Send>(
    executor: &dyn Executor,
    code: &str,
    format: FrameFormat,
    out: W,
) -> Result<bool> {
    let mut sink = WriterSink::new(out, format);
    let done = emit_events(executor, code, &ExecutionId::new(), &mut sink).await;

    done.context("output closed before execution completed")
}
