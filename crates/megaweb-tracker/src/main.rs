/*
[INPUT]:  CLI arguments, YAML configuration file, MEGAWEB_* environment, OS shutdown signals
[OUTPUT]: Submitted and tracked Mega-Web tasks, rendered status table
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or logging setup
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let _log_guard = init_tracing(&args.log_level, args.log_file.as_deref())?;

    if let Command::Init { output } = &args.command {
        cli::init::run_init(output.clone())?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli::commands::load_config(args.config_path.as_deref())?;
    info!(
        base_url = %config.server.base_url,
        interval_ms = config.polling.interval_ms,
        "configuration loaded"
    );

    cli::commands::run(args.command, config).await
}

/// Logs go to stderr; `--log-file` adds a plain-text file layer.
fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("log file path must name a file")?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("create log directory {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;

    Ok(guard)
}
