//! boxio CLI - Box folder sync agent
//!
//! ```text
//! boxio [OPTIONS] <CREDENTIALS> listen <ROUND_LIMIT>
//! boxio [OPTIONS] <CREDENTIALS> upload <PATH>...
//! ```
//!
//! The whole sync runs as one spawned task. Its outcome is printed as
//! `Success!` or `Failed!`; the exit status stays 0 either way unless
//! `--strict-exit` is given. Usage and configuration errors exit non-zero
//! before any network call.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{info, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use boxio_api::client::BoxClient;
use boxio_api::provider::BoxStorage;
use boxio_core::config::{load_credentials, Settings};
use boxio_core::domain::{DomainError, TransferMode, TransferTask};
use boxio_sync::SyncController;

mod output;

use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "boxio", version, about = "Box folder listen/upload agent")]
pub struct Cli {
    /// Output the outcome in JSON format
    #[arg(long)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML runtime settings (endpoints, poll interval, page size)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Exit with status 1 when the sync reports failure
    #[arg(long)]
    strict_exit: bool,

    /// Directory downloads are written to
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Do not draw progress bars
    #[arg(short, long)]
    quiet: bool,

    /// Credentials properties file
    credentials: PathBuf,

    /// Operating mode: listen or upload
    mode: TransferMode,

    /// Round limit for listen, file paths for upload
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    fn task(&self) -> Result<TransferTask, DomainError> {
        TransferTask::from_args(self.mode, &self.args)
    }

    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let task = match cli.task() {
        Ok(task) => task,
        Err(e) => Cli::command().error(ErrorKind::InvalidValue, e).exit(),
    };

    init_tracing(cli.verbose);
    let formatter = get_formatter(cli.format());

    match run(&cli, task).await {
        Ok(success) => {
            formatter.outcome(success);
            if success || !cli.strict_exit {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Warnings and errors go to stderr, everything else to stdout
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(writer)
        .init();
}

/// Loads configuration, then runs the controller on its own task
async fn run(cli: &Cli, task: TransferTask) -> Result<bool> {
    let settings = load_settings(cli.settings.as_deref())?;
    let credentials = load_credentials(&cli.credentials).with_context(|| {
        format!(
            "Failed to load credentials from {}",
            cli.credentials.display()
        )
    })?;

    let client = BoxClient::new(&settings).context("Failed to build HTTP client")?;
    let storage = Arc::new(BoxStorage::new(client));

    let mut controller = SyncController::new(storage, credentials)
        .with_poll_interval(settings.poll_interval())
        .with_progress(!cli.quiet);
    if let Some(dir) = &cli.download_dir {
        controller = controller.with_download_dir(dir);
    }

    info!(mode = %task.mode(), api = %settings.api_base_url, "Starting");
    tokio::spawn(controller.run(task))
        .await
        .context("Sync task aborted")
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}
