//! Health Report Summarizer terminal client
//!
//! Uploads a PDF or CSV report, prints the highlighted summary and browses
//! previously processed documents.

use std::cell::Cell;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use healthsum_core::config::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TICK_INTERVAL_MS, DEFAULT_UPLOAD_URL};
use healthsum_core::{
    ClientConfig, ContentView, Dashboard, Document, HistoryFallback, Notification, TokioEventLoop,
    UploadOutcome,
};
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;
mod transport;

use transport::{mime_for, ReqwestService};

const DEFAULT_NATIVE_HISTORY_URL: &str = "http://localhost:5000/api/history";

#[derive(Parser, Debug)]
#[command(name = "healthsum")]
#[command(version, about = "Summarize medical reports with an analysis service")]
struct Cli {
    /// Upload endpoint
    #[arg(long, env = "HEALTHSUM_UPLOAD_URL", default_value = DEFAULT_UPLOAD_URL)]
    upload_url: String,

    /// History endpoint
    #[arg(long, env = "HEALTHSUM_HISTORY_URL", default_value = DEFAULT_NATIVE_HISTORY_URL)]
    history_url: String,

    /// Base URL for single history records (`<url>/<id>`)
    #[arg(long, env = "HEALTHSUM_DETAIL_URL")]
    detail_url: Option<String>,

    /// Largest accepted file in bytes
    #[arg(long, env = "HEALTHSUM_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,

    /// Progress refresh interval in milliseconds
    #[arg(
        long,
        env = "HEALTHSUM_TICK_INTERVAL_MS",
        default_value_t = DEFAULT_TICK_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tick_interval_ms: u64,

    /// History shown when the endpoint fails: empty or demo
    #[arg(long, env = "HEALTHSUM_HISTORY_FALLBACK", default_value = "empty")]
    history_fallback: HistoryFallback,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a report and print its summary
    Upload {
        file: PathBuf,
        /// Write a Markdown export into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// List previously processed documents
    History,
    /// Print the summary of a history entry
    Open {
        id: String,
        /// Write a Markdown export into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            upload_url: self.upload_url.clone(),
            history_url: self.history_url.clone(),
            detail_url: self.detail_url.clone(),
            max_upload_bytes: self.max_upload_bytes,
            tick_interval_ms: self.tick_interval_ms,
            history_fallback: self.history_fallback,
            ..ClientConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs share stderr with progress; stdout carries only results
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    LocalSet::new().run_until(run(cli)).await
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.config();
    tracing::debug!(?config, "Resolved configuration");

    let dashboard = Dashboard::new(
        &config,
        ReqwestService::new(config.clone()),
        TokioEventLoop,
        |notification: &Notification| eprintln!("{}", render::notification_line(notification)),
    );
    show_progress(&dashboard);

    match cli.command {
        Command::Upload { file, export } => upload(&dashboard, file, export.as_deref()).await,
        Command::History => {
            dashboard.refresh_history().await;
            print!("{}", render::history_block(&dashboard.view().history));
            Ok(ExitCode::SUCCESS)
        }
        Command::Open { id, export } => {
            dashboard.refresh_history().await;
            if !dashboard.open_history_entry(&id).await {
                eprintln!("Unknown history entry: {}", id);
                return Ok(ExitCode::FAILURE);
            }
            print_result(&dashboard);
            if let Some(dir) = export {
                save_export(&dashboard, &dir).await?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn upload(
    dashboard: &Dashboard<ReqwestService>,
    file: PathBuf,
    export: Option<&Path>,
) -> Result<ExitCode> {
    let metadata = tokio::fs::metadata(&file)
        .await
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let document = Document::new(name.clone(), metadata.len(), mime_for(&name));

    match dashboard.submit(document, file).await {
        UploadOutcome::Succeeded => {
            print_result(dashboard);
            if let Some(dir) = export {
                save_export(dashboard, dir).await?;
            }
            Ok(ExitCode::SUCCESS)
        }
        UploadOutcome::Rejected | UploadOutcome::Failed | UploadOutcome::Superseded => {
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Redraw a single progress line on stderr while an upload is pending
fn show_progress(dashboard: &Dashboard<ReqwestService>) {
    let drawing = Cell::new(false);
    dashboard.on_change(move |view| {
        let mut stderr = std::io::stderr();
        match view.upload_progress {
            Some(percent) => {
                let _ = write!(stderr, "{}", render::progress_line(percent));
                let _ = stderr.flush();
                drawing.set(true);
            }
            None if drawing.get() => {
                let _ = writeln!(stderr);
                drawing.set(false);
            }
            None => {}
        }
    });
}

fn print_result(dashboard: &Dashboard<ReqwestService>) {
    if let ContentView::Result(result) = dashboard.view().content {
        let color = std::io::stdout().is_terminal();
        print!("{}", render::result_block(&result, color));
    }
}

async fn save_export(dashboard: &Dashboard<ReqwestService>, dir: &Path) -> Result<()> {
    let Some(export) = dashboard.export_summary() else {
        return Ok(());
    };
    let path = dir.join(&export.filename);
    tokio::fs::write(&path, export.content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Saved {}", path.display());
    Ok(())
}
