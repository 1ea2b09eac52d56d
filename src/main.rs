#![forbid(unsafe_code)]

//! `task-relay` — MCP task data server binary.
//!
//! Bootstraps configuration, assembles the capability registry, and serves
//! the Streamable HTTP protocol endpoint until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use task_relay::config::GlobalConfig;
use task_relay::mcp::http;
use task_relay::mcp::resources::all_tasks::AllTasksResource;
use task_relay::mcp::resources::tasks_by_status::TasksByStatusResource;
use task_relay::mcp::resources::{CapabilityRegistry, FixedResource, TemplatedResource};
use task_relay::mcp::server::McpServer;
use task_relay::mcp::session::SessionRegistry;
use task_relay::protocol::ServerInfo;
use task_relay::tasks::client::TaskClient;
use task_relay::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "task-relay", about = "MCP task data server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the task API base URL.
    #[arg(long)]
    tasks_api: Option<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("task-relay server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(api) = args.tasks_api {
        config.tasks_api_url = api.trim_end_matches('/').to_owned();
    }
    let config = Arc::new(config);
    info!(tasks_api = %config.tasks_api_url, "configuration loaded");

    // ── Assemble capabilities ───────────────────────────
    // The capability set is constructed explicitly; registration order
    // matters for template dispatch.
    let client = Arc::new(TaskClient::new(config.tasks_api_url.clone()));
    let fixed: Vec<Arc<dyn FixedResource>> =
        vec![Arc::new(AllTasksResource::new(Arc::clone(&client)))];
    let templated: Vec<Arc<dyn TemplatedResource>> =
        vec![Arc::new(TasksByStatusResource::new(client))];
    let resources = CapabilityRegistry::new(fixed, templated)?;

    // ── Build the protocol server ───────────────────────
    let server = McpServer::new(
        ServerInfo {
            name: config.server_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
        resources,
        Arc::new(SessionRegistry::new()),
    );

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.http_port)
        .parse()
        .map_err(|err| AppError::Config(format!("invalid bind address: {err}")))?;

    // ── Serve until interrupted ─────────────────────────
    let ct = CancellationToken::new();
    let serve_ct = ct.clone();
    let serve_server = Arc::clone(&server);
    let serve_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(serve_server, addr, serve_ct).await {
            error!(%err, "protocol endpoint failed");
        }
    });

    info!(%addr, "MCP server ready");

    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = tokio::join!(serve_handle);
    info!("task-relay shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
