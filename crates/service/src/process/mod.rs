pub mod utils;

use std::net::SocketAddr;
use std::time::Duration;

use futures::future::join_all;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_FILE_NAME: &str = "git-share-relay.log";

use crate::http;
use crate::store::sweeper;
use crate::units::format_bytes;
use crate::{Config, ServiceState};

/// Handle for gracefully shutting down the relay.
pub struct ShutdownHandle {
    graceful_waiter: tokio::task::JoinHandle<()>,
    handles: Vec<tokio::task::JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
    local_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Block until the relay shuts down (via signal or explicit shutdown).
    ///
    /// The HTTP server and the sweeper are both joined before this returns.
    pub async fn wait(self) -> Result<(), ServeError> {
        let _ = self.graceful_waiter.await;

        if timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(self.handles))
            .await
            .is_err()
        {
            tracing::error!(
                "Failed to shut down within {} seconds",
                FINAL_SHUTDOWN_TIMEOUT.as_secs()
            );
            return Err(ServeError::ShutdownTimeout(FINAL_SHUTDOWN_TIMEOUT));
        }

        tracing::info!("relay stopped");
        Ok(())
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Address the relay actually bound, useful when the configured port is 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Initialize logging, panic handler, and build info reporting.
/// Returns guards that must be kept alive for the duration of the program.
pub fn init_logging(config: &Config) -> Vec<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(stdout_env_filter);

    let file_layer = config.log_dir.as_ref().map(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
        }

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        let file_env_filter = EnvFilter::builder()
            .with_default_directive(config.log_level.into())
            .from_env_lossy();

        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(file_env_filter)
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: logging already initialized: {}", e);
    }

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Bind the listener, then spawn the HTTP server and the expiry sweeper.
///
/// Binding happens before anything is spawned, so a port conflict is reported here
/// rather than from inside a background task.
pub async fn start_service(config: &Config) -> Result<(ServiceState, ShutdownHandle), ServeError> {
    config.validate()?;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| ServeError::Bind {
        addr: config.listen_addr,
        source,
    })?;

    let (graceful_waiter, shutdown_tx, shutdown_rx) =
        utils::graceful_shutdown_blocker().map_err(ServeError::Signals)?;
    let state = ServiceState::from_config(config);

    let mut handles = Vec::new();

    let http_config = http::Config::from(config);
    let http_state = state.clone();
    let http_rx = shutdown_rx.clone();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http::run(listener, http_config, http_state, http_rx).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });
    handles.push(http_handle);

    let sweeper_handle = sweeper::spawn(
        state.store().clone(),
        config.sweep_interval,
        shutdown_rx.clone(),
    );
    handles.push(sweeper_handle);

    tracing::info!(
        addr = %local_addr,
        max_ttl_secs = config.max_ttl.as_secs(),
        max_payload = %format_bytes(config.max_payload_size),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "relay running"
    );

    let handle = ShutdownHandle {
        graceful_waiter,
        handles,
        shutdown_tx,
        local_addr,
    };

    Ok((state, handle))
}

/// Run the relay until SIGINT or SIGTERM. Use for CLI binary usage.
pub async fn spawn_service(config: &Config) -> Result<(), ServeError> {
    let _guards = init_logging(config);
    let (_, handle) = start_service(config).await?;
    handle.wait().await
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("failed to install signal handlers: {0}")]
    Signals(std::io::Error),
    #[error("relay did not shut down within {0:?}")]
    ShutdownTimeout(Duration),
}
