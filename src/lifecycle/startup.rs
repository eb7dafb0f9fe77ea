//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the pipeline, bind the listener and serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::path::{Path, PathBuf};

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ServerConfig;
use crate::config::validation::validate_config;
use crate::config::watcher::ConfigWatcher;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::registry::Registry;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub base_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub watch: bool,
}

impl StartupOptions {
    /// Apply the command-line overrides to `config` and validate the result.
    pub fn apply_overrides(&self, mut config: ServerConfig) -> Result<ServerConfig, ConfigError> {
        if let Some(base_path) = &self.base_path {
            config.application.base_path = base_path.clone();
        }
        if let Some(bind_address) = &self.bind_address {
            config.listener.bind_address = bind_address.clone();
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Load the configuration and apply command-line overrides.
pub fn resolve_config(options: &StartupOptions) -> Result<ServerConfig, ConfigError> {
    let config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    options.apply_overrides(config)
}

/// Loader for hot reloads: the file as edited, with the same overrides the
/// process was started with.
pub fn reload_config(options: StartupOptions) -> impl Fn(&Path) -> Result<ServerConfig, ConfigError> + Send + 'static {
    move |path: &Path| options.apply_overrides(load_config(path)?)
}

/// Start the host and serve until SIGINT/SIGTERM.
pub async fn run(options: StartupOptions, registry: Registry) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&options)?;

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "servlet-host starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_path = ?config.application.base_path,
        servlets = config.application.servlets.len(),
        filters = config.application.filters.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&options.config_path, options.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, reload_config(options.clone()));
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, registry)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, config_updates, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let options = StartupOptions {
            base_path: Some(PathBuf::from("/srv/site")),
            bind_address: Some("127.0.0.1:9000".into()),
            ..StartupOptions::default()
        };
        let config = resolve_config(&options).unwrap();
        assert_eq!(config.application.base_path, PathBuf::from("/srv/site"));
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_reload_keeps_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        std::fs::write(&path, "[application]\nbase_path = \"webapp\"\nautoflush = true\n").unwrap();

        let options = StartupOptions {
            config_path: Some(path.clone()),
            base_path: Some(PathBuf::from("/srv/site")),
            ..StartupOptions::default()
        };
        let reload = reload_config(options);

        let config = reload(&path).unwrap();
        assert_eq!(config.application.base_path, PathBuf::from("/srv/site"));
        assert!(config.application.autoflush);

        std::fs::write(&path, "[listener]\nbind_address = \"nowhere\"\n").unwrap();
        assert!(matches!(reload(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_bad_override_rejected() {
        let options = StartupOptions {
            bind_address: Some("nowhere".into()),
            ..StartupOptions::default()
        };
        assert!(matches!(resolve_config(&options), Err(ConfigError::Validation(_))));
    }
}
