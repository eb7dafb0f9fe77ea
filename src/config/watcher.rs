//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::ConfigError;
use crate::config::schema::ServerConfig;

/// Loads (and validates) the configuration at a path.
pub type ConfigLoader = Box<dyn Fn(&Path) -> Result<ServerConfig, ConfigError> + Send>;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    loader: ConfigLoader,
    update_tx: mpsc::UnboundedSender<ServerConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher that reloads the file with `loader`.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new<F>(path: &Path, loader: F) -> (Self, mpsc::UnboundedReceiver<ServerConfig>)
    where
        F: Fn(&Path) -> Result<ServerConfig, ConfigError> + Send + 'static,
    {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                loader: Box::new(loader),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned handle must be kept alive.
    ///
    /// Editors often emit several events per save; a reload is only sent
    /// when the file content differs from the last one seen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let loader = self.loader;
        let path = self.path.clone();
        let last_seen = Mutex::new(std::fs::read_to_string(&self.path).ok());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let content = std::fs::read_to_string(&path).ok();
                    {
                        let mut last = last_seen.lock().unwrap_or_else(|e| e.into_inner());
                        if *last == content {
                            return;
                        }
                        *last = content;
                    }

                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match loader(&path) {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Failed to reload config. Keeping current configuration."
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
