//! Configuration file watcher for hot-reload support

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Wait after a modify event so the editor can finish writing
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the config file and yields every successfully re-parsed version
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    pub async fn new(config_path: String) -> Result<(Self, AppConfig)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;

        let watched_path = config_path.clone();

        // notify calls back on its own thread, outside the runtime
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_)) {
                    return;
                }
                debug!("Config file modified: {:?}", event.paths);

                let config_path = watched_path.clone();
                let tx = tx.clone();
                runtime_handle.spawn(async move {
                    tokio::time::sleep(DEBOUNCE).await;

                    match AppConfig::load(&config_path).await {
                        Ok(new_config) => {
                            info!("Configuration reloaded");
                            if let Err(e) = tx.send(new_config).await {
                                error!("Failed to send config update: {}", e);
                            }
                        }
                        Err(e) => warn!("Failed to reload config (keeping old config): {:#}", e),
                    }
                });
            }
            Err(e) => error!("Watch error: {}", e),
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path))?;

        info!("Config file watcher started for: {}", config_path);

        Ok((Self { _watcher: watcher, rx }, initial_config))
    }

    /// Wait for the next config update
    ///
    /// Returns None once the watcher has been closed.
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}
