//! RON configuration file for the shell.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use downloader_engine::{EngineConfig, FetchSettings};
use engine_logging::engine_info;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILENAME: &str = "downloader.ron";

/// Settings read from `downloader.ron`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub urls: Vec<String>,
    pub parallel_workers: Option<usize>,
    pub connect_timeout_ms: u64,
    pub redirect_limit: usize,
    pub user_agent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            urls: engine.urls,
            parallel_workers: engine.parallel_workers,
            connect_timeout_ms: duration_ms(engine.fetch.connect_timeout),
            redirect_limit: engine.fetch.redirect_limit,
            user_agent: engine.fetch.user_agent,
        }
    }
}

impl AppConfig {
    /// Converts to the engine's configuration; `workers` overrides the file value.
    pub fn into_engine_config(self, workers: Option<usize>) -> EngineConfig {
        EngineConfig {
            urls: self.urls,
            fetch: FetchSettings {
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                redirect_limit: self.redirect_limit,
                user_agent: self.user_agent,
            },
            parallel_workers: workers.or(self.parallel_workers),
        }
    }
}

/// Loads the configuration.
///
/// An explicit path must exist. Without one, `./downloader.ron` is read if
/// present and the built-in defaults are used otherwise.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILENAME);
            if path.exists() {
                read_config(path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: AppConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    engine_info!(
        "Loaded config from {:?} ({} urls)",
        path,
        config.urls.len()
    );
    Ok(config)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
