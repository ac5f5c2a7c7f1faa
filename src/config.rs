//! Application-level configuration loading: tick rate, runs file, checklist and notifications.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MARATHON_LIVE_CONFIG_PATH";
const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
/// Intervals below this would flood clients with time updates.
const MIN_TICK_INTERVAL_MS: u64 = 10;
const DEFAULT_RUNS_FILE: &str = "config/runs.json";
const DEFAULT_CLIENT_BUFFER: usize = 64;
const DEFAULT_EMPTY_NOTICE: &str = "No runs scheduled yet";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    tick_interval: Duration,
    runs_file: PathBuf,
    initial_run_index: usize,
    client_buffer: usize,
    checklist: Vec<String>,
    notify_webhook_url: Option<String>,
    empty_catalog_notice: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        tick_ms = app_config.tick_interval.as_millis() as u64,
                        runs_file = %app_config.runs_file.display(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Period of the timer tick while a run is being timed.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// JSON file the run schedule is imported from.
    pub fn runs_file(&self) -> &PathBuf {
        &self.runs_file
    }

    /// Schedule position selected at startup.
    pub fn initial_run_index(&self) -> usize {
        self.initial_run_index
    }

    /// Per-client outbound buffer size.
    pub fn client_buffer(&self) -> usize {
        self.client_buffer
    }

    /// Checklist items created at startup.
    pub fn checklist(&self) -> &[String] {
        &self.checklist
    }

    /// Webhook receiving run-changed / checklist-completed notifications.
    pub fn notify_webhook_url(&self) -> Option<&str> {
        self.notify_webhook_url.as_deref()
    }

    /// Text carried by the placeholder run while the schedule is empty.
    pub fn empty_catalog_notice(&self) -> &str {
        &self.empty_catalog_notice
    }

    /// Override the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Override the schedule position selected at startup.
    pub fn with_initial_run_index(mut self, index: usize) -> Self {
        self.initial_run_index = index;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    tick_interval_ms: Option<u64>,
    runs_file: Option<PathBuf>,
    initial_run_index: Option<usize>,
    client_buffer: Option<usize>,
    checklist: Vec<String>,
    notify_webhook_url: Option<String>,
    empty_catalog_notice: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let tick_ms = value
            .tick_interval_ms
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS)
            .max(MIN_TICK_INTERVAL_MS);
        Self {
            tick_interval: Duration::from_millis(tick_ms),
            runs_file: value
                .runs_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNS_FILE)),
            initial_run_index: value.initial_run_index.unwrap_or(0),
            client_buffer: value.client_buffer.unwrap_or(DEFAULT_CLIENT_BUFFER).max(1),
            checklist: value.checklist,
            notify_webhook_url: value.notify_webhook_url.filter(|url| !url.trim().is_empty()),
            empty_catalog_notice: value
                .empty_catalog_notice
                .unwrap_or_else(|| DEFAULT_EMPTY_NOTICE.to_string()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
