//! Configuration settings for Arbilo.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `ARBILO_API__ENVIRONMENT=production`.
const ENV_PREFIX: &str = "ARBILO";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// Dashboard polling configuration.
    pub dashboard: DashboardConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
    /// Session storage configuration.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from file, returning default if file doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, then apply environment overrides.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(|e| crate::Error::config(e.to_string()))
            .and_then(Self::validated)
    }

    /// Reject settings that would stall timers or requests.
    fn validated(self) -> crate::Result<Self> {
        let periods = [
            ("api.timeout_secs", self.api.timeout_secs),
            (
                "dashboard.refresh_interval_ms",
                self.dashboard.refresh_interval_ms,
            ),
            ("dashboard.countdown_tick_ms", self.dashboard.countdown_tick_ms),
            ("ui.tick_rate_ms", self.ui.tick_rate_ms),
        ];
        match periods.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(crate::Error::config(format!(
                "{} must be greater than 0",
                name
            ))),
            None => Ok(self),
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// HTTP base URL for this environment.
    pub fn api_base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:5000",
            Self::Production => "https://arbilo.com",
        }
    }

    /// WebSocket URL for this environment.
    pub fn ws_url(self) -> &'static str {
        match self {
            Self::Development => "ws://localhost:5000",
            Self::Production => "wss://arbilo.com",
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Selects both the HTTP and WebSocket URLs.
    pub environment: Environment,
    /// Overrides the environment's HTTP base URL.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Effective HTTP base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(self.environment.api_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// WebSocket URL for the selected environment.
    pub fn ws_url(&self) -> &'static str {
        self.environment.ws_url()
    }

    /// Request timeout, never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            timeout_secs: 30,
        }
    }
}

/// Dashboard polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between automatic refreshes, in milliseconds.
    pub refresh_interval_ms: u64,
    /// Countdown recompute period, in milliseconds.
    pub countdown_tick_ms: u64,
}

impl DashboardConfig {
    // Zero periods panic in `tokio::time::interval`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms.max(1))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 300_000,
            countdown_tick_ms: 1_000,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Initial page size for the pair table (10, 20, 30 or 40).
    pub pair_page_size: usize,
    /// Initial page size for the track table (10 or 20).
    pub track_page_size: usize,
    /// Show help bar.
    pub show_help_bar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: true,
            pair_page_size: 10,
            track_page_size: 10,
            show_help_bar: true,
        }
    }
}

/// Session storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the durable token store. Defaults to the data directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Effective path of the durable token store.
    pub fn durable_path(&self) -> crate::Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => super::data_dir().map(|dir| dir.join("storage.json")),
        }
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Previous page.
    pub prev_page: String,
    /// Next page.
    pub next_page: String,
    /// Refresh data now.
    pub refresh: String,
    /// Cycle the sort column.
    pub sort: String,
    /// Flip the sort direction.
    pub sort_direction: String,
    /// Cycle the page size.
    pub page_size: String,
    /// Switch to pairs view.
    pub pairs: String,
    /// Switch to track view.
    pub track: String,
    /// Switch to admin view.
    pub admin: String,
    /// Open search.
    pub search: String,
    /// Toggle the selected user's active flag.
    pub toggle_active: String,
    /// Sign out.
    pub logout: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            prev_page: "[".to_string(),
            next_page: "]".to_string(),
            refresh: "r".to_string(),
            sort: "s".to_string(),
            sort_direction: "Shift+S".to_string(),
            page_size: "z".to_string(),
            pairs: "1".to_string(),
            track: "2".to_string(),
            admin: "3".to_string(),
            search: "/".to_string(),
            toggle_active: "t".to_string(),
            logout: "Shift+L".to_string(),
        }
    }
}
