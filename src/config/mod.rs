use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::canvas::DEFAULT_STROKE_WIDTH;
use crate::geometry::Color;
use crate::overlay::AnnotationPlacement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "mathpad";
const APP_CONFIG_FILE: &str = "config.json";
pub const API_URL_ENV: &str = "MATHPAD_API_URL";

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CLEAR_DELAY_MS: u64 = 1_000;

/// What to do with an evaluation response that arrives after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    #[default]
    Discard,
    Apply,
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub request_timeout_ms: u64,
    pub clear_delay_ms: u64,
    pub stroke_width: u8,
    pub default_color: String,
    pub annotation_placement: AnnotationPlacement,
    pub stale_responses: StaleResponsePolicy,
    pub allow_concurrent_evaluations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            clear_delay_ms: DEFAULT_CLEAR_DELAY_MS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            default_color: Color::WHITE.to_string(),
            annotation_placement: AnnotationPlacement::default(),
            stale_responses: StaleResponsePolicy::default(),
            allow_concurrent_evaluations: true,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn stroke_color(&self) -> Color {
        Color::from_hex(&self.default_color).unwrap_or_else(|| {
            tracing::warn!(value = %self.default_color, "invalid default_color; using white");
            Color::WHITE
        })
    }

    /// Configured endpoint base address, ignoring blank values.
    pub fn endpoint(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    fn apply_env_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = Some(url);
        }
        self
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
        .apply_env_override(std::env::var(API_URL_ENV).ok())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
