//! Suite configuration.
//!
//! A [`SuiteConfig`] is built once per process ([`SuiteConfig::load`]) and
//! shared by reference with sessions and page objects. Sources, in order of
//! precedence (last wins):
//!
//! 1. built-in defaults
//! 2. a YAML file named by `SAUCEDEMO_CONFIG`
//! 3. individual environment overrides (`SAUCEDEMO_BASE_URL`, ...)

use crate::result::{E2eError, E2eResult};
use crate::users::SHARED_PASSWORD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Entry URL of the system under test
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Env var naming a YAML config file
pub const CONFIG_FILE_ENV: &str = "SAUCEDEMO_CONFIG";
/// Env override for the base URL
pub const BASE_URL_ENV: &str = "SAUCEDEMO_BASE_URL";
/// Env override for headless mode
pub const HEADLESS_ENV: &str = "SAUCEDEMO_HEADLESS";
/// Env override for the explicit wait, in milliseconds
pub const EXPLICIT_WAIT_ENV: &str = "SAUCEDEMO_EXPLICIT_WAIT_MS";
/// Env override for the Chromium executable
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

// =============================================================================
// BROWSER SETTINGS
// =============================================================================

/// Browser session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Start the window maximized
    pub maximize_window: bool,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Chromium sandbox (disable for containers/CI)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            maximize_window: true,
            window_width: 1920,
            window_height: 1080,
            sandbox: false,
            chromium_path: None,
        }
    }
}

impl BrowserSettings {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Wait deadlines, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Budget for scoped single-element lookups inside an already-found element
    pub implicit_wait_ms: u64,
    /// Default deadline for explicit waits
    pub explicit_wait_ms: u64,
    /// Interval between condition polls
    pub poll_interval_ms: u64,
    /// Login transition deadline
    pub login_ms: u64,
    /// Login transition deadline for the latency-injected account
    pub slow_login_ms: u64,
    /// Error banner visibility deadline
    pub error_banner_ms: u64,
    /// Catalog rows presence deadline
    pub catalog_ms: u64,
    /// Detail page URL and heading deadline
    pub detail_page_ms: u64,
    /// Per-strategy confirmation deadline when opening a product
    pub navigation_confirm_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            implicit_wait_ms: 10_000,
            explicit_wait_ms: 15_000,
            poll_interval_ms: 100,
            login_ms: 10_000,
            slow_login_ms: 15_000,
            error_banner_ms: 5_000,
            catalog_ms: 10_000,
            detail_page_ms: 10_000,
            navigation_confirm_ms: 3_000,
        }
    }
}

impl TimeoutSettings {
    /// Scoped lookup budget
    #[must_use]
    pub const fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    /// Default explicit wait
    #[must_use]
    pub const fn explicit_wait(&self) -> Duration {
        Duration::from_millis(self.explicit_wait_ms)
    }

    /// Poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Login deadline
    #[must_use]
    pub const fn login(&self) -> Duration {
        Duration::from_millis(self.login_ms)
    }

    /// Slow-account login deadline
    #[must_use]
    pub const fn slow_login(&self) -> Duration {
        Duration::from_millis(self.slow_login_ms)
    }

    /// Error banner deadline
    #[must_use]
    pub const fn error_banner(&self) -> Duration {
        Duration::from_millis(self.error_banner_ms)
    }

    /// Catalog deadline
    #[must_use]
    pub const fn catalog(&self) -> Duration {
        Duration::from_millis(self.catalog_ms)
    }

    /// Detail page deadline
    #[must_use]
    pub const fn detail_page(&self) -> Duration {
        Duration::from_millis(self.detail_page_ms)
    }

    /// Navigation confirmation deadline
    #[must_use]
    pub const fn navigation_confirm(&self) -> Duration {
        Duration::from_millis(self.navigation_confirm_ms)
    }
}

// =============================================================================
// SUITE CONFIG
// =============================================================================

/// Immutable configuration for one test process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Entry URL, always ending in `/`
    pub base_url: String,
    /// Password used when a login call does not supply one
    pub password: String,
    /// Browser session configuration
    pub browser: BrowserSettings,
    /// Wait deadlines
    pub timeouts: TimeoutSettings,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            password: SHARED_PASSWORD.to_string(),
            browser: BrowserSettings::default(),
            timeouts: TimeoutSettings::default(),
        }
    }
}

impl SuiteConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from defaults, the optional YAML file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if an
    /// override or the final config is invalid.
    pub fn load() -> E2eResult<Self> {
        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML.
    pub fn from_yaml_str(yaml: &str) -> E2eResult<Self> {
        let mut config: Self = serde_yaml_ng::from_str(yaml)?;
        config.base_url = normalize_base_url(&config.base_url);
        Ok(config)
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> E2eResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// [`SuiteConfig::load`]).
    ///
    /// # Errors
    ///
    /// Returns an error if an override value cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = normalize_base_url(&url);
        }
        if let Some(value) = lookup(HEADLESS_ENV) {
            self.browser.headless = parse_flag(HEADLESS_ENV, &value)?;
        }
        if let Some(value) = lookup(EXPLICIT_WAIT_ENV) {
            self.timeouts.explicit_wait_ms = value.trim().parse().map_err(|_| {
                E2eError::config(format!("{EXPLICIT_WAIT_ENV} must be milliseconds, got '{value}'"))
            })?;
        }
        if let Some(path) = lookup(CHROMIUM_PATH_ENV) {
            self.browser.chromium_path = Some(path);
        }
        Ok(())
    }

    /// Reject configurations no scenario can run with.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty base URL, an empty password or a zero
    /// explicit wait / poll interval.
    pub fn validate(&self) -> E2eResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(E2eError::config("base_url must not be empty"));
        }
        if self.password.is_empty() {
            return Err(E2eError::config("password must not be empty"));
        }
        if self.timeouts.explicit_wait_ms == 0 {
            return Err(E2eError::config("explicit_wait_ms must be positive"));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(E2eError::config("poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }

    /// Replace the browser settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserSettings) -> Self {
        self.browser = browser;
        self
    }

    /// Replace the timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Absolute URL for a path relative to the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn parse_flag(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults_match_site() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, "https://www.saucedemo.com/");
            assert_eq!(config.password, "secret_sauce");
            assert_eq!(config.timeouts.implicit_wait(), Duration::from_secs(10));
            assert_eq!(config.timeouts.explicit_wait(), Duration::from_secs(15));
            assert!(config.browser.maximize_window);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_url_for() {
            let config = SuiteConfig::default();
            assert_eq!(
                config.url_for("/inventory.html"),
                "https://www.saucedemo.com/inventory.html"
            );
            assert_eq!(
                config.url_for("cart.html"),
                "https://www.saucedemo.com/cart.html"
            );
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let yaml = "base_url: http://localhost:3000\ntimeouts:\n  explicit_wait_ms: 2000\n";
            let config = SuiteConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(config.base_url, "http://localhost:3000/");
            assert_eq!(config.timeouts.explicit_wait_ms, 2000);
            assert_eq!(config.timeouts.login_ms, 10_000);
            assert_eq!(config.password, "secret_sauce");
        }

        #[test]
        fn test_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("suite.yaml");
            std::fs::write(&path, "browser:\n  headless: false\n  window_width: 1280\n").unwrap();
            let config = SuiteConfig::from_yaml_file(&path).unwrap();
            assert!(!config.browser.headless);
            assert_eq!(config.browser.window_width, 1280);
            assert_eq!(config.browser.window_height, 1080);
        }

        #[test]
        fn test_malformed_yaml_is_error() {
            let err = SuiteConfig::from_yaml_str("timeouts: [1, 2").unwrap_err();
            assert!(matches!(err, E2eError::Yaml(_)));
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = SuiteConfig::from_yaml_file("/nonexistent/suite.yaml").unwrap_err();
            assert!(matches!(err, E2eError::Io(_)));
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_env_overrides() {
            let mut config = SuiteConfig::default();
            config
                .apply_overrides(lookup_from(&[
                    (BASE_URL_ENV, "http://127.0.0.1:8080"),
                    (HEADLESS_ENV, "no"),
                    (EXPLICIT_WAIT_ENV, "500"),
                    (CHROMIUM_PATH_ENV, "/usr/bin/chromium"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:8080/");
            assert!(!config.browser.headless);
            assert_eq!(config.timeouts.explicit_wait_ms, 500);
            assert_eq!(
                config.browser.chromium_path.as_deref(),
                Some("/usr/bin/chromium")
            );
        }

        #[test]
        fn test_bad_flag_rejected() {
            let mut config = SuiteConfig::default();
            let err = config
                .apply_overrides(lookup_from(&[(HEADLESS_ENV, "maybe")]))
                .unwrap_err();
            assert!(err.to_string().contains(HEADLESS_ENV));
        }

        #[test]
        fn test_bad_wait_rejected() {
            let mut config = SuiteConfig::default();
            assert!(config
                .apply_overrides(lookup_from(&[(EXPLICIT_WAIT_ENV, "soon")]))
                .is_err());
        }

        #[test]
        fn test_no_overrides_is_noop() {
            let mut config = SuiteConfig::default();
            config.apply_overrides(lookup_from(&[])).unwrap();
            assert_eq!(config, SuiteConfig::default());
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_zero_wait_rejected() {
            let mut timeouts = TimeoutSettings::default();
            timeouts.explicit_wait_ms = 0;
            let config = SuiteConfig::default().with_timeouts(timeouts);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_empty_base_url_rejected() {
            let config = SuiteConfig::default().with_base_url("  ");
            assert!(config.validate().is_err());
        }
    }
}
