//! Configuration management for folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `billing.rates_url`
//! - `billing.default_currency`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the currency bills are converted into.
    pub default_currency: Option<String>,
    /// Override the exchange-rate service URL.
    pub rates_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown engine options.
    pub markdown: MarkdownConfig,
    /// Which container presets are installed.
    pub features: FeatureToggles,
    /// Bill widget options.
    pub billing: BillingConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Maximum container nesting depth before blocks degrade to text.
    pub max_nesting: usize,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { max_nesting: 20 }
    }
}

/// Container preset toggles. Everything is enabled by default.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureToggles {
    /// `timeline` and `timeline-item` containers.
    pub timeline: bool,
    /// `chart-grid` and `table-grid` containers.
    pub grids: bool,
    /// `chart` blocks.
    pub charts: bool,
    /// `chat` and `message` containers.
    pub chat: bool,
    /// `stepper` tabs.
    pub stepper: bool,
    /// `carousel` tabs.
    pub carousel: bool,
    /// `markmap` code fences.
    pub markmap: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            timeline: true,
            grids: true,
            charts: true,
            chat: true,
            stepper: true,
            carousel: true,
            markmap: true,
        }
    }
}

/// Bill widget configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// ISO 4217 code bills are converted into when they name no target.
    pub default_currency: String,
    /// Base URL of the Frankfurter-compatible rate service.
    pub rates_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries after the first failed request.
    pub max_retries: u32,
    /// Base delay between retries; attempt `n` waits `n` times this.
    pub retry_delay_ms: u64,
    /// How long fetched rates stay valid.
    pub cache_ttl_secs: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_currency: "CNY".to_owned(),
            rates_url: "https://api.frankfurter.app".to_owned(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 500,
            cache_ttl_secs: 600,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`billing.rates_url`").
        field: String,
        /// Error message (e.g., "${`FOLIO_RATES_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(currency) = &settings.default_currency {
            self.billing.default_currency = currency.to_ascii_uppercase();
        }
        if let Some(rates_url) = &settings.rates_url {
            self.billing.rates_url.clone_from(rates_url);
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_markdown()?;
        self.validate_billing()?;
        Ok(())
    }

    fn validate_markdown(&self) -> Result<(), ConfigError> {
        const MAX_NESTING: usize = 100;

        let depth = self.markdown.max_nesting;
        if depth == 0 || depth > MAX_NESTING {
            return Err(ConfigError::Validation(format!(
                "markdown.max_nesting must be between 1 and {MAX_NESTING}"
            )));
        }
        Ok(())
    }

    fn validate_billing(&self) -> Result<(), ConfigError> {
        let billing = &self.billing;

        let currency = &billing.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "billing.default_currency must be a 3-letter currency code, got {currency:?}"
            )));
        }

        require_non_empty(&billing.rates_url, "billing.rates_url")?;
        require_http_url(&billing.rates_url, "billing.rates_url")?;

        if billing.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "billing.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.billing.rates_url = expand::expand_env(&self.billing.rates_url, "billing.rates_url")?;
        self.billing.default_currency =
            expand::expand_env(&self.billing.default_currency, "billing.default_currency")?
                .to_ascii_uppercase();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.markdown.max_nesting, 20);
        assert_eq!(config.features, FeatureToggles::default());
        assert!(config.features.markmap);
        assert_eq!(config.billing.default_currency, "CNY");
        assert_eq!(config.billing.rates_url, "https://api.frankfurter.app");
        assert_eq!(config.billing.max_retries, 3);
        assert!(config.config_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.markdown.max_nesting, 20);
        assert_eq!(config.billing.cache_ttl_secs, 600);
    }

    #[test]
    fn test_parse_features_partial() {
        let toml = r"
[features]
grids = false
charts = false
markmap = false
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.features,
            FeatureToggles {
                grids: false,
                charts: false,
                markmap: false,
                ..FeatureToggles::default()
            }
        );
    }

    #[test]
    fn test_parse_billing_config() {
        let toml = r#"
[billing]
default_currency = "usd"
timeout_secs = 3
retry_delay_ms = 100
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.billing.default_currency, "usd");
        assert_eq!(config.billing.timeout_secs, 3);
        assert_eq!(config.billing.retry_delay_ms, 100);
        assert_eq!(config.billing.max_retries, 3);
    }

    #[test]
    fn test_parse_unknown_type_errors() {
        let toml = r#"
[markdown]
max_nesting = "deep"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_apply_cli_settings_overrides() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            default_currency: Some("eur".to_owned()),
            rates_url: Some("http://localhost:8080".to_owned()),
        });
        assert_eq!(config.billing.default_currency, "EUR");
        assert_eq!(config.billing.rates_url, "http://localhost:8080");
    }

    #[test]
    fn test_apply_cli_settings_empty_keeps_values() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.billing.default_currency, "CNY");
    }

    #[test]
    fn test_expand_env_vars_rates_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_FOLIO_RATES_URL", "https://rates.test");
        }

        let toml = r#"
[billing]
rates_url = "${TEST_FOLIO_RATES_URL}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.billing.rates_url, "https://rates.test");

        unsafe {
            std::env::remove_var("TEST_FOLIO_RATES_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_default_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TEST_FOLIO_CURRENCY_UNSET");
        }

        let toml = r#"
[billing]
default_currency = "${TEST_FOLIO_CURRENCY_UNSET:-jpy}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.billing.default_currency, "JPY");
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_FOLIO_CONFIG_TEST");
        }

        let toml = r#"
[billing]
rates_url = "${MISSING_VAR_FOLIO_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_FOLIO_CONFIG_TEST"));
        assert!(err.to_string().contains("billing.rates_url"));
    }

    #[test]
    fn test_validate_max_nesting_zero() {
        let mut config = Config::default();
        config.markdown.max_nesting = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("markdown.max_nesting"));
    }

    #[test]
    fn test_validate_max_nesting_too_large() {
        let mut config = Config::default();
        config.markdown.max_nesting = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        let mut config = Config::default();
        config.billing.default_currency = "EURO".to_owned();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: billing.default_currency must be a 3-letter currency code, got \"EURO\""
        );
    }

    #[test]
    fn test_validate_rates_url_scheme() {
        let mut config = Config::default();
        config.billing.rates_url = "ftp://rates".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must start with http:// or https://"));
    }

    #[test]
    fn test_validate_rates_url_empty() {
        let mut config = Config::default();
        config.billing.rates_url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("billing.rates_url cannot be empty"));
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default();
        config.billing.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_from_file_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[markdown]\nmax_nesting = 5\n\n[features]\nchat = false\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.markdown.max_nesting, 5);
        assert!(!config.features.chat);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[billing]\ndefault_currency = \"USD\"\n").unwrap();

        let settings = CliSettings {
            default_currency: Some("gbp".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.billing.default_currency, "GBP");
    }

    #[test]
    fn test_load_rejects_invalid_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            rates_url: Some("localhost".to_owned()),
            ..CliSettings::default()
        };
        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[markdown\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("guide");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        assert_eq!(Config::discover_config(&nested), Some(path));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let nearest = nested.join(CONFIG_FILENAME);
        std::fs::write(&nearest, "").unwrap();

        assert_eq!(Config::discover_config(&nested), Some(nearest));
    }
}
