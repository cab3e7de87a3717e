//! Configuration loading for the KITARO TUI.
//!
//! All fields are required. No defaults.

use kitaro_core::TaskUrls;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    /// Registry API root, e.g. `http://localhost:3000`.
    pub api_base_url: String,
    /// Public site origin used to build referral links.
    pub site_origin: String,
    pub request_timeout_ms: u64,
    pub tick_rate_ms: u64,
    /// Launch the system browser for task links; otherwise they are only shown.
    pub open_urls: bool,
    pub task_urls: TaskUrlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskUrlsConfig {
    pub follow: String,
    pub broadcast: String,
}

impl From<&TaskUrlsConfig> for TaskUrls {
    fn from(urls: &TaskUrlsConfig) -> Self {
        TaskUrls {
            follow: urls.follow.clone(),
            broadcast: urls.broadcast.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or KITARO_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = arg_value("--config")
            .map(PathBuf::from)
            .or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: TuiConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_http_url("api_base_url", &self.api_base_url)?;
        require_http_url("site_origin", &self.site_origin)?;
        require_http_url("task_urls.follow", &self.task_urls.follow)?;
        require_http_url("task_urls.broadcast", &self.task_urls.broadcast)?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_rate_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn task_urls(&self) -> TaskUrls {
        TaskUrls::from(&self.task_urls)
    }
}

fn require_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must start with http:// or https://".to_string(),
        });
    }
    Ok(())
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("KITARO_TUI_CONFIG").ok().map(PathBuf::from)
}

/// Value following `flag` on the command line, if any.
pub fn arg_value(flag: &str) -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
api_base_url = "http://localhost:3000"
site_origin = "https://megakitaro.xyz"
request_timeout_ms = 5000
tick_rate_ms = 250
open_urls = false

[task_urls]
follow = "https://x.com/megakitaro"
broadcast = "https://x.com/megakitaro/status/1"
"#;

    #[test]
    fn test_from_path_parses_sample() -> Result<(), ConfigError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;

        let config = TuiConfig::from_path(file.path())?;
        config.validate()?;
        assert_eq!(config.site_origin, "https://megakitaro.xyz");
        assert_eq!(config.task_urls().follow, "https://x.com/megakitaro");
        Ok(())
    }

    #[test]
    fn test_unknown_fields_rejected() -> Result<(), ConfigError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(format!("{}\nextra = 1\n", SAMPLE).as_bytes())?;

        // `extra` lands in the [task_urls] table, which denies unknown keys.
        assert!(matches!(
            TuiConfig::from_path(file.path()),
            Err(ConfigError::Parse(_))
        ));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_origin() -> Result<(), toml::de::Error> {
        let mut config: TuiConfig = toml::from_str(SAMPLE)?;
        config.site_origin = "megakitaro.xyz".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "site_origin", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_zero_tick() -> Result<(), toml::de::Error> {
        let mut config: TuiConfig = toml::from_str(SAMPLE)?;
        config.tick_rate_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "tick_rate_ms", .. })
        ));
        Ok(())
    }
}
