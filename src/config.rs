use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Converter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Input
    pub export_path: PathBuf,

    // Image rewriting
    pub old_base_url: String,
    pub new_base_prefix: String,

    // Output
    pub posts_dir: PathBuf,
    pub images_dir: PathBuf,

    // Processing
    pub download_images: bool,
    pub fix_code_syntax: bool,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Input
            export_path: PathBuf::from(required_env("GHOST_EXPORT_PATH")?),

            // Image rewriting
            old_base_url: required_env("OLD_BASE_URL")?,
            new_base_prefix: env_or_default("NEW_BASE_PREFIX", ""),

            // Output
            posts_dir: PathBuf::from(env_or_default("POSTS_DIR", "./posts")),
            images_dir: PathBuf::from(env_or_default("IMAGES_DIR", "./img")),

            // Processing
            download_images: parse_env_bool("DOWNLOAD_IMAGES", true)?,
            fix_code_syntax: parse_env_bool("FIX_CODE_SYNTAX", false)?,
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),
        })
    }

    /// Defaults suitable for tests: everything relative, downloads off.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            export_path: PathBuf::from("export.json"),
            old_base_url: "https://example.com".to_string(),
            new_base_prefix: String::new(),
            posts_dir: PathBuf::from("posts"),
            images_dir: PathBuf::from("img"),
            download_images: false,
            fix_code_syntax: false,
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "GHOST_EXPORT_PATH".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        match Url::parse(&self.old_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    name: "OLD_BASE_URL".to_string(),
                    message: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    name: "OLD_BASE_URL".to_string(),
                    message: format!("not an absolute URL: {e}"),
                });
            }
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => parse_bool(name, &val),
        _ => Ok(default),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
