use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

/// Default request timeout applied to every API call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings shared by every command. Flags win over environment
/// variables, which may also come from a `.env` file.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Base URL of the portfolio REST API (e.g. https://api.example.dev/api)
    #[arg(long, env = "FOLIO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Public site URL used to resolve relative image paths
    #[arg(long, env = "FOLIO_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "FOLIO_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Where the signed-in session is stored
    #[arg(long, env = "FOLIO_SESSION_PATH", global = true)]
    pub session_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub base_url: String,
    pub timeout: Duration,
    pub session_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No API URL configured. Pass --api-url or set FOLIO_API_URL")]
    MissingApiUrl,

    #[error("Invalid API URL '{0}': it must start with http:// or https://")]
    InvalidApiUrl(String),
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> Result<Config, ConfigError> {
        let api_url = args
            .api_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingApiUrl)?;

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        // Without a site URL, images are resolved against the API host
        let base_url = args
            .base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url.clone());

        let session_path = args.session_path.unwrap_or_else(default_session_path);

        Ok(Config {
            api_url,
            base_url,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            session_path,
        })
    }
}

pub fn default_session_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_url: Option<&str>) -> ConfigArgs {
        ConfigArgs {
            api_url: api_url.map(String::from),
            base_url: None,
            timeout_secs: None,
            session_path: None,
        }
    }

    #[test]
    fn test_defaults_are_applied() {
        let config = Config::from_args(args(Some("https://api.example.dev/api/"))).unwrap();

        assert_eq!(config.api_url, "https://api.example.dev/api");
        assert_eq!(config.base_url, "https://api.example.dev/api");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.session_path.ends_with("folio/session.json"));
    }

    #[test]
    fn test_missing_api_url() {
        assert!(matches!(
            Config::from_args(args(None)),
            Err(ConfigError::MissingApiUrl)
        ));
        assert!(matches!(
            Config::from_args(args(Some("  "))),
            Err(ConfigError::MissingApiUrl)
        ));
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            Config::from_args(args(Some("ftp://example.dev"))),
            Err(ConfigError::InvalidApiUrl(_))
        ));
    }
}
