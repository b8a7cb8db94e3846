//! Application configuration. Listen address, paths, rate limits, identity provider.
//!
//! Read from `QUIZHUB_*` environment variables (and `.env`), optionally layered over a
//! file named by `QUIZHUB_CONFIG`.

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Bind address. Read from QUIZHUB_HOST.
    #[serde(default)]
    pub host: Option<String>,

    /// Bind port. Read from QUIZHUB_PORT.
    #[serde(default)]
    pub port: Option<u16>,

    /// Directory holding quizhub.db. Read from QUIZHUB_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// JSON file with initial categories/questions. Read from QUIZHUB_SEED_PATH.
    #[serde(default)]
    pub seed_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Rate limiting (newsletter + contact writes, per client IP)
    // ─────────────────────────────────────────────────────────────────────────
    /// Requests allowed per window. Read from QUIZHUB_RATE_LIMIT_MAX.
    #[serde(default)]
    pub rate_limit_max: Option<u32>,

    /// Window length in seconds. Read from QUIZHUB_RATE_LIMIT_WINDOW_SECS.
    #[serde(default)]
    pub rate_limit_window_secs: Option<u64>,

    /// Key rate limits on the first `X-Forwarded-For` hop instead of the socket peer.
    /// Enable only behind a proxy that sets the header. Read from QUIZHUB_TRUST_FORWARDED_FOR.
    #[serde(default)]
    pub trust_forwarded_for: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Identity provider
    // ─────────────────────────────────────────────────────────────────────────
    /// OIDC userinfo endpoint. Read from QUIZHUB_IDENTITY_USERINFO_URL.
    #[serde(default)]
    pub identity_userinfo_url: Option<String>,

    /// Local-only bearer token accepted when no provider is configured. Read from QUIZHUB_DEV_TOKEN.
    #[serde(default)]
    pub dev_token: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("QUIZHUB_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // Environment wins over the file.
        c = c.add_source(config::Environment::with_prefix("QUIZHUB"));
        c.build()?.try_deserialize()
    }

    pub fn host_or_default(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host_or_default(), self.port_or_default())
    }

    pub fn data_dir_or_default(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    pub fn rate_limit_max_or_default(&self) -> u32 {
        self.rate_limit_max.unwrap_or(DEFAULT_RATE_LIMIT_MAX)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(
            self.rate_limit_window_secs
                .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        )
    }

    pub fn trust_forwarded_for_or_default(&self) -> bool {
        self.trust_forwarded_for.unwrap_or(false)
    }

    /// Userinfo URL, ignoring blank values.
    pub fn identity_userinfo_url(&self) -> Option<&str> {
        self.identity_userinfo_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_address(), "0.0.0.0:3000");
        assert_eq!(cfg.data_dir_or_default(), "./data");
        assert_eq!(cfg.rate_limit_max_or_default(), 5);
        assert_eq!(cfg.rate_limit_window(), Duration::from_secs(60));
        assert!(!cfg.trust_forwarded_for_or_default());
        assert_eq!(cfg.identity_userinfo_url(), None);
    }

    #[test]
    fn test_blank_userinfo_url_is_unset() {
        let cfg = AppConfig {
            identity_userinfo_url: Some("  ".into()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.identity_userinfo_url(), None);

        let cfg = AppConfig {
            identity_userinfo_url: Some("https://auth.example.com/userinfo".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.identity_userinfo_url(),
            Some("https://auth.example.com/userinfo")
        );
    }

    #[test]
    fn test_deserializes_from_config_source() {
        let cfg: AppConfig = config::Config::builder()
            .set_override("port", 8080)
            .unwrap()
            .set_override("rate_limit_max", 2)
            .unwrap()
            .set_override("seed_path", "seed.json")
            .unwrap()
            .set_override("trust_forwarded_for", "true")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.port_or_default(), 8080);
        assert_eq!(cfg.rate_limit_max_or_default(), 2);
        assert_eq!(cfg.seed_path.as_deref(), Some("seed.json"));
        assert_eq!(cfg.host_or_default(), DEFAULT_HOST);
        assert!(cfg.trust_forwarded_for_or_default());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let res: Result<AppConfig, _> = config::Config::builder()
            .set_override("port", "not-a-port")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize();
        assert!(res.is_err());
    }
}
