use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_CREDENTIAL_FILE: &str = "service-account.json";

/// Deployment stage, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "prod" | "production" | "live" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the portal backend reads from its environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    /// `None` when the store credentials are incomplete.
    pub airtable: Option<AirtableConfig>,
    pub drive: DriveConfig,
    pub ratings: RatingsConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: var("APP_ENV")
                .map(|label| AppEnvironment::from_label(&label))
                .unwrap_or_default(),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            airtable: AirtableConfig::from_env(),
            drive: DriveConfig::from_env(),
            ratings: RatingsConfig {
                agent_record_id: var("RATING_AGENT_RECORD_ID"),
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `APP_PORT` wins; `PORT` is honoured for hosts that inject it.
    fn from_env() -> Result<Self, ConfigError> {
        let port = match var("APP_PORT").or_else(|| var("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = match self.host.as_str() {
            host if host.eq_ignore_ascii_case("localhost") => IpAddr::V4(Ipv4Addr::LOCALHOST),
            host => host.parse().map_err(|source| ConfigError::InvalidHost {
                value: host.to_string(),
                source,
            })?,
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Credentials for the relational-table store. Absent when either the key or the base is
/// missing; the server then answers store-backed routes as unavailable.
#[derive(Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub api_url: String,
}

impl AirtableConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            api_key: var("AIRTABLE_API_KEY")?,
            base_id: var("AIRTABLE_BASE_ID")?,
            api_url: var("AIRTABLE_API_URL")
                .unwrap_or_else(|| DEFAULT_AIRTABLE_API_URL.to_string()),
        })
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Google Drive upload target and service-account credentials.
#[derive(Clone, Default)]
pub struct DriveConfig {
    pub folder_id: Option<String>,
    /// Inline service-account key; preferred over `credentials_file`.
    pub credentials_json: Option<String>,
    pub credentials_file: PathBuf,
}

impl DriveConfig {
    fn from_env() -> Self {
        Self {
            folder_id: var("GOOGLE_DRIVE_FOLDER_ID"),
            credentials_json: var("GOOGLE_CREDENTIAL_JSON"),
            credentials_file: var("GOOGLE_CREDENTIAL_FILE")
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_FILE.to_string())
                .into(),
        }
    }
}

impl fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveConfig")
            .field("folder_id", &self.folder_id)
            .field(
                "credentials_json",
                &self.credentials_json.as_ref().map(|_| "<redacted>"),
            )
            .field("credentials_file", &self.credentials_file)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RatingsConfig {
    /// Employee record linked to online ratings.
    pub agent_record_id: Option<String>,
}

/// Trimmed value of `key`; blank counts as unset.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT/PORT must be a port number, got '{value}'")]
    InvalidPort { value: String },
    #[error("APP_HOST must be an IP address or localhost, got '{value}'")]
    InvalidHost {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 12] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "PORT",
        "APP_LOG_LEVEL",
        "AIRTABLE_API_KEY",
        "AIRTABLE_BASE_ID",
        "AIRTABLE_API_URL",
        "GOOGLE_DRIVE_FOLDER_ID",
        "GOOGLE_CREDENTIAL_JSON",
        "GOOGLE_CREDENTIAL_FILE",
        "RATING_AGENT_RECORD_ID",
    ];

    /// Runs `check` against a clean environment holding only `vars`.
    fn with_env(vars: &[(&str, &str)], check: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in KEYS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        check();
        for (key, _) in vars {
            env::remove_var(key);
        }
    }

    #[test]
    fn defaults_leave_backends_unconfigured() {
        with_env(&[], || {
            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.environment, AppEnvironment::Development);
            assert_eq!(config.server.port, DEFAULT_PORT);
            assert_eq!(config.telemetry.log_level, "info");
            assert!(config.airtable.is_none());
            assert!(config.drive.folder_id.is_none());
            assert_eq!(
                config.drive.credentials_file,
                PathBuf::from("service-account.json")
            );
            assert_eq!(config.ratings.agent_record_id, None);
        });
    }

    #[test]
    fn platform_port_is_a_fallback() {
        with_env(&[("PORT", "8080"), ("APP_ENV", "live")], || {
            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.environment, AppEnvironment::Production);
        });
        with_env(&[("PORT", "8080"), ("APP_PORT", "9000")], || {
            assert_eq!(AppConfig::load().expect("config loads").server.port, 9000);
        });
    }

    #[test]
    fn localhost_binds_loopback() {
        with_env(&[("APP_HOST", "localhost")], || {
            let addr = AppConfig::load()
                .expect("config loads")
                .server
                .socket_addr()
                .expect("localhost resolves");
            assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
        });

        let server = ServerConfig {
            host: "portal.example".to_string(),
            port: 80,
        };
        assert!(matches!(
            server.socket_addr(),
            Err(ConfigError::InvalidHost { .. })
        ));
    }

    #[test]
    fn airtable_needs_key_and_base() {
        with_env(&[("AIRTABLE_API_KEY", "key-123")], || {
            assert!(AppConfig::load().expect("config loads").airtable.is_none());
        });
        with_env(
            &[("AIRTABLE_API_KEY", "key-123"), ("AIRTABLE_BASE_ID", " app456 ")],
            || {
                let airtable = AppConfig::load()
                    .expect("config loads")
                    .airtable
                    .expect("airtable configured");
                assert_eq!(airtable.base_id, "app456");
                assert_eq!(airtable.api_url, DEFAULT_AIRTABLE_API_URL);
                assert!(!format!("{airtable:?}").contains("key-123"));
            },
        );
    }

    #[test]
    fn malformed_port_is_rejected() {
        with_env(&[("APP_PORT", "not-a-port")], || {
            let error = AppConfig::load().expect_err("port rejected");
            assert!(matches!(error, ConfigError::InvalidPort { ref value } if value == "not-a-port"));
        });
    }
}
