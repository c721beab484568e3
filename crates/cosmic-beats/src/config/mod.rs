use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage the engine runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Runtime settings, read from the process environment after `.env` is applied.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub schema: SchemaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: var("APP_ENV")
                .map(|raw| AppEnvironment::parse(&raw))
                .unwrap_or_default(),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig::from_env(),
            schema: SchemaConfig::from_env()?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    /// Bind address; `localhost` maps to the IPv4 loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost {
                value: self.host.clone(),
                source,
            })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl TelemetryConfig {
    fn from_env() -> Self {
        Self {
            log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

/// Where the role schemas come from. `None` keeps the built-in registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaConfig {
    pub path: Option<PathBuf>,
}

impl SchemaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let path = match var("APP_SCHEMA_PATH") {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptySchemaPath),
            Some(raw) => Some(PathBuf::from(raw.trim())),
            None => None,
        };
        Ok(Self { path })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT '{value}' is not a valid port number")]
    InvalidPort { value: String },
    #[error("APP_HOST '{value}' is not an IPv4 or IPv6 address")]
    InvalidHost {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("APP_SCHEMA_PATH is set but empty")]
    EmptySchemaPath,
}
