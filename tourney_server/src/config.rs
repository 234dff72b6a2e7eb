//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};
use tourney::db::{DatabaseConfig, DatabaseConfigError};

/// Address used when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::LOCALHOST, 6969));

/// Where tournaments, entries and matches are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// PostgreSQL through `DATABASE_URL`
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageMode::Memory),
            "postgres" | "postgresql" => Ok(StorageMode::Postgres),
            other => Err(ConfigError::Invalid {
                var: "STORAGE".to_string(),
                reason: format!("expected 'memory' or 'postgres', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Memory => f.write_str("memory"),
            StorageMode::Postgres => f.write_str("postgres"),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Storage backend
    pub storage: StorageMode,
    /// Database configuration, present in Postgres mode
    pub database: Option<DatabaseConfig>,
    /// Per-request timeout for completion webhooks
    pub webhook_timeout: Duration,
    /// Prometheus scrape listener, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Command line values that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub storage: Option<StorageMode>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but can't be parsed, or if
    /// Postgres storage is selected without a database URL
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let storage = match overrides.storage {
            Some(storage) => storage,
            None => match std::env::var("STORAGE") {
                Ok(value) => value.parse()?,
                Err(_) => StorageMode::default(),
            },
        };

        let database_url = overrides
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok());

        let database = match (storage, database_url) {
            (StorageMode::Postgres, Some(url)) => Some(DatabaseConfig::from_env_with_url(url)?),
            (StorageMode::Postgres, None) => {
                return Err(ConfigError::MissingRequired {
                    var: "DATABASE_URL".to_string(),
                    hint: "Set it or pass --db-url when STORAGE=postgres".to_string(),
                });
            }
            (StorageMode::Memory, _) => None,
        };

        let webhook_timeout = Duration::from_secs(parse_env("WEBHOOK_TIMEOUT_SECS")?.unwrap_or(5));
        let metrics_bind = parse_env("METRICS_BIND")?;

        Ok(ServerConfig {
            bind,
            storage,
            database,
            webhook_timeout,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "WEBHOOK_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        match (&self.storage, &self.database) {
            (StorageMode::Postgres, None) => Err(ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Postgres storage needs a connection string".to_string(),
            }),
            (StorageMode::Postgres, Some(db)) if db.connection_timeout_secs == 0 => {
                Err(ConfigError::Invalid {
                    var: "DB_CONNECTION_TIMEOUT".to_string(),
                    reason: "Must be greater than 0".to_string(),
                })
            }
            (StorageMode::Postgres, Some(db)) if db.min_connections > db.max_connections => {
                Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed DB_MAX_CONNECTIONS ({})",
                        db.max_connections
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error(transparent)]
    Database(#[from] DatabaseConfigError),
}

/// Parse an optional environment variable, rejecting unparseable values
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("could not parse '{value}'"),
        }),
        Err(_) => Ok(None),
    }
}
