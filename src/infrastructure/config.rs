use std::collections::HashMap;
use thiserror::Error;

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "postgres";
const DEFAULT_DB_NAME: &str = "postgres";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
    #[error("STORE_BACKEND must be \"postgres\" or \"memory\", got {0:?}")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
    /// Full connection URL; takes precedence over the individual fields.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub backend: StoreBackend,
}

impl AppConfig {
    /// Reads configuration from the process environment, after loading `.env`
    /// if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| -> String {
            vars.get(name)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        // Postgres unless explicitly asked for the in-memory store
        let backend = match vars.get("STORE_BACKEND").map(String::as_str) {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            database: DatabaseConfig {
                host: get("DB_HOST", DEFAULT_DB_HOST),
                user: get("DB_USER", DEFAULT_DB_USER),
                password: get("DB_PASSWORD", DEFAULT_DB_PASSWORD),
                name: get("DB_NAME", DEFAULT_DB_NAME),
                port: parse_port(vars, "DB_PORT", DEFAULT_DB_PORT)?,
                url: vars.get("DATABASE_URL").cloned(),
            },
            server: ServerConfig {
                host: get("SERVER_HOST", DEFAULT_SERVER_HOST),
                port: parse_port(vars, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            },
            backend,
        })
    }
}

fn parse_port(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: u16,
) -> Result<u16, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
            name,
            value: value.clone(),
        }),
    }
}
