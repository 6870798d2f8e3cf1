use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "data/cline.db";
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub db_path: PathBuf,
    pub ping_interval_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("MCP_PING_INTERVAL_SECS must be a positive integer")]
    InvalidPingInterval,
    #[error("MCP_DB_PATH must not be empty")]
    EmptyDbPath,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = read("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = read("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);
        let db_path = match lookup("MCP_DB_PATH") {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::EmptyDbPath),
            Some(value) => PathBuf::from(value.trim()),
            None => PathBuf::from(DEFAULT_DB_PATH),
        };
        let ping_interval_secs = read("MCP_PING_INTERVAL_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidPingInterval)
            })
            .transpose()?
            .unwrap_or(DEFAULT_PING_INTERVAL_SECS);

        let config = Self {
            bind_addr,
            bind_port,
            db_path,
            ping_interval_secs,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}
