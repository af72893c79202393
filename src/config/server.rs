//! HTTP server settings read from the environment.

use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use crate::errors::{Error, Result};
use tracing::{info, warn};

/// Listener and seeding settings for the API process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, e.g. `0.0.0.0`
    pub bind_addr: String,
    /// TCP port
    pub port: u16,
    /// TOML file with seed data for an empty database
    pub seed_file: String,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and `SEED_FILE`, falling back to defaults.
    pub fn load() -> Result<Self> {
        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "0.0.0.0")?,
            port: try_load("PORT", "8080")?,
            seed_file: try_load("SEED_FILE", "seed.toml")?,
        })
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid bind address {}:{}: {e}", self.bind_addr, self.port),
            })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        Error::Config {
            message: format!("Invalid {key} value '{raw}': {e}"),
        }
    })
}
