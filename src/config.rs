use std::env;
use std::num::NonZeroU32;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Only the database-backed commands need this.
    pub database_url: Option<String>,
    pub log_level: String,
    /// Raw `DB_MAX_CONNECTIONS`; validated by [`AppConfig::max_connections`].
    pub pool_size: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            log_level: get_var_or("LOG_LEVEL", "info"),
            pool_size: get_var_or("DB_MAX_CONNECTIONS", "5"),
        }
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to the SprintIQ Postgres instance")
    }

    pub fn max_connections(&self) -> anyhow::Result<NonZeroU32> {
        self.pool_size
            .trim()
            .parse()
            .with_context(|| {
                format!(
                    "DB_MAX_CONNECTIONS must be a positive integer, got '{}'",
                    self.pool_size
                )
            })
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
