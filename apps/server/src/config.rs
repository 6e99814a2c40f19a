//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Variables
    /// | Variable        | Default      |
    /// |-----------------|--------------|
    /// | `TALLY_PORT`    | `8080`       |
    /// | `TALLY_DB_PATH` | `tally.db`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("TALLY_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_PORT".to_string()))?,
            Err(_) => 8080,
        };

        let database_path = env::var("TALLY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tally.db"));

        Ok(AppConfig {
            port,
            database_path,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Env vars are process-global; only assert the fallback path when
        // nothing external set them.
        if env::var("TALLY_PORT").is_err() && env::var("TALLY_DB_PATH").is_err() {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.database_path, PathBuf::from("tally.db"));
        }
    }
}
