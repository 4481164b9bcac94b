//! Service configuration

use infra_db::DatabaseConfig;
use serde::Deserialize;

/// Ledger service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Database URL
    pub database_url: String,
    /// Maximum database connections
    pub max_connections: u32,
    /// Log level
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/clinic".to_string(),
            max_connections: 10,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from the environment
    ///
    /// Variables are prefixed with `LEDGER`, e.g. `LEDGER_DATABASE_URL`.
    /// A `.env` file is read first when present.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::Environment::with_prefix("LEDGER"))
            .build()?
            .try_deserialize()
    }

    /// The pool configuration for this service
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url).max_connections(self.max_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();

        assert_eq!(config.database_url, "postgres://localhost/clinic");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_database_config_carries_url_and_pool_size() {
        let config = ServiceConfig {
            database_url: "postgres://db/clinic".to_string(),
            max_connections: 3,
            log_level: "debug".to_string(),
        };

        let db = config.database_config();
        assert_eq!(db.url, "postgres://db/clinic");
        assert_eq!(db.max_connections, 3);
    }
}
