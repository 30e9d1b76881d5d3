//! PostgreSQL-backed adapters for the catalog and the SQL agent

mod catalog;
mod executor;
mod introspect;

pub use catalog::PostgresCatalogRepository;
pub use executor::PgQueryExecutor;
pub use introspect::PgSchemaIntrospector;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Open a connection pool against the configured database
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.connect_url())
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}
