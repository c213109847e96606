//! Database module providing the persistence collaborator for the pairing core.
//!
//! This module manages the PostgreSQL connection pool using sqlx, the
//! embedded schema migrations, and the [`TournamentRepository`] trait with its
//! PostgreSQL and in-memory implementations.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::{ConfigError, DatabaseConfig};
pub use errors::{RepositoryError, RepositoryResult};
pub use memory::MemoryTournamentRepository;
pub use repository::{PgTournamentRepository, TournamentRepository};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    query_timeout: Duration,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Returns
    ///
    /// * `Result<Database, sqlx::Error>` - Database instance or error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use swiss_pairing::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::from_env()?;
    ///     let db = Database::new(&config).await?;
    ///     db.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "Connected to database (pool {}..={})",
            config.min_connections,
            config.max_connections
        );

        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Build the tournament repository over this pool
    pub fn tournament_repository(&self) -> PgTournamentRepository {
        PgTournamentRepository::new(self.pool.clone()).with_query_timeout(self.query_timeout)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Check if the database connection is healthy
    ///
    /// # Returns
    ///
    /// * `Result<(), sqlx::Error>` - Ok if healthy, error otherwise
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
