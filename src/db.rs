use crate::config::Config;
use crate::error::ApiError;
use anyhow::{anyhow, Context, Result};
use diesel::prelude::*;
use diesel::PgConnection;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection = Object<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database manager holding the async connection pool
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Build the pool, verify connectivity and run pending migrations
    pub async fn new(config: &Config) -> Result<Self> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database.url);
        let pool = Pool::builder(manager)
            .max_size(config.database.max_connections as usize)
            .build()
            .context("failed to build database pool")?;

        let db = Self { pool };

        let _conn = db
            .get_connection()
            .await
            .map_err(|e| anyhow!("failed to connect to database: {e}"))?;
        info!("Successfully connected to the database");

        run_migrations(&config.database.url)?;

        Ok(db)
    }

    pub async fn get_connection(&self) -> Result<DbConnection, ApiError> {
        get_conn(&self.pool).await
    }

    pub fn get_pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Fetch a pooled connection, mapping pool exhaustion into the error taxonomy
pub async fn get_conn(pool: &DbPool) -> Result<DbConnection, ApiError> {
    pool.get()
        .await
        .map_err(|e| ApiError::Internal(anyhow!("failed to get database connection: {e}")))
}

/// Migrations run over a plain synchronous connection; diesel-async has no
/// migration harness of its own.
fn run_migrations(database_url: &str) -> Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .context("failed to open migration connection")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("failed to run migrations: {e}"))?;
    info!("Database migrations applied successfully");
    Ok(())
}

/// Initialize database connection pool and run migrations
pub async fn init_database(config: &Config) -> Result<Database> {
    Database::new(config).await
}
