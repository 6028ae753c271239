use anyhow::{anyhow, Result};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Embedded SQL migrations for the evento schema
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies per-connection pragmas when r2d2 opens a connection
///
/// SQLite disables foreign key enforcement by default and the setting does not
/// persist, so every pooled connection turns it on before first use.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool for the given SQLite URL
///
/// ### Errors
///
/// Returns an error if the pool cannot open its initial connections.
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    debug!("Opening connection pool for {}", database_url);
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;
    Ok(pool)
}

/// Runs the embedded migrations against one connection from the pool
///
/// ### Errors
///
/// Returns an error if a connection cannot be acquired or a migration fails.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    info!("Applied {} pending migrations", applied.len());
    Ok(())
}
