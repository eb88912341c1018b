use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::DbPool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Builds the connection pool. An in-memory database only exists for the
/// lifetime of its connection, so `:memory:` gets a single pooled connection.
pub fn build_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let mut builder = r2d2::Pool::builder().connection_customizer(Box::new(SqlitePragmas));
    if database_url == ":memory:" {
        builder = builder.max_size(1);
    }
    let pool = builder.build(manager)?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    for version in applied {
        tracing::info!("Applied migration {}", version);
    }
    Ok(())
}

/// Fresh in-memory database with the schema applied.
pub fn memory_pool() -> anyhow::Result<DbPool> {
    let pool = build_pool(":memory:")?;
    run_migrations(&pool)?;
    Ok(pool)
}
