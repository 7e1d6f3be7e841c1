pub mod assert;

use anyhow::{anyhow, Context};
use diesel::{
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection},
    SqliteConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use r2d2::PooledConnection;
use std::time::Duration;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

/// Write transactions are opened with `BEGIN IMMEDIATE`, so a writer
/// waits on `busy_timeout` instead of failing with SQLITE_BUSY.
impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: Duration::from_secs(5),
        }))
        .build(manager)
        .context("Failed to create pool")
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = get_db_conn(pool)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    for version in applied {
        log::info!("applied migration {}", version);
    }
    Ok(())
}

pub fn get_db_conn(pool: &DbPool) -> anyhow::Result<DbConn> {
    pool.get().context("DB connection")
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use tempfile::TempDir;

    /// A migrated database living in a temporary directory. The directory
    /// is removed when the value is dropped.
    pub struct TestDb {
        pub pool: DbPool,
        _dir: TempDir,
    }

    impl TestDb {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let url = dir.path().join("aura.db");
            let pool = build_pool(url.to_str().expect("utf-8 path"), 4).expect("pool");
            run_migrations(&pool).expect("migrations");
            Self { pool, _dir: dir }
        }

        pub fn conn(&self) -> DbConn {
            get_db_conn(&self.pool).expect("conn")
        }
    }
}
