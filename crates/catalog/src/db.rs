//! Opening the catalog database.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Pool size for catalogs on disk. WAL lets readers run alongside the single
/// writer, so a few connections are enough.
const POOL_SIZE: u32 = 4;
/// How long a writer waits for another writer to finish. Writers hold the lock
/// for a whole import (file placement included), so this is as long as SQLite
/// allows: concurrent imports queue up instead of failing.
const WRITER_WAIT: Duration = Duration::from_millis(i32::MAX as u64);
/// Run on every new pooled connection; these aren't available through
/// `SqliteConnectOptions`.
const CONNECTION_PRAGMAS: &str = "PRAGMA cache_size = -8192; PRAGMA temp_store = MEMORY;";

/// How eagerly SQLite flushes writes to disk.
///
/// Imports write a handful of rows per file, and a large import is dominated
/// by fsync calls under [`Strict`](Self::Strict). [`Relaxed`](Self::Relaxed)
/// turns syncing off entirely: much faster, but committed data can be lost on
/// a power failure or OS crash (not on an application crash).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// `PRAGMA synchronous = OFF`
    #[default]
    Relaxed,
    /// `PRAGMA synchronous = FULL`
    Strict,
}
impl From<Durability> for SqliteSynchronous {
    fn from(durability: Durability) -> Self {
        match durability {
            Durability::Relaxed => SqliteSynchronous::Off,
            Durability::Strict => SqliteSynchronous::Full,
        }
    }
}

/// A migrated catalog database.
///
/// Every connection runs in WAL mode with foreign keys (and so the cascading
/// deletes between books, files and their links) enforced.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the catalog at `path`, creating and migrating it as needed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>, durability: Durability) -> Result<Self> {
        let options = options(durability).filename(path.as_ref()).create_if_missing(true);
        Self::open(options, POOL_SIZE).await
    }

    /// Open a fresh, empty catalog that lives only as long as this handle.
    ///
    /// Not test-only: the other crates' tests run against it too. Every
    /// `:memory:` connection would be a separate database, so the pool holds
    /// exactly one; nothing else can run against it while a
    /// [`StagedImport`](crate::StagedImport) is alive.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(options(Durability::Relaxed).filename(":memory:"), 1).await
    }

    async fn open(options: SqliteConnectOptions, size: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(size)
            .acquire_timeout(WRITER_WAIT)
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let catalog = Self { pool };
        catalog.migrate().await?;
        Ok(catalog)
    }

    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(CONNECTION_PRAGMAS).execute(conn).await?;
        Ok(())
    }

    #[instrument("migrating catalog", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for every connection to be returned, then close the pool.
    pub async fn close(&self) {
        // Refresh planner statistics; a failure here changes nothing.
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

fn options(durability: Durability) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(durability.into())
        .foreign_keys(true)
        .busy_timeout(WRITER_WAIT)
}
