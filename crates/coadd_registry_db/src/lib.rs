//! Catalog store for the coadd registry
//!
//! A registry is a single SQLite file holding one `raw` row per recognized
//! coadd piece plus the (externally populated) `raw_skyTile` association
//! table. Rows are only ever appended.
//!
//! # Usage
//!
//! ```rust,ignore
//! use coadd_registry_db::{Filter, FrameId, RegistryDb};
//!
//! let mut db = RegistryDb::initialize_fresh("registry.sqlite3").await?;
//! db.append_entry(&FrameId { run: 1234, filter: Filter::R, camcol: 5, field: 42 }).await?;
//! db.commit_batch().await?;
//! db.finalize().await?;
//! ```

mod error;
mod raw;
mod schema;
mod types;

pub use error::{DbError, Result};
pub use schema::{SKY_TILE_ID_INDEX, SKY_TILE_TILE_INDEX};
pub use types::*;

use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteRow,
};
use sqlx::{Sqlite, Transaction};
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle on one registry file.
///
/// The pool is capped at a single connection: the registry has exactly one
/// writer for the lifetime of a build. Appends accumulate in one open
/// transaction until [`RegistryDb::commit_batch`].
pub struct RegistryDb {
    path: PathBuf,
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    pending: usize,
}

impl RegistryDb {
    /// Create a new registry with empty `raw` and `raw_skyTile` tables.
    ///
    /// Fails with [`DbError::AlreadyExists`] if anything exists at `path`.
    pub async fn initialize_fresh(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.try_exists()? {
            return Err(DbError::already_exists(path));
        }

        let db = Self::connect(path, true).await?;
        db.create_tables().await?;

        info!(path = %path.display(), "Registry created");
        Ok(db)
    }

    /// Start a registry as a byte-for-byte copy of `prior`.
    ///
    /// Every row of the prior catalog, sky-tile associations included,
    /// carries over. Fails with [`DbError::NotFound`] if `prior` is missing
    /// and [`DbError::AlreadyExists`] if `path` is taken.
    pub async fn seed_from(prior: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<Self> {
        let prior = prior.as_ref();
        let path = path.as_ref();
        if path.try_exists()? {
            return Err(DbError::already_exists(path));
        }
        if !prior.try_exists()? {
            return Err(DbError::not_found(prior));
        }

        let bytes = tokio::fs::copy(prior, path).await?;
        let db = Self::connect(path, false).await?;

        info!(
            prior = %prior.display(),
            path = %path.display(),
            bytes,
            "Registry seeded from prior catalog"
        );
        Ok(db)
    }

    /// Open an existing registry (fails if not exists).
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.try_exists()? {
            return Err(DbError::not_found(path));
        }
        Self::connect(path, false).await
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        // Rollback journal keeps the registry a single self-contained file.
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Delete);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self {
            path: path.to_path_buf(),
            pool,
            tx: None,
            pending: 0,
        })
    }

    /// Location of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of appends not yet committed.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Close the connection without building indexes.
    ///
    /// Uncommitted appends are rolled back.
    pub async fn close(mut self) {
        drop(self.tx.take());
        self.pool.close().await;
    }

    /// Open the write transaction if none is active.
    async fn transaction(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        self.tx
            .as_mut()
            .ok_or_else(|| DbError::invalid_state("write transaction unavailable"))
    }

    /// Run a read on the open transaction, or on the pool when none is active.
    ///
    /// The pool only has one connection, so reading through it while a
    /// transaction holds that connection would never be served.
    async fn fetch_all<'q>(
        &mut self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<Vec<SqliteRow>> {
        let rows = match self.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await?,
            None => query.fetch_all(&self.pool).await?,
        };
        Ok(rows)
    }
}
