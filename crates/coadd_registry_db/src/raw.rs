//! `raw` table operations: append, commit, and key extraction.

use crate::error::{DbError, Result};
use crate::types::{composite_key, Entry, Filter, FrameId};
use crate::RegistryDb;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl RegistryDb {
    /// Insert one `raw` row and return its assigned id.
    ///
    /// The row joins the open batch; nothing is durable until
    /// [`RegistryDb::commit_batch`]. Duplicates are not checked here.
    pub async fn append_entry(&mut self, frame: &FrameId) -> Result<i64> {
        let tx = self.transaction().await?;
        let result = sqlx::query("INSERT INTO raw (run, filter, camcol, field) VALUES (?, ?, ?, ?)")
            .bind(frame.run)
            .bind(frame.filter.as_str())
            .bind(frame.camcol)
            .bind(frame.field)
            .execute(&mut **tx)
            .await?;

        self.pending += 1;
        Ok(result.last_insert_rowid())
    }

    /// Commit the open batch. A no-op when nothing is pending.
    pub async fn commit_batch(&mut self) -> Result<()> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        let rows = std::mem::take(&mut self.pending);
        tx.commit().await?;

        debug!(path = %self.path.display(), rows, "Committed batch");
        Ok(())
    }

    /// Commit outstanding appends, build the sky-tile indexes, and close.
    ///
    /// Index creation is attempted even when the commit fails, so the file
    /// stays queryable over whatever was committed before. The first error
    /// encountered is returned.
    pub async fn finalize(mut self) -> Result<()> {
        let committed = self.commit_batch().await;
        if let Err(err) = &committed {
            warn!(path = %self.path.display(), error = %err, "Final commit failed");
        }

        let indexed = self.create_sky_tile_indexes().await;
        self.pool.close().await;

        committed?;
        indexed?;
        info!(path = %self.path.display(), "Registry finalized");
        Ok(())
    }

    /// Composite keys of every `raw` row, for deduplication.
    ///
    /// Rows with a NULL in any key column produce no key.
    pub async fn load_existing_keys(&mut self) -> Result<HashSet<String>> {
        let rows = self
            .fetch_all(sqlx::query("SELECT run, filter, camcol, field FROM raw"))
            .await?;

        let mut keys = HashSet::with_capacity(rows.len());
        for row in &rows {
            let run: Option<i64> = row.try_get("run")?;
            let filter: Option<String> = row.try_get("filter")?;
            let camcol: Option<i64> = row.try_get("camcol")?;
            let field: Option<i64> = row.try_get("field")?;
            if let (Some(run), Some(filter), Some(camcol), Some(field)) = (run, filter, camcol, field)
            {
                keys.insert(composite_key(run, &filter, camcol, field));
            }
        }

        info!(path = %self.path.display(), keys = keys.len(), "Loaded existing keys");
        Ok(keys)
    }

    /// Number of `raw` rows, committed or pending.
    pub async fn count_entries(&mut self) -> Result<i64> {
        let rows = self
            .fetch_all(sqlx::query("SELECT COUNT(*) AS n FROM raw"))
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| DbError::invalid_state("COUNT(*) returned no row"))?;
        Ok(row.try_get("n")?)
    }

    /// All `raw` rows in id order.
    pub async fn list_entries(&mut self) -> Result<Vec<Entry>> {
        let rows = self
            .fetch_all(sqlx::query(
                "SELECT id, run, filter, camcol, field FROM raw ORDER BY id",
            ))
            .await?;

        rows.iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
    let id: i64 = row.try_get("id")?;
    let run: i64 = row.try_get("run")?;
    let filter: String = row.try_get("filter")?;
    let camcol: i64 = row.try_get("camcol")?;
    let field: i64 = row.try_get("field")?;

    let out_of_range = |column: &str| DbError::invalid_state(format!("raw row {id}: {column} out of range"));
    Ok(Entry {
        id,
        frame: FrameId {
            run: u32::try_from(run).map_err(|_| out_of_range("run"))?,
            filter: Filter::parse(&filter).ok_or_else(|| {
                DbError::invalid_state(format!("raw row {id}: unknown filter '{filter}'"))
            })?,
            camcol: u8::try_from(camcol).map_err(|_| out_of_range("camcol"))?,
            field: u16::try_from(field).map_err(|_| out_of_range("field"))?,
        },
    })
}
