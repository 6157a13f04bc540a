//! Registry table and index definitions.
//!
//! All CREATE statements live here.

use crate::error::Result;
use crate::RegistryDb;
use sqlx::Row;
use tracing::{debug, info};

/// Index on `raw_skyTile(id)`.
pub const SKY_TILE_ID_INDEX: &str = "ix_skyTile_id";

/// Index on `raw_skyTile(skyTile)`.
pub const SKY_TILE_TILE_INDEX: &str = "ix_skyTile_tile";

impl RegistryDb {
    /// Create the `raw` and `raw_skyTile` tables of a fresh registry.
    ///
    /// Neither the composite key nor the sky-tile reference to `raw(id)` is
    /// declared as a constraint.
    pub(crate) async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE raw (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run INT,
                filter TEXT,
                camcol INT,
                field INT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE TABLE raw_skyTile (id INTEGER, skyTile INTEGER)")
            .execute(&self.pool)
            .await?;

        debug!(path = %self.path.display(), "Registry tables created");
        Ok(())
    }

    /// Build the sky-tile lookup indexes.
    ///
    /// A seeded registry usually carries them already from its prior run.
    pub(crate) async fn create_sky_tile_indexes(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON raw_skyTile (id)",
            SKY_TILE_ID_INDEX
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON raw_skyTile (skyTile)",
            SKY_TILE_TILE_INDEX
        ))
        .execute(&self.pool)
        .await?;

        info!(path = %self.path.display(), "Sky-tile indexes ready");
        Ok(())
    }

    /// Names of the indexes defined on `table`, sorted.
    pub async fn index_names(&mut self, table: &str) -> Result<Vec<String>> {
        let rows = self
            .fetch_all(
                sqlx::query(
                    "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ? ORDER BY name",
                )
                .bind(table.to_string()),
            )
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(Into::into))
            .collect()
    }
}
