//! Opening the output registry, optionally seeded from a prior one.

use crate::error::{RegistryError, Result};
use coadd_registry_db::RegistryDb;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Keys of pieces already registered before this build.
pub type DoneKeys = HashSet<String>;

/// Open the output registry and collect the keys it already holds.
///
/// Without `input`, a fresh registry is created and the key set is empty.
/// With `input`, the prior registry is copied to `output` and its keys are
/// loaded. The output check runs first, so an existing output is reported
/// even when `input` is also missing, and neither file is touched.
pub async fn open_registry(input: Option<&Path>, output: &Path) -> Result<(RegistryDb, DoneKeys)> {
    if output.try_exists()? {
        return Err(RegistryError::OutputExists(output.to_path_buf()));
    }

    let Some(input) = input else {
        let db = RegistryDb::initialize_fresh(output).await?;
        return Ok((db, DoneKeys::new()));
    };

    if !input.try_exists()? {
        return Err(RegistryError::InputRegistryMissing(input.to_path_buf()));
    }

    let mut db = RegistryDb::seed_from(input, output).await?;
    let done = match db.load_existing_keys().await {
        Ok(done) => done,
        Err(err) => {
            // Leave no unreadable copy behind.
            db.close().await;
            if let Err(remove_err) = tokio::fs::remove_file(output).await {
                warn!(
                    output = %output.display(),
                    error = %remove_err,
                    "Failed to remove unreadable seed copy"
                );
            }
            return Err(err.into());
        }
    };

    info!(
        input = %input.display(),
        registered = done.len(),
        "Seeded from input registry"
    );
    Ok((db, done))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coadd_registry_db::{Filter, FrameId};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fresh_registry_has_no_keys() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("registry.sqlite3");

        let (db, done) = open_registry(None, &output).await.unwrap();
        assert!(done.is_empty());
        assert!(output.exists());
        db.close().await;
    }

    #[tokio::test]
    async fn test_output_check_precedes_input_check() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("registry.sqlite3");
        std::fs::write(&output, b"old").unwrap();

        let result = open_registry(Some(&tmp.path().join("missing.sqlite3")), &output).await;
        assert!(matches!(result, Err(RegistryError::OutputExists(_))));
        assert_eq!(std::fs::read(&output).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_missing_input_registry() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("registry.sqlite3");

        let result = open_registry(Some(&tmp.path().join("missing.sqlite3")), &output).await;
        assert!(matches!(result, Err(RegistryError::InputRegistryMissing(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_seeded_registry_keys() {
        let tmp = TempDir::new().unwrap();
        let prior = tmp.path().join("prior.sqlite3");
        let mut db = RegistryDb::initialize_fresh(&prior).await.unwrap();
        db.append_entry(&FrameId {
            run: 94,
            filter: Filter::G,
            camcol: 4,
            field: 211,
        })
        .await
        .unwrap();
        db.finalize().await.unwrap();

        let output = tmp.path().join("registry.sqlite3");
        let (db, done) = open_registry(Some(&prior), &output).await.unwrap();
        assert_eq!(done.len(), 1);
        assert!(done.contains("94_Bg_C4_F211"));
        db.close().await;
    }

    #[tokio::test]
    async fn test_unreadable_seed_leaves_no_output() {
        let tmp = TempDir::new().unwrap();
        let prior = tmp.path().join("not-a-registry.sqlite3");
        let mut db = RegistryDb::initialize_fresh(&prior).await.unwrap();
        db.finalize().await.unwrap();

        // A valid SQLite file without a raw table.
        let pool = sqlx::SqlitePool::connect_with(
            sqlx::sqlite::SqliteConnectOptions::new().filename(&prior),
        )
        .await
        .unwrap();
        sqlx::query("DROP TABLE raw").execute(&pool).await.unwrap();
        pool.close().await;

        let output = tmp.path().join("registry.sqlite3");
        let result = open_registry(Some(&prior), &output).await;
        assert!(matches!(result, Err(RegistryError::Db(_))));
        assert!(!output.exists());

        // The next attempt is not blocked by a leftover copy.
        let result = open_registry(Some(&prior), &output).await;
        assert!(matches!(result, Err(RegistryError::Db(_))));
    }
}
