//! Batch durability across reopen.

use coadd_registry_db::{Filter, FrameId, RegistryDb, SKY_TILE_ID_INDEX, SKY_TILE_TILE_INDEX};
use tempfile::TempDir;

fn frame(field: u16) -> FrameId {
    FrameId {
        run: 2505,
        filter: Filter::Z,
        camcol: 6,
        field,
    }
}

#[tokio::test]
async fn test_committed_batches_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("registry.sqlite3");

    let mut db = RegistryDb::initialize_fresh(&path).await.unwrap();
    for field in 0..3 {
        db.append_entry(&frame(field)).await.unwrap();
    }
    db.commit_batch().await.unwrap();
    assert_eq!(db.pending(), 0);
    db.append_entry(&frame(3)).await.unwrap();
    db.finalize().await.unwrap();

    let mut reopened = RegistryDb::open_existing(&path).await.unwrap();
    assert_eq!(reopened.count_entries().await.unwrap(), 4);
    let ids: Vec<i64> = reopened
        .list_entries()
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(
        reopened.index_names("raw_skyTile").await.unwrap(),
        vec![SKY_TILE_ID_INDEX, SKY_TILE_TILE_INDEX]
    );
    reopened.close().await;
}

#[tokio::test]
async fn test_uncommitted_batch_is_lost_on_close() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("registry.sqlite3");

    let mut db = RegistryDb::initialize_fresh(&path).await.unwrap();
    db.append_entry(&frame(1)).await.unwrap();
    db.commit_batch().await.unwrap();
    db.append_entry(&frame(2)).await.unwrap();
    db.close().await;

    let mut reopened = RegistryDb::open_existing(&path).await.unwrap();
    assert_eq!(reopened.count_entries().await.unwrap(), 1);
    reopened.close().await;
}

#[tokio::test]
async fn test_seeded_copy_keeps_prior_ids() {
    let tmp = TempDir::new().unwrap();
    let prior = tmp.path().join("prior.sqlite3");
    let next = tmp.path().join("next.sqlite3");

    let mut db = RegistryDb::initialize_fresh(&prior).await.unwrap();
    db.append_entry(&frame(10)).await.unwrap();
    db.finalize().await.unwrap();

    let mut seeded = RegistryDb::seed_from(&prior, &next).await.unwrap();
    let keys = seeded.load_existing_keys().await.unwrap();
    assert!(keys.contains("2505_Bz_C6_F10"));
    let id = seeded.append_entry(&frame(11)).await.unwrap();
    assert_eq!(id, 2);
    seeded.finalize().await.unwrap();

    let mut prior_db = RegistryDb::open_existing(&prior).await.unwrap();
    assert_eq!(prior_db.count_entries().await.unwrap(), 1);
    prior_db.close().await;
}
