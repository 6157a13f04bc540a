//! Per-filter directory ingestion.

use crate::recognizer::{recognize, Recognition};
use coadd_registry_db::{RegistryDb, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Counters for one per-filter directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandReport {
    pub dir: PathBuf,
    /// Pieces appended to the registry.
    pub processed: u64,
    /// Pieces already listed in the seed registry.
    pub skipped: u64,
    /// Files that do not follow the piece grammar.
    pub unrecognized: u64,
}

impl BandReport {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            processed: 0,
            skipped: 0,
            unrecognized: 0,
        }
    }
}

/// Immediate children of an input root, each treated as a per-filter directory.
///
/// Entries are not checked to be directories or filter names; a plain file
/// simply yields an empty report later. A root that cannot be listed
/// contributes nothing.
pub fn band_dirs(root: &Path) -> Vec<PathBuf> {
    list_children(root)
        .into_iter()
        .map(|entry| entry.into_path())
        .collect()
}

/// Regular files directly inside a per-filter directory, in name order.
pub fn band_files(band_dir: &Path) -> Vec<PathBuf> {
    list_children(band_dir)
        .into_iter()
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn list_children(dir: &Path) -> Vec<DirEntry> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    let mut children = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => children.push(entry),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "Cannot list directory entry");
            }
        }
    }
    children
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}

/// Ingest every piece in one per-filter directory.
///
/// Pieces whose key is in `done` are skipped. `done` is never updated here,
/// so a piece seen twice in one build is appended twice. The open batch is
/// committed after every `commit_interval` appends and once more at the end.
/// Unrecognized files are counted and skipped; storage errors propagate.
pub async fn ingest_band(
    db: &mut RegistryDb,
    band_dir: &Path,
    done: &HashSet<String>,
    commit_interval: usize,
) -> Result<BandReport> {
    let commit_interval = commit_interval.max(1) as u64;
    let mut report = BandReport::new(band_dir);
    info!("{} ... started", band_dir.display());

    for path in band_files(band_dir) {
        let frame = match recognize(&path) {
            Recognition::Frame(frame) => frame,
            Recognition::Unrecognized(reason) => {
                warn!(%reason, "Unrecognized file: {}", path.display());
                report.unrecognized += 1;
                continue;
            }
        };

        let key = frame.key();
        if done.contains(&key) {
            debug!(%key, "Already registered");
            report.skipped += 1;
            continue;
        }

        db.append_entry(&frame).await?;
        report.processed += 1;
        if report.processed % commit_interval == 0 {
            db.commit_batch().await?;
        }
    }

    db.commit_batch().await?;
    info!(
        "{} ... {} processed, {} skipped, {} unrecognized",
        band_dir.display(),
        report.processed,
        report.skipped,
        report.unrecognized
    );
    Ok(report)
}
