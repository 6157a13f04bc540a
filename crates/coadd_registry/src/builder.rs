//! End-to-end registry build.

use crate::error::Result;
use crate::ingest::{band_dirs, ingest_band, BandReport};
use crate::seed::{open_registry, DoneKeys};
use crate::{COMMIT_INTERVAL, DEFAULT_OUTPUT_REGISTRY};
use coadd_registry_db::RegistryDb;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inputs of one registry build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Roots holding one directory per filter.
    pub input_dirs: Vec<PathBuf>,
    /// Prior registry to seed from and deduplicate against.
    pub input_registry: Option<PathBuf>,
    /// Registry file to create. Must not exist yet.
    pub output_registry: PathBuf,
    /// Appends per intermediate commit within one filter directory.
    pub commit_interval: usize,
}

impl BuildConfig {
    pub fn new(input_dirs: Vec<PathBuf>) -> Self {
        Self {
            input_dirs,
            input_registry: None,
            output_registry: PathBuf::from(DEFAULT_OUTPUT_REGISTRY),
            commit_interval: COMMIT_INTERVAL,
        }
    }

    pub fn with_input_registry(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_registry = Some(path.into());
        self
    }

    pub fn with_output_registry(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_registry = path.into();
        self
    }
}

/// Per-directory reports of a finished build, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub bands: Vec<BandReport>,
}

impl BuildSummary {
    pub fn processed(&self) -> u64 {
        self.bands.iter().map(|b| b.processed).sum()
    }

    pub fn skipped(&self) -> u64 {
        self.bands.iter().map(|b| b.skipped).sum()
    }

    pub fn unrecognized(&self) -> u64 {
        self.bands.iter().map(|b| b.unrecognized).sum()
    }
}

/// Build (or extend) a registry from the configured input directories.
///
/// Once the registry is open, it is finalized (sky-tile indexes plus a last
/// commit) whether or not ingestion succeeds. An ingestion error takes
/// precedence over a finalize error.
pub async fn build_registry(config: &BuildConfig) -> Result<BuildSummary> {
    let (mut db, done) =
        open_registry(config.input_registry.as_deref(), &config.output_registry).await?;

    let ingested = ingest_dirs(&mut db, &config.input_dirs, &done, config.commit_interval).await;

    info!("Cleaning up...");
    let finalized = db.finalize().await;

    let summary = match (ingested, finalized) {
        (Ok(summary), Ok(())) => summary,
        (Ok(_), Err(err)) => return Err(err.into()),
        (Err(err), finalized) => {
            if let Err(finalize_err) = finalized {
                warn!(error = %finalize_err, "Finalize failed after ingestion error");
            }
            return Err(err.into());
        }
    };

    info!(
        output = %config.output_registry.display(),
        directories = summary.bands.len(),
        processed = summary.processed(),
        skipped = summary.skipped(),
        unrecognized = summary.unrecognized(),
        "Registry build complete"
    );
    Ok(summary)
}

async fn ingest_dirs(
    db: &mut RegistryDb,
    roots: &[PathBuf],
    done: &DoneKeys,
    commit_interval: usize,
) -> coadd_registry_db::Result<BuildSummary> {
    let mut summary = BuildSummary::default();
    for root in roots {
        ingest_root(db, root, done, commit_interval, &mut summary).await?;
    }
    Ok(summary)
}

async fn ingest_root(
    db: &mut RegistryDb,
    root: &Path,
    done: &DoneKeys,
    commit_interval: usize,
    summary: &mut BuildSummary,
) -> coadd_registry_db::Result<()> {
    let bands = band_dirs(root);
    if bands.is_empty() {
        warn!("{}: no filter directories found", root.display());
    }
    for band in bands {
        let report = ingest_band(db, &band, done, commit_interval).await?;
        summary.bands.push(report);
    }
    Ok(())
}
