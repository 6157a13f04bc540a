//! Coadd Registry - incremental index of SDSS coadd pieces
//!
//! Walks directory trees of `fpC-*_ts_coaddNorm_NN.fit.gz` coadd pieces,
//! recognizes run, filter, camcol and field from each file name, and appends
//! one `raw` row per new piece to a SQLite registry.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Seed loader │────▶│  Done keys  │────▶│   Ingester   │────▶│  Registry   │
//! │ (-i copy)   │     │ (snapshot)  │     │ (recognizer) │     │  (SQLite)   │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! The registry is finalized (sky-tile indexes, last commit) on every exit
//! path once it has been opened.

pub mod builder;
pub mod error;
pub mod ingest;
pub mod recognizer;
pub mod seed;

/// Registry file name used when no output is given.
pub const DEFAULT_OUTPUT_REGISTRY: &str = "registry.sqlite3";

/// Appends per intermediate commit within one filter directory.
pub const COMMIT_INTERVAL: usize = 100;

pub use builder::{build_registry, BuildConfig, BuildSummary};
pub use error::{RegistryError, Result};
pub use ingest::BandReport;
pub use recognizer::{recognize, Mismatch, Recognition};
