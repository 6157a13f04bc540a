//! Registry build errors.

use coadd_registry_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a registry build.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The output registry is already present; it is never overwritten.
    #[error("Output registry exists; will not overwrite: {}", .0.display())]
    OutputExists(PathBuf),

    /// The registry to seed from is missing.
    #[error("Input registry does not exist: {}", .0.display())]
    InputRegistryMissing(PathBuf),

    /// Filesystem error while checking paths.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog store failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
