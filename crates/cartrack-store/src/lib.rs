//! Flat-file table store for cartrack.
//!
//! Every table is a CSV file with a fixed header row. Callers never touch rows
//! individually: [`TableStore::load_table`] reads a whole table and
//! [`TableStore::replace_table`] writes a whole table, copying the previous
//! file to a `.backup` sidecar first and copying it back if the write fails.
//! File locations come from [`StoreConfig`]; raw byte I/O goes through the
//! [`TableMedium`] trait so the protocol can run over other media in tests.

pub mod codec;
pub mod layout;
pub mod medium;
pub mod table;

pub use layout::{StoreConfig, DEFAULT_BACKUP_SUFFIX};
pub use medium::{FsMedium, TableMedium};
pub use table::{Record, TableId, TableStore};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory so that a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("table encoding error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to back up table '{table}': {source}")]
    BackupFailed {
        table: TableId,
        source: std::io::Error,
    },
    #[error("failed to write table '{table}': {source}")]
    WriteFailed {
        table: TableId,
        source: std::io::Error,
    },
}
