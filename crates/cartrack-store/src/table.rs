use crate::codec::{decode_rows, encode_rows};
use crate::layout::StoreConfig;
use crate::medium::{FsMedium, TableMedium};
use crate::StoreError;
use cartrack_schema::{Carton, Setting, Vehicle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

/// The three tables of the store, each with a fixed column schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    Settings,
    Vehicles,
    Cartons,
}

impl TableId {
    pub const ALL: [TableId; 3] = [TableId::Settings, TableId::Vehicles, TableId::Cartons];

    pub fn name(self) -> &'static str {
        match self {
            TableId::Settings => "Settings",
            TableId::Vehicles => "Vehicles",
            TableId::Cartons => "Cartons",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TableId::Settings => &["Setting", "Value"],
            TableId::Vehicles => &["ID", "Name"],
            TableId::Cartons => &[
                "ID",
                "Status",
                "VehicleID",
                "DateScanned",
                "DatePickedUp",
                "DateDelivered",
                "AdditionalData",
            ],
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            TableId::Settings => "settings.csv",
            TableId::Vehicles => "vehicles.csv",
            TableId::Cartons => "cartons.csv",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A row type bound to one table. Field serialization order must match
/// [`TableId::columns`].
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: TableId;
}

impl Record for Setting {
    const TABLE: TableId = TableId::Settings;
}

impl Record for Vehicle {
    const TABLE: TableId = TableId::Vehicles;
}

impl Record for Carton {
    const TABLE: TableId = TableId::Cartons;
}

/// Whole-table snapshot store.
///
/// There is no row-level access and no locking: two callers that load the
/// same table and both replace it race, and the last replace wins.
pub struct TableStore<M = FsMedium> {
    config: StoreConfig,
    medium: M,
}

impl TableStore<FsMedium> {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_medium(config, FsMedium)
    }
}

impl<M: TableMedium> TableStore<M> {
    pub fn with_medium(config: StoreConfig, medium: M) -> Self {
        Self { config, medium }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn table_exists(&self, table: TableId) -> bool {
        self.medium.exists(&self.config.table_path(table))
    }

    /// Load every row of `R`'s table.
    ///
    /// A missing or unreadable table yields an empty vector rather than an
    /// error.
    pub fn load_table<R: Record>(&self) -> Vec<R> {
        let path = self.config.table_path(R::TABLE);
        if !self.medium.exists(&path) {
            warn!("table {} not found at {}", R::TABLE, path.display());
            return Vec::new();
        }
        let data = match self.medium.read(&path) {
            Ok(data) => data,
            Err(e) => {
                error!("failed to read {}: {e}", path.display());
                return Vec::new();
            }
        };
        match decode_rows::<R>(&data) {
            Ok(rows) => {
                debug!("read {} rows from {}", rows.len(), path.display());
                rows
            }
            Err(e) => {
                error!("failed to decode {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    /// Replace the whole of `R`'s table with `rows`.
    ///
    /// The current file is copied to its backup sidecar first. If the write
    /// then fails, the backup is copied back over the table and the write
    /// error is returned. The backup is left on disk in both cases.
    pub fn replace_table<R: Record>(&self, rows: &[R]) -> Result<(), StoreError> {
        let table = R::TABLE;
        let path = self.config.table_path(table);
        let backup = self.config.backup_path(table);
        let data = encode_rows(rows)?;

        let backed_up = if self.medium.exists(&path) {
            self.medium
                .copy(&path, &backup)
                .map_err(|source| StoreError::BackupFailed { table, source })?;
            true
        } else {
            false
        };

        match self.medium.write(&path, &data) {
            Ok(()) => {
                info!("wrote {} rows to {}", rows.len(), path.display());
                Ok(())
            }
            Err(source) => {
                error!("failed to write {}: {source}", path.display());
                if backed_up {
                    match self.medium.copy(&backup, &path) {
                        Ok(()) => warn!("restored {} from backup", path.display()),
                        Err(e) => error!("failed to restore {} from backup: {e}", path.display()),
                    }
                }
                Err(StoreError::WriteFailed { table, source })
            }
        }
    }

    /// Write `seed` as the initial contents of `R`'s table unless the table
    /// already exists. Returns whether the table was created.
    pub fn create_table_if_missing<R: Record>(&self, seed: &[R]) -> Result<bool, StoreError> {
        let path = self.config.table_path(R::TABLE);
        if self.medium.exists(&path) {
            return Ok(false);
        }
        info!("creating table {} at {}", R::TABLE, path.display());
        let data = encode_rows(seed)?;
        self.medium
            .write(&path, &data)
            .map_err(|source| StoreError::WriteFailed {
                table: R::TABLE,
                source,
            })?;
        Ok(true)
    }
}
