use crate::table::TableId;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to a table path to name its backup sidecar.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".backup";

/// Location of every table file.
///
/// All three tables live in `data_dir`. Each table's backup sidecar is the
/// table path with `backup_suffix` appended (`cartons.csv.backup`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub settings_file: String,
    pub vehicles_file: String,
    pub cartons_file: String,
    pub backup_suffix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("data")
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            settings_file: TableId::Settings.default_file_name().to_owned(),
            vehicles_file: TableId::Vehicles.default_file_name().to_owned(),
            cartons_file: TableId::Cartons.default_file_name().to_owned(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_owned(),
        }
    }

    #[inline]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn file_name(&self, table: TableId) -> &str {
        match table {
            TableId::Settings => &self.settings_file,
            TableId::Vehicles => &self.vehicles_file,
            TableId::Cartons => &self.cartons_file,
        }
    }

    #[inline]
    pub fn table_path(&self, table: TableId) -> PathBuf {
        self.data_dir.join(self.file_name(table))
    }

    pub fn backup_path(&self, table: TableId) -> PathBuf {
        let mut name = OsString::from(self.table_path(table));
        name.push(&self.backup_suffix);
        PathBuf::from(name)
    }
}
