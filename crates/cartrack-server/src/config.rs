use cartrack_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BIND: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Server settings, read from an optional TOML file.
///
/// ```toml
/// port = 3001
/// bind = "0.0.0.0"
/// public_dir = "public"
/// log_file = "access.log"
///
/// [store]
/// data_dir = "data"
/// backup_suffix = ".backup"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: String,
    pub public_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_owned(),
            public_dir: PathBuf::from("public"),
            log_file: None,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(input: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// `bind:port`, as handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartrack_store::TableId;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = ServerConfig::from_toml_str("", Path::new("cartrack.toml")).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.listen_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn partial_store_section_keeps_other_defaults() {
        let cfg = ServerConfig::from_toml_str(
            "port = 8080\n[store]\ndata_dir = \"/srv/cartrack\"\ncartons_file = \"parcels.csv\"\n",
            Path::new("cartrack.toml"),
        )
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(
            cfg.store.table_path(TableId::Cartons),
            PathBuf::from("/srv/cartrack/parcels.csv")
        );
        assert_eq!(
            cfg.store.table_path(TableId::Vehicles),
            PathBuf::from("/srv/cartrack/vehicles.csv")
        );
        assert_eq!(cfg.store.backup_suffix, ".backup");
    }

    #[test]
    fn bad_toml_names_the_file() {
        let err = ServerConfig::from_toml_str("port = \"many\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cartrack.toml");
        fs::write(&path, "public_dir = \"web\"\nlog_file = \"access.log\"\n").unwrap();
        let cfg = ServerConfig::load(&path).unwrap();
        assert_eq!(cfg.public_dir, PathBuf::from("web"));
        assert_eq!(cfg.log_file, Some(PathBuf::from("access.log")));
    }
}
