use crate::access::AccessGate;
use crate::bootstrap::bootstrap_tables;
use crate::cartons::Cartons;
use crate::vehicles::Vehicles;
use crate::CoreError;
use cartrack_schema::timestamp_now;
use cartrack_store::{FsMedium, StoreConfig, TableId, TableMedium, TableStore};
use serde::Serialize;

/// Entry point for every cartrack operation.
///
/// Owns the [`TableStore`] and hands out short-lived views over it. The
/// engine holds no table data itself, so it is safe to share behind an `Arc`;
/// concurrent writers to the same table still race (last write wins).
pub struct Engine<M = FsMedium> {
    store: TableStore<M>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub time: String,
}

impl Engine<FsMedium> {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_store(TableStore::new(config))
    }
}

impl<M: TableMedium> Engine<M> {
    pub fn with_store(store: TableStore<M>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TableStore<M> {
        &self.store
    }

    /// Create missing table files with their seed rows.
    pub fn bootstrap(&self) -> Result<Vec<TableId>, CoreError> {
        bootstrap_tables(&self.store)
    }

    pub fn cartons(&self) -> Cartons<'_, M> {
        Cartons::new(&self.store)
    }

    pub fn vehicles(&self) -> Vehicles<'_, M> {
        Vehicles::new(&self.store)
    }

    pub fn access(&self) -> AccessGate<'_, M> {
        AccessGate::new(&self.store)
    }

    pub fn health(&self) -> Health {
        Health {
            status: "ok",
            time: timestamp_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrapped_engine_accepts_default_pin() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(StoreConfig::new(dir.path()));
        engine.bootstrap().unwrap();
        assert!(engine.access().verify("1234").is_ok());
        assert_eq!(engine.vehicles().list().len(), 2);
        assert!(engine.cartons().list().is_empty());
    }

    #[test]
    fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(StoreConfig::new(dir.path()));
        let health = engine.health();
        assert_eq!(health.status, "ok");
        assert!(health.time.ends_with('Z'));
    }
}
