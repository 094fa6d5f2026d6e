//! Backup-before-write and restore-on-failure behaviour of `TableStore`.
//!
//! Write failures are injected through a `TableMedium` wrapper that tears the
//! primary file (writes half of the new bytes) and then reports an I/O error,
//! which is the worst case the restore path has to repair.

use cartrack_schema::{AdditionalData, Carton, CartonId, CartonStatus, Vehicle, VehicleId};
use cartrack_store::{FsMedium, StoreConfig, StoreError, TableId, TableMedium, TableStore};
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Default)]
struct TornWrites {
    fail_writes: Cell<bool>,
    fail_copies: Cell<bool>,
    fail_restores: Cell<bool>,
    writes: Cell<usize>,
}

impl TableMedium for TornWrites {
    fn exists(&self, path: &Path) -> bool {
        FsMedium.exists(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        FsMedium.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            fs::write(path, &data[..data.len() / 2])?;
            return Err(io::Error::other("simulated device failure"));
        }
        FsMedium.write(path, data)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let restoring = to.extension().is_some_and(|ext| ext != "backup");
        if self.fail_copies.get() || (restoring && self.fail_restores.get()) {
            return Err(io::Error::other("simulated copy failure"));
        }
        FsMedium.copy(from, to)
    }
}

fn carton(id: &str) -> Carton {
    Carton::scanned(CartonId::new(id), "2025-01-01T00:00:00.000Z".to_owned())
}

fn torn_store() -> (tempfile::TempDir, TableStore<TornWrites>) {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::with_medium(StoreConfig::new(dir.path()), TornWrites::default());
    (dir, store)
}

#[test]
fn backup_holds_previous_snapshot_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::new(StoreConfig::new(dir.path()));

    store.replace_table(&[carton("A")]).unwrap();
    store.replace_table(&[carton("A"), carton("B")]).unwrap();

    let backup = fs::read_to_string(store.config().backup_path(TableId::Cartons)).unwrap();
    assert!(backup.contains("\nA,"));
    assert!(!backup.contains("\nB,"));
    assert_eq!(store.load_table::<Carton>().len(), 2);
}

#[test]
fn failed_write_restores_prior_contents() {
    let (_dir, store) = torn_store();
    let before = vec![carton("A"), carton("B")];
    store.replace_table(&before).unwrap();
    let path = store.config().table_path(TableId::Cartons);
    let bytes_before = fs::read(&path).unwrap();

    store.medium().fail_writes.set(true);
    let mut after = before.clone();
    after.push(carton("C"));
    after[0].status = CartonStatus::Assigned;
    let err = store.replace_table(&after).unwrap_err();

    assert!(matches!(
        err,
        StoreError::WriteFailed {
            table: TableId::Cartons,
            ..
        }
    ));
    assert_eq!(fs::read(&path).unwrap(), bytes_before);
    assert_eq!(store.load_table::<Carton>(), before);
    assert!(store.config().backup_path(TableId::Cartons).exists());
}

#[test]
fn failed_first_write_has_nothing_to_restore() {
    let (_dir, store) = torn_store();
    store.medium().fail_writes.set(true);
    let err = store.replace_table(&[Vehicle::new("V1", "One")]).unwrap_err();
    assert!(matches!(err, StoreError::WriteFailed { .. }));
    assert!(!store.config().backup_path(TableId::Vehicles).exists());
}

#[test]
fn restore_failure_still_reports_write_error() {
    let (_dir, store) = torn_store();
    store.replace_table(&[carton("A")]).unwrap();

    store.medium().fail_writes.set(true);
    store.medium().fail_restores.set(true);
    let err = store.replace_table(&[carton("Z")]).unwrap_err();

    assert!(matches!(err, StoreError::WriteFailed { .. }));
    let backup: Vec<u8> = fs::read(store.config().backup_path(TableId::Cartons)).unwrap();
    assert!(String::from_utf8(backup).unwrap().contains("\nA,"));
}

#[test]
fn backup_failure_leaves_table_untouched() {
    let (_dir, store) = torn_store();
    store.replace_table(&[carton("A")]).unwrap();
    let writes = store.medium().writes.get();

    store.medium().fail_copies.set(true);
    let err = store.replace_table(&[carton("B")]).unwrap_err();

    assert!(matches!(err, StoreError::BackupFailed { .. }));
    assert_eq!(store.medium().writes.get(), writes);
    assert_eq!(store.load_table::<Carton>(), vec![carton("A")]);
}

#[test]
fn roundtrip_preserves_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::new(StoreConfig::new(dir.path()));
    let meta = serde_json::json!({
        "recipient": "Ada, Ltd.",
        "items": [{"sku": "X1", "qty": 2}],
        "fragile": true
    });
    let mut full = carton("A").with_additional_data(AdditionalData::from_value(&meta));
    full.status = CartonStatus::Delivered;
    full.vehicle_id = VehicleId::new("TRUCK-001");
    full.date_picked_up = "2025-01-02T00:00:00.000Z".to_owned();
    full.date_delivered = "2025-01-03T00:00:00.000Z".to_owned();
    let rows = vec![full, carton("B")];

    store.replace_table(&rows).unwrap();
    let loaded: Vec<Carton> = store.load_table();

    assert_eq!(loaded, rows);
    assert_eq!(loaded[0].additional_data.value(), Some(meta));
    assert!(loaded[1].additional_data.value().is_none());
}

#[test]
fn unreadable_table_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::new(StoreConfig::new(dir.path()));
    fs::write(store.config().table_path(TableId::Vehicles), [0xff, 0xfe, 0x00]).unwrap();
    assert!(store.load_table::<Vehicle>().is_empty());
}
