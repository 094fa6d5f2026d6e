//! First-run creation of the table files.

use crate::CoreError;
use cartrack_schema::{Carton, Setting, Vehicle, FALLBACK_LOGIN_PIN, LOGIN_PIN_KEY};
use cartrack_store::{TableId, TableMedium, TableStore};
use tracing::info;

pub fn seed_settings() -> Vec<Setting> {
    vec![Setting::new(LOGIN_PIN_KEY, FALLBACK_LOGIN_PIN)]
}

pub fn seed_vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle::new("TRUCK-001", "Delivery Van 1"),
        Vehicle::new("TRUCK-002", "Delivery Van 2"),
    ]
}

/// Create every missing table with its header and seed rows. Tables that
/// already exist are left alone. Returns the tables that were created.
pub fn bootstrap_tables<M: TableMedium>(store: &TableStore<M>) -> Result<Vec<TableId>, CoreError> {
    let mut created = Vec::new();
    if store.create_table_if_missing(&seed_settings())? {
        created.push(TableId::Settings);
    }
    if store.create_table_if_missing(&seed_vehicles())? {
        created.push(TableId::Vehicles);
    }
    if store.create_table_if_missing::<Carton>(&[])? {
        created.push(TableId::Cartons);
    }
    if !created.is_empty() {
        info!("bootstrapped {} tables", created.len());
    }
    Ok(created)
}
