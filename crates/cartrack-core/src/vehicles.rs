use crate::CoreError;
use cartrack_schema::{Vehicle, VehicleId};
use cartrack_store::{TableMedium, TableStore};
use tracing::info;

/// Registry of delivery vehicles. Vehicles are only ever appended.
pub struct Vehicles<'a, M> {
    store: &'a TableStore<M>,
}

impl<'a, M: TableMedium> Vehicles<'a, M> {
    pub fn new(store: &'a TableStore<M>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Vehicle> {
        self.store.load_table()
    }

    pub fn exists(&self, id: &VehicleId) -> bool {
        self.list().iter().any(|v| v.id == *id)
    }

    pub fn register(&self, id: VehicleId, name: String) -> Result<Vehicle, CoreError> {
        if id.is_empty() || name.is_empty() {
            return Err(CoreError::missing("Vehicle ID and Name"));
        }

        let mut vehicles = self.list();
        if vehicles.iter().any(|v| v.id == id) {
            return Err(CoreError::VehicleExists(id));
        }

        let vehicle = Vehicle::new(id, name);
        info!("registering vehicle {} ({})", vehicle.id, vehicle.name);
        vehicles.push(vehicle.clone());
        self.store.replace_table(&vehicles)?;
        Ok(vehicle)
    }
}
