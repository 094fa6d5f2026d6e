use crate::lifecycle::{apply_transition, Transition};
use crate::vehicles::Vehicles;
use crate::CoreError;
use cartrack_schema::{timestamp_now, AdditionalData, Carton, CartonId, CartonStatus, VehicleId};
use cartrack_store::{TableMedium, TableStore};
use std::collections::HashSet;
use tracing::{debug, info};

/// Fields accepted when a single carton is registered.
#[derive(Debug, Clone, Default)]
pub struct NewCarton {
    pub id: CartonId,
    pub status: Option<CartonStatus>,
    pub vehicle_id: Option<VehicleId>,
    pub additional_data: Option<serde_json::Value>,
}

impl NewCarton {
    pub fn new(id: impl Into<CartonId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_carton(self, scanned_at: String) -> Carton {
        let data = self
            .additional_data
            .as_ref()
            .map(AdditionalData::from_value)
            .unwrap_or_default();
        let mut carton = Carton::scanned(self.id, scanned_at).with_additional_data(data);
        carton.status = self.status.unwrap_or_default();
        carton.vehicle_id = self.vehicle_id.unwrap_or_default();
        carton
    }
}

/// Carton lifecycle operations over the carton table.
///
/// Each call is one load-validate-mutate-replace cycle. Validation failures
/// return before anything is written.
pub struct Cartons<'a, M> {
    pub(crate) store: &'a TableStore<M>,
}

impl<'a, M: TableMedium> Cartons<'a, M> {
    pub fn new(store: &'a TableStore<M>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Carton> {
        self.store.load_table()
    }

    pub fn get(&self, id: &str) -> Option<Carton> {
        self.list().into_iter().find(|c| c.id == id)
    }

    /// Register one carton. `status` defaults to `unassigned` and
    /// `vehicle_id` to none; `date_scanned` is set to now.
    pub fn register(&self, new: NewCarton) -> Result<Carton, CoreError> {
        if new.id.is_empty() {
            return Err(CoreError::missing("Carton ID"));
        }

        let mut cartons: Vec<Carton> = self.store.load_table();
        if cartons.iter().any(|c| c.id == new.id) {
            return Err(CoreError::CartonExists(new.id));
        }

        let carton = new.into_carton(timestamp_now());
        info!("registering carton {} ({})", carton.id, carton.status);
        cartons.push(carton.clone());
        self.store.replace_table(&cartons)?;
        Ok(carton)
    }

    /// Assign every listed carton to `vehicle_id`, whatever its current
    /// status. Unknown carton ids are skipped. Returns how many cartons were
    /// updated.
    pub fn assign(
        &self,
        carton_ids: &[CartonId],
        vehicle_id: &VehicleId,
    ) -> Result<usize, CoreError> {
        if carton_ids.is_empty() {
            return Err(CoreError::missing("Carton IDs"));
        }
        if vehicle_id.is_empty() {
            return Err(CoreError::missing("Vehicle ID"));
        }

        if !Vehicles::new(self.store).exists(vehicle_id) {
            return Err(CoreError::VehicleNotFound(vehicle_id.clone()));
        }

        let mut cartons: Vec<Carton> = self.store.load_table();
        let wanted: HashSet<&str> = carton_ids.iter().map(CartonId::as_str).collect();
        let now = timestamp_now();
        let mut touched = 0;
        for carton in cartons.iter_mut().filter(|c| wanted.contains(c.id.as_str())) {
            carton.vehicle_id = vehicle_id.clone();
            apply_transition(carton, Transition::Assign, &now)?;
            touched += 1;
        }
        if touched < wanted.len() {
            debug!(
                "assign to {vehicle_id}: {} requested ids not found",
                wanted.len() - touched
            );
        }

        info!("assigning {touched} cartons to vehicle {vehicle_id}");
        self.store.replace_table(&cartons)?;
        Ok(touched)
    }

    /// Confirm pickup of an assigned carton. When `vehicle_id` is given it
    /// must match the carton's assigned vehicle.
    pub fn pickup(
        &self,
        carton_id: &CartonId,
        vehicle_id: Option<&VehicleId>,
    ) -> Result<Carton, CoreError> {
        if carton_id.is_empty() {
            return Err(CoreError::missing("Carton ID"));
        }
        self.transition(carton_id, Transition::Pickup, |carton| match vehicle_id {
            Some(v) if !v.is_empty() && carton.vehicle_id != *v => Err(CoreError::WrongVehicle {
                carton_id: carton.id.clone(),
                assigned_to: carton.vehicle_id.clone(),
            }),
            _ => Ok(()),
        })
    }

    /// Confirm delivery of a picked-up carton.
    pub fn deliver(&self, carton_id: &CartonId) -> Result<Carton, CoreError> {
        if carton_id.is_empty() {
            return Err(CoreError::missing("Carton ID"));
        }
        self.transition(carton_id, Transition::Deliver, |_| Ok(()))
    }

    fn transition(
        &self,
        carton_id: &CartonId,
        transition: Transition,
        precheck: impl FnOnce(&Carton) -> Result<(), CoreError>,
    ) -> Result<Carton, CoreError> {
        let mut cartons: Vec<Carton> = self.store.load_table();
        let carton = cartons
            .iter_mut()
            .find(|c| c.id == *carton_id)
            .ok_or_else(|| CoreError::CartonNotFound(carton_id.clone()))?;

        precheck(carton)?;
        apply_transition(carton, transition, &timestamp_now())?;
        let updated = carton.clone();

        info!("carton {carton_id} is now {}", updated.status);
        self.store.replace_table(&cartons)?;
        Ok(updated)
    }
}
