//! Carton tracking operations for cartrack.
//!
//! This crate ties the record types to the table store: the `Engine` facade
//! hands out the carton lifecycle operations (`Cartons`), the vehicle
//! registry (`Vehicles`) and the PIN check (`AccessGate`). Every operation
//! loads the tables it needs in full, validates and mutates in memory, and
//! replaces the table in one write. Nothing is cached between calls.

pub mod access;
pub mod bootstrap;
pub mod cartons;
pub mod engine;
pub mod intake;
pub mod lifecycle;
pub mod vehicles;

pub use access::AccessGate;
pub use bootstrap::{bootstrap_tables, seed_settings, seed_vehicles};
pub use cartons::{Cartons, NewCarton};
pub use engine::{Engine, Health};
pub use intake::BatchOutcome;
pub use lifecycle::{apply_transition, is_valid_transition, Transition};
pub use vehicles::Vehicles;

use cartrack_schema::{CartonId, CartonStatus, VehicleId};
use thiserror::Error;

/// Coarse classification of a [`CoreError`], used by callers to pick a
/// response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Conflict,
    NotFound,
    InvalidState,
    Unauthorized,
    AllExisting,
    StorageFailure,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("carton already exists: {0}")]
    CartonExists(CartonId),
    #[error("vehicle already exists: {0}")]
    VehicleExists(VehicleId),
    #[error("carton {carton_id} is not assigned to this vehicle (assigned to '{assigned_to}')")]
    WrongVehicle {
        carton_id: CartonId,
        assigned_to: VehicleId,
    },
    #[error("carton not found: {0}")]
    CartonNotFound(CartonId),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),
    #[error("carton {carton_id} cannot be {transition} because it is {status}")]
    InvalidTransition {
        carton_id: CartonId,
        transition: Transition,
        status: CartonStatus,
    },
    #[error("invalid PIN")]
    Unauthorized,
    #[error("all cartons already exist")]
    AllExisting { existing: Vec<CartonId> },
    #[error("store error: {0}")]
    Store(#[from] cartrack_store::StoreError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::CartonExists(_)
            | CoreError::VehicleExists(_)
            | CoreError::WrongVehicle { .. } => ErrorKind::Conflict,
            CoreError::CartonNotFound(_) | CoreError::VehicleNotFound(_) => ErrorKind::NotFound,
            CoreError::InvalidTransition { .. } => ErrorKind::InvalidState,
            CoreError::Unauthorized => ErrorKind::Unauthorized,
            CoreError::AllExisting { .. } => ErrorKind::AllExisting,
            CoreError::Store(_) => ErrorKind::StorageFailure,
        }
    }

    pub(crate) fn missing(what: &str) -> Self {
        CoreError::InvalidInput(format!("{what} is required"))
    }
}
