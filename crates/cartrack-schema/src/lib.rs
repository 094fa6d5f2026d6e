//! Record types shared by every cartrack crate.
//!
//! This crate defines the schema layer: the `Carton` record and its
//! `CartonStatus` lifecycle enum, the `Vehicle` and `Setting` records, the
//! opaque `AdditionalData` blob carried per carton, and string newtypes for
//! carton and vehicle identifiers. Field names serialize to the column headers
//! used by the table files and the HTTP API (`ID`, `Status`, `VehicleID`, ...).

pub mod carton;
pub mod setting;
pub mod types;
pub mod vehicle;

pub use carton::{timestamp_now, AdditionalData, Carton, CartonStatus, ParseStatusError};
pub use setting::{Setting, FALLBACK_LOGIN_PIN, LOGIN_PIN_KEY};
pub use types::{CartonId, VehicleId};
pub use vehicle::Vehicle;
