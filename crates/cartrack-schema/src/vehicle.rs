use crate::types::VehicleId;
use serde::{Deserialize, Serialize};

/// One row of the vehicle registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "ID")]
    pub id: VehicleId,
    #[serde(rename = "Name", default)]
    pub name: String,
}

impl Vehicle {
    pub fn new(id: impl Into<VehicleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
