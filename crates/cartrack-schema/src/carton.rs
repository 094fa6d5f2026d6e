use crate::types::{CartonId, VehicleId};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Position of a carton in the delivery pipeline.
///
/// The declaration order is the lifecycle order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CartonStatus {
    #[default]
    Unassigned,
    Assigned,
    PickedUp,
    Delivered,
}

impl CartonStatus {
    pub const ALL: [CartonStatus; 4] = [
        CartonStatus::Unassigned,
        CartonStatus::Assigned,
        CartonStatus::PickedUp,
        CartonStatus::Delivered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CartonStatus::Unassigned => "unassigned",
            CartonStatus::Assigned => "assigned",
            CartonStatus::PickedUp => "picked_up",
            CartonStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for CartonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown carton status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for CartonStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CartonStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

/// Free-form per-carton metadata, kept as the serialized JSON text it is
/// stored as. The empty string means "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdditionalData(String);

impl AdditionalData {
    /// Serialize a structured value. Null, `{}`, `[]` and `""` collapse to no data.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let empty = match value {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::String(s) => s.is_empty(),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => false,
        };
        if empty {
            Self::default()
        } else {
            Self(value.to_string())
        }
    }

    /// Parse the stored text back into a structured value.
    ///
    /// Returns `None` when there is no data or the text is not valid JSON.
    pub fn value(&self) -> Option<serde_json::Value> {
        if self.0.is_empty() {
            return None;
        }
        serde_json::from_str(&self.0).ok()
    }

    pub fn as_text(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One row of the carton table.
///
/// Timestamp fields hold an RFC 3339 UTC instant, or the empty string while
/// the carton has not reached that stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carton {
    #[serde(rename = "ID")]
    pub id: CartonId,
    #[serde(rename = "Status", default)]
    pub status: CartonStatus,
    #[serde(rename = "VehicleID", default)]
    pub vehicle_id: VehicleId,
    #[serde(rename = "DateScanned", default)]
    pub date_scanned: String,
    #[serde(rename = "DatePickedUp", default)]
    pub date_picked_up: String,
    #[serde(rename = "DateDelivered", default)]
    pub date_delivered: String,
    #[serde(rename = "AdditionalData", default)]
    pub additional_data: AdditionalData,
}

impl Carton {
    /// A freshly scanned, unassigned carton.
    pub fn scanned(id: CartonId, scanned_at: String) -> Self {
        Self {
            id,
            status: CartonStatus::Unassigned,
            vehicle_id: VehicleId::default(),
            date_scanned: scanned_at,
            date_picked_up: String::new(),
            date_delivered: String::new(),
            additional_data: AdditionalData::default(),
        }
    }

    #[must_use]
    pub fn with_additional_data(mut self, data: AdditionalData) -> Self {
        self.additional_data = data;
        self
    }
}

/// Current UTC time in the millisecond RFC 3339 form stored in the tables.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
