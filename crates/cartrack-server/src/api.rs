//! JSON handlers for the `/api` routes.
//!
//! Each handler parses its body, calls one engine operation, and shapes the
//! result. Failures come back as [`CoreError`] and are turned into a status
//! code plus `{"error": ...}` body by [`error_reply`].

use crate::Reply;
use cartrack_core::{CoreError, Engine, ErrorKind, NewCarton};
use cartrack_schema::{CartonId, CartonStatus, VehicleId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::error;

#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    pin: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct VehicleRequest {
    #[serde(default)]
    id: VehicleId,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartonRequest {
    #[serde(default)]
    id: CartonId,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    vehicle_id: Option<VehicleId>,
    #[serde(default)]
    additional_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartonMetadata {
    id: CartonId,
    #[serde(default)]
    additional_data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    #[serde(default)]
    cartons: Vec<CartonId>,
    #[serde(default)]
    cartons_data: Vec<CartonMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignRequest {
    #[serde(default)]
    carton_ids: Vec<CartonId>,
    #[serde(default)]
    vehicle_id: VehicleId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest {
    #[serde(default)]
    carton_id: CartonId,
    #[serde(default)]
    vehicle_id: Option<VehicleId>,
}

/// An empty body reads as `{}` so missing fields surface as
/// "... is required" rather than a parse error.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, CoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| CoreError::InvalidInput(format!("invalid JSON body: {e}")))
}

/// PINs are compared as text; a numeric PIN keeps its decimal digits.
pub fn pin_text(pin: Option<&Value>) -> String {
    match pin {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn login(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: LoginRequest = parse_body(body)?;
    engine.access().verify(&pin_text(req.pin.as_ref()))?;
    Ok(Reply::json(200, &json!({ "success": true })))
}

pub fn list_vehicles(engine: &Engine) -> Reply {
    Reply::json(200, &engine.vehicles().list())
}

pub fn register_vehicle(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: VehicleRequest = parse_body(body)?;
    let vehicle = engine.vehicles().register(req.id, req.name)?;
    Ok(Reply::json(201, &vehicle))
}

pub fn list_cartons(engine: &Engine) -> Reply {
    Reply::json(200, &engine.cartons().list())
}

pub fn register_carton(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: CartonRequest = parse_body(body)?;
    let status = match req.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<CartonStatus>()
                .map_err(|e| CoreError::InvalidInput(e.to_string()))?,
        ),
    };
    let carton = engine.cartons().register(NewCarton {
        id: req.id,
        status,
        vehicle_id: req.vehicle_id,
        additional_data: req.additional_data,
    })?;
    Ok(Reply::json(201, &carton))
}

pub fn register_batch(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: BatchRequest = parse_body(body)?;
    // first entry for an id wins
    let mut metadata: HashMap<CartonId, Value> = HashMap::new();
    for m in req.cartons_data {
        metadata.entry(m.id).or_insert(m.additional_data);
    }
    let outcome = engine.cartons().register_batch(&req.cartons, &metadata)?;
    Ok(Reply::json(
        201,
        &json!({
            "success": true,
            "added": outcome.added,
            "existing": outcome.existing,
            "count": outcome.count,
        }),
    ))
}

pub fn assign(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: AssignRequest = parse_body(body)?;
    let count = engine.cartons().assign(&req.carton_ids, &req.vehicle_id)?;
    Ok(Reply::json(200, &json!({ "success": true, "count": count })))
}

pub fn pickup(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: MoveRequest = parse_body(body)?;
    let carton = engine
        .cartons()
        .pickup(&req.carton_id, req.vehicle_id.as_ref())?;
    Ok(moved(&carton.id, carton.status))
}

pub fn deliver(engine: &Engine, body: &[u8]) -> Result<Reply, CoreError> {
    let req: MoveRequest = parse_body(body)?;
    let carton = engine.cartons().deliver(&req.carton_id)?;
    Ok(moved(&carton.id, carton.status))
}

fn moved(id: &CartonId, status: CartonStatus) -> Reply {
    Reply::json(
        200,
        &json!({ "success": true, "cartonId": id, "status": status }),
    )
}

pub fn health(engine: &Engine) -> Reply {
    Reply::json(200, &engine.health())
}

/// Only a missing carton is 404. An unknown vehicle on assign is a bad
/// request like any duplicate or vehicle mismatch.
pub fn status_code(err: &CoreError) -> u16 {
    if let CoreError::VehicleNotFound(_) = err {
        return 400;
    }
    match err.kind() {
        ErrorKind::InvalidInput
        | ErrorKind::InvalidState
        | ErrorKind::AllExisting
        | ErrorKind::Conflict => 400,
        ErrorKind::Unauthorized => 401,
        ErrorKind::NotFound => 404,
        ErrorKind::StorageFailure => 500,
    }
}

/// `{"error": message}` plus whatever detail the caller needs to recover:
/// the real assignee, the blocking status, or the ids already present.
pub fn error_reply(err: &CoreError) -> Reply {
    let mut body = json!({ "error": err.to_string() });
    match err {
        CoreError::WrongVehicle { assigned_to, .. } => {
            body["assignedTo"] = json!(assigned_to);
        }
        CoreError::InvalidTransition { status, .. } => {
            body["status"] = json!(status);
        }
        CoreError::AllExisting { existing } => {
            body["success"] = json!(false);
            body["existing"] = json!(existing);
        }
        CoreError::Store(e) => error!("storage failure: {e}"),
        _ => {}
    }
    Reply::json(status_code(err), &body)
}
