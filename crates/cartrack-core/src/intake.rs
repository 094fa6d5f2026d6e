use crate::cartons::{Cartons, NewCarton};
use crate::CoreError;
use cartrack_schema::{timestamp_now, Carton, CartonId};
use cartrack_store::TableMedium;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Result of a batch registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub added: Vec<CartonId>,
    pub existing: Vec<CartonId>,
    pub count: usize,
}

impl<M: TableMedium> Cartons<'_, M> {
    /// Register many scanned cartons at once.
    ///
    /// Ids already in the table, or repeated earlier in `ids`, are reported as
    /// existing. New cartons take their additional data from `metadata`. The
    /// table is written once for the whole batch, and not at all when every
    /// id already exists.
    pub fn register_batch(
        &self,
        ids: &[CartonId],
        metadata: &HashMap<CartonId, serde_json::Value>,
    ) -> Result<BatchOutcome, CoreError> {
        if ids.is_empty() {
            return Err(CoreError::missing("Cartons array"));
        }

        let mut cartons: Vec<Carton> = self.store.load_table();
        let mut known: HashSet<CartonId> = cartons.iter().map(|c| c.id.clone()).collect();
        let scanned_at = timestamp_now();
        let mut added = Vec::new();
        let mut existing = Vec::new();

        for id in ids {
            if !known.insert(id.clone()) {
                existing.push(id.clone());
                continue;
            }
            let new = NewCarton {
                additional_data: metadata.get(id).cloned(),
                ..NewCarton::new(id.clone())
            };
            cartons.push(new.into_carton(scanned_at.clone()));
            added.push(id.clone());
        }

        if added.is_empty() {
            return Err(CoreError::AllExisting { existing });
        }

        info!(
            "registering {} cartons ({} already present)",
            added.len(),
            existing.len()
        );
        self.store.replace_table(&cartons)?;
        Ok(BatchOutcome {
            count: added.len(),
            added,
            existing,
        })
    }
}
