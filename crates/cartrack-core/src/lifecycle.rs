use crate::CoreError;
use cartrack_schema::{Carton, CartonStatus};

/// A lifecycle step applied to an existing carton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Assign,
    Pickup,
    Deliver,
}

impl Transition {
    pub fn target(self) -> CartonStatus {
        match self {
            Transition::Assign => CartonStatus::Assigned,
            Transition::Pickup => CartonStatus::PickedUp,
            Transition::Deliver => CartonStatus::Delivered,
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Assign => write!(f, "assigned"),
            Transition::Pickup => write!(f, "picked up"),
            Transition::Deliver => write!(f, "delivered"),
        }
    }
}

/// Assignment is accepted from every status, so a carton can be re-routed
/// even after pickup or delivery.
pub fn is_valid_transition(from: CartonStatus, transition: Transition) -> bool {
    match transition {
        Transition::Assign => true,
        Transition::Pickup => from == CartonStatus::Assigned,
        Transition::Deliver => from == CartonStatus::PickedUp,
    }
}

/// Move `carton` to the transition's target status and stamp the matching
/// timestamp with `now`. The carton is left untouched on error.
pub fn apply_transition(
    carton: &mut Carton,
    transition: Transition,
    now: &str,
) -> Result<(), CoreError> {
    if !is_valid_transition(carton.status, transition) {
        return Err(CoreError::InvalidTransition {
            carton_id: carton.id.clone(),
            transition,
            status: carton.status,
        });
    }

    carton.status = transition.target();
    match transition {
        Transition::Assign => {}
        Transition::Pickup => carton.date_picked_up = now.to_owned(),
        Transition::Deliver => carton.date_delivered = now.to_owned(),
    }
    Ok(())
}
