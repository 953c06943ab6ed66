use thiserror::Error;

use crate::vehicle::drone::{VehicleId, VehicleStatus};

/// Operator command refused by a precondition. State is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandRejected {
    #[error("arm rejected: no GPS fix")]
    NoGpsFix,

    #[error("disarm rejected: vehicle airborne at {altitude:.1} m")]
    Airborne { altitude: f64 },

    #[error("AUTO rejected: no mission loaded")]
    NoMission,

    #[error("AUTO rejected: must arm first")]
    NotArmed,
}

/// Fleet bookkeeping failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    #[error("unknown vehicle: {0}")]
    UnknownVehicle(VehicleId),

    #[error("vehicle {id} is busy ({status})")]
    VehicleBusy { id: VehicleId, status: VehicleStatus },

    #[error("vehicle {0} has no assigned mission")]
    NotAssigned(VehicleId),

    #[error("no idle vehicle available")]
    NoVehicleAvailable,

    #[error(transparent)]
    Rejected(#[from] CommandRejected),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    Missing(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
