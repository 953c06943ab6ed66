pub mod config;
pub mod dynamics;
pub mod error;
pub mod gnc;
pub mod io;
pub mod physics;
pub mod sim;
pub mod vehicle;

// Flat re-exports for callers that only drive the fleet
pub mod types {
    pub use crate::config::FlightConfig;
    pub use crate::dynamics::state::{FlightMode, PhysicsState, EARTH_RADIUS};
    pub use crate::error::{CommandRejected, ConfigError, FleetError};
    pub use crate::gnc::manual::{Action, ControlAxes};
    pub use crate::physics::geodesy::LatLng;
    pub use crate::sim::event::{EventKind, FlightEvent, Severity};
    pub use crate::sim::fleet::{EventLog, FleetCoordinator, FleetObserver, NullObserver, TaskRequest};
    pub use crate::vehicle::drone::{TaskId, Telemetry, Vehicle, VehicleId, VehicleStatus};
    pub use crate::vehicle::route::Route;
}
