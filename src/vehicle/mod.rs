pub mod drone;
pub mod route;
pub mod waypoint;

pub use drone::{TaskId, Telemetry, Vehicle, VehicleId, VehicleStatus};
pub use route::{presets, Route, RouteBuilder};
pub use waypoint::{Command, WaypointBuilder, WaypointCommand};
