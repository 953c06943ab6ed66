use std::fmt;

use serde::{Deserialize, Serialize};

use super::route::Route;
use crate::dynamics::state::{FlightMode, PhysicsState};
use crate::physics::geodesy::LatLng;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("UAV-{:02}", self.0))
    }
}

/// Reference to a task owned by the external task source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Coarse lifecycle status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Idle,
    Dispatched,
    Running,
    Returning,
    Completed,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehicleStatus::Idle => "idle",
            VehicleStatus::Dispatched => "dispatched",
            VehicleStatus::Running => "running",
            VehicleStatus::Returning => "returning",
            VehicleStatus::Completed => "completed",
        };
        f.pad(s)
    }
}

// ---------------------------------------------------------------------------
// Telemetry snapshot
// ---------------------------------------------------------------------------

/// Read-only view published to observers after each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub speed: f64,
    pub vertical_speed: f64,
    pub battery_percent: f64,
    pub heading: f64,
    pub status: VehicleStatus,
    pub mode: FlightMode,
    pub armed: bool,
}

impl Telemetry {
    pub fn capture(physics: &PhysicsState, status: VehicleStatus) -> Self {
        Self {
            lat: physics.position.lat,
            lng: physics.position.lng,
            altitude: physics.altitude,
            speed: physics.ground_speed,
            vertical_speed: physics.vertical_speed,
            battery_percent: physics.battery_percent,
            heading: physics.heading,
            status,
            mode: physics.mode,
            armed: physics.armed,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Vehicle record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub display_color: String,
    pub status: VehicleStatus,
    pub task: Option<TaskId>,
    pub route: Option<Route>,
    pub home: LatLng,
    /// External precondition for arming.
    pub gps_fix: bool,
    pub physics: PhysicsState,
    pub telemetry: Telemetry,
}

impl Vehicle {
    pub fn new(id: VehicleId, display_color: impl Into<String>, home: LatLng) -> Self {
        let physics = PhysicsState::on_ground(home);
        let telemetry = Telemetry::capture(&physics, VehicleStatus::Idle);
        Self {
            id,
            display_color: display_color.into(),
            status: VehicleStatus::Idle,
            task: None,
            route: None,
            home,
            gps_fix: true,
            physics,
            telemetry,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == VehicleStatus::Idle
    }

    /// Vehicles that take part in a tick: anything with a mission or powered motors.
    pub fn is_active(&self) -> bool {
        self.route.is_some() || self.physics.armed
    }

    /// Drop the mission and return to the idle pool.
    pub fn release(&mut self) {
        self.status = VehicleStatus::Idle;
        self.task = None;
        self.route = None;
        self.physics.reset_mission();
    }

    pub fn publish_telemetry(&mut self) -> &Telemetry {
        self.telemetry = Telemetry::capture(&self.physics, self.status);
        &self.telemetry
    }
}
