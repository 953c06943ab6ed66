use std::fmt;

use serde::{Deserialize, Serialize};

use crate::physics::geodesy::LatLng;

// ---------------------------------------------------------------------------
// Waypoint command (one step of a route)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Takeoff,
    Waypoint,
    LoiterTime,
    ReturnToLaunch,
    Land,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::Takeoff => "TAKEOFF",
            Command::Waypoint => "WAYPOINT",
            Command::LoiterTime => "LOITER_TIME",
            Command::ReturnToLaunch => "RETURN_TO_LAUNCH",
            Command::Land => "LAND",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointCommand {
    pub sequence: u16,            // 1-based
    pub command: Command,
    pub position: LatLng,
    pub altitude: f64,            // m
    pub loiter_time: Option<f64>, // s
    pub radius: Option<f64>,      // m
    pub yaw: Option<f64>,         // deg
}

impl WaypointCommand {
    pub fn is_land(&self) -> bool {
        self.command == Command::Land
    }
}

// ---------------------------------------------------------------------------
// Waypoint builder
// ---------------------------------------------------------------------------

pub struct WaypointBuilder {
    command: Command,
    position: LatLng,
    altitude: f64,
    loiter_time: Option<f64>,
    radius: Option<f64>,
    yaw: Option<f64>,
}

impl WaypointBuilder {
    pub fn new(command: Command, position: LatLng) -> Self {
        Self {
            command,
            position,
            altitude: 0.0,
            loiter_time: None,
            radius: None,
            yaw: None,
        }
    }

    pub fn altitude(mut self, v: f64) -> Self { self.altitude = v; self }
    pub fn loiter_time(mut self, v: f64) -> Self { self.loiter_time = Some(v); self }
    pub fn radius(mut self, v: f64) -> Self { self.radius = Some(v); self }
    pub fn yaw(mut self, v: f64) -> Self { self.yaw = Some(v); self }

    /// Sequence numbers are assigned by the route, so this is crate-visible only.
    pub(crate) fn build(self, sequence: u16) -> WaypointCommand {
        WaypointCommand {
            sequence,
            command: self.command,
            position: self.position,
            altitude: self.altitude,
            loiter_time: self.loiter_time,
            radius: self.radius,
            yaw: self.yaw,
        }
    }
}
