use serde::{Deserialize, Serialize};

use super::waypoint::{Command, WaypointBuilder, WaypointCommand};
use crate::physics::geodesy::{self, LatLng};

// ---------------------------------------------------------------------------
// Route: ordered sequence of waypoint commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<WaypointCommand>,
}

impl Route {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&WaypointCommand> {
        self.waypoints.get(idx)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.waypoints.len().checked_sub(1)
    }

    /// Sum of great-circle leg lengths, m.
    pub fn length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|w| geodesy::distance(&w[0].position, &w[1].position))
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Route builder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RouteBuilder {
    waypoints: Vec<WaypointCommand>,
}

impl RouteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, wp: WaypointBuilder) -> Self {
        let seq = self.waypoints.len() as u16 + 1;
        self.waypoints.push(wp.build(seq));
        self
    }

    pub fn build(self) -> Route {
        Route { waypoints: self.waypoints }
    }
}

// ---------------------------------------------------------------------------
// Preset routes
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Canonical delivery route: climb at origin, midpoint, destination,
    /// loiter, land. LAND is always last.
    pub fn delivery(origin: LatLng, destination: LatLng, altitude: f64, loiter_time: f64) -> Route {
        let midpoint = origin.midpoint(&destination);
        RouteBuilder::new()
            .step(WaypointBuilder::new(Command::Takeoff, origin).altitude(altitude))
            .step(WaypointBuilder::new(Command::Waypoint, midpoint).altitude(altitude))
            .step(WaypointBuilder::new(Command::Waypoint, destination).altitude(altitude))
            .step(
                WaypointBuilder::new(Command::LoiterTime, destination)
                    .altitude(altitude)
                    .loiter_time(loiter_time),
            )
            .step(WaypointBuilder::new(Command::Land, destination).altitude(0.0))
            .build()
    }
}
