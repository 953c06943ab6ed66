use std::fmt;

use crate::dynamics::state::{FlightMode, PhysicsState};
use crate::error::CommandRejected;
use crate::vehicle::drone::{TaskId, VehicleId};
use crate::vehicle::waypoint::Command;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

/// Kinds of per-vehicle events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Dispatched { task: TaskId },
    RouteReplaced { waypoints: usize },
    Armed,
    Disarmed,
    ModeChanged { from: FlightMode, to: FlightMode },
    MissionStarted { waypoints: usize },
    WaypointAdvanced { index: usize, command: Command },
    DeliveryLanded { task: Option<TaskId> },
    RtlInitiated,
    Landed,
    MissionComplete,
    ManualOverride { from: FlightMode },
    /// Active index pointed past a replaced route and was pulled back.
    WaypointClamped { index: usize, len: usize },
    /// AUTO found no usable route and fell back to LOITER.
    MissionMissing,
    AltitudeCrossed { altitude: f64, ascending: bool },
    BatteryLow { percent: f64 },
    Rejected(CommandRejected),
}

impl EventKind {
    pub fn severity(&self) -> Severity {
        match self {
            EventKind::WaypointClamped { .. }
            | EventKind::MissionMissing
            | EventKind::BatteryLow { .. }
            | EventKind::Rejected(_) => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Dispatched { task } => write!(f, "dispatched for task {}", task),
            EventKind::RouteReplaced { waypoints } => {
                write!(f, "route replaced ({} waypoints)", waypoints)
            }
            EventKind::Armed => write!(f, "armed"),
            EventKind::Disarmed => write!(f, "disarmed"),
            EventKind::ModeChanged { from, to } => write!(f, "mode {} -> {}", from, to),
            EventKind::MissionStarted { waypoints } => {
                write!(f, "mission started ({} waypoints)", waypoints)
            }
            EventKind::WaypointAdvanced { index, command } => {
                write!(f, "waypoint {} ({})", index + 1, command)
            }
            EventKind::DeliveryLanded { task: Some(task) } => {
                write!(f, "delivery complete for task {}", task)
            }
            EventKind::DeliveryLanded { task: None } => write!(f, "delivery complete"),
            EventKind::RtlInitiated => write!(f, "returning to launch"),
            EventKind::Landed => write!(f, "landed"),
            EventKind::MissionComplete => write!(f, "mission complete, vehicle released"),
            EventKind::ManualOverride { from } => write!(f, "manual override from {}", from),
            EventKind::WaypointClamped { index, len } => {
                write!(f, "waypoint index {} out of range for {}-step route", index, len)
            }
            EventKind::MissionMissing => write!(f, "AUTO without a mission, holding position"),
            EventKind::AltitudeCrossed { altitude, ascending } => write!(
                f,
                "altitude {:.1} m ({})",
                altitude,
                if *ascending { "ascending" } else { "descending" }
            ),
            EventKind::BatteryLow { percent } => write!(f, "battery low ({:.1}%)", percent),
            EventKind::Rejected(reason) => write!(f, "{}", reason),
        }
    }
}

/// A discrete event attributed to one vehicle.
#[derive(Debug, Clone)]
pub struct FlightEvent {
    pub time: f64,
    pub vehicle: VehicleId,
    pub kind: EventKind,
}

impl FlightEvent {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

// ---------------------------------------------------------------------------
// Passive detectors
// ---------------------------------------------------------------------------

/// Inspects consecutive states of one vehicle and reports events.
///
/// Detectors take `&self`: the fleet shares one set across all vehicles, so
/// they must not carry per-vehicle memory.
pub trait EventDetector {
    fn check(&self, prev: &PhysicsState, current: &PhysicsState) -> Option<EventKind>;
}

/// Detects when altitude crosses a threshold (ascending or descending).
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool) -> Self {
        Self { altitude, ascending }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&self, prev: &PhysicsState, current: &PhysicsState) -> Option<EventKind> {
        let crossed = if self.ascending {
            prev.altitude < self.altitude && current.altitude >= self.altitude
        } else {
            prev.altitude > self.altitude && current.altitude <= self.altitude
        };
        crossed.then_some(EventKind::AltitudeCrossed {
            altitude: self.altitude,
            ascending: self.ascending,
        })
    }
}

/// Fires once when the battery drops below a threshold. Battery never
/// recharges, so the crossing happens at most once per vehicle.
pub struct BatteryLowDetector {
    pub percent: f64,
}

impl EventDetector for BatteryLowDetector {
    fn check(&self, prev: &PhysicsState, current: &PhysicsState) -> Option<EventKind> {
        (prev.battery_percent >= self.percent && current.battery_percent < self.percent)
            .then_some(EventKind::BatteryLow { percent: current.battery_percent })
    }
}
