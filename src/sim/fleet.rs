use std::collections::BTreeMap;

use tracing::{debug, info, info_span, warn};

use super::event::{AltitudeDetector, BatteryLowDetector, EventDetector, EventKind, FlightEvent, Severity};
use super::integrator;
use crate::config::FlightConfig;
use crate::dynamics::state::FlightMode;
use crate::error::{CommandRejected, FleetError};
use crate::gnc::arming;
use crate::gnc::manual::{Action, ControlAxes};
use crate::physics::geodesy::LatLng;
use crate::vehicle::drone::{TaskId, Telemetry, Vehicle, VehicleId, VehicleStatus};
use crate::vehicle::route::{presets, Route};

/// Marker colors handed out in creation order.
pub const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#bcf60c",
];

// ---------------------------------------------------------------------------
// External boundary
// ---------------------------------------------------------------------------

/// Receiver for everything the fleet publishes. Notifications are keyed by
/// vehicle; implementations must not assume any ordering across vehicles.
pub trait FleetObserver {
    fn on_event(&mut self, _event: &FlightEvent) {}

    fn on_telemetry(&mut self, _vehicle: VehicleId, _telemetry: &Telemetry) {}

    /// Called exactly once per mission, at the delivery landing.
    fn on_task_completed(&mut self, _vehicle: VehicleId, _task: &TaskId) {}
}

/// Discards all notifications.
#[derive(Debug, Default)]
pub struct NullObserver;

impl FleetObserver for NullObserver {}

/// Keeps every event and completion, and the latest telemetry per vehicle.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<FlightEvent>,
    pub completed: Vec<(VehicleId, TaskId)>,
    pub latest: BTreeMap<VehicleId, Telemetry>,
    pub telemetry_count: usize,
}

impl EventLog {
    pub fn for_vehicle(&self, id: VehicleId) -> impl Iterator<Item = &FlightEvent> {
        self.events.iter().filter(move |e| e.vehicle == id)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &FlightEvent> {
        self.events.iter().filter(|e| e.severity() == Severity::Warning)
    }
}

impl FleetObserver for EventLog {
    fn on_event(&mut self, event: &FlightEvent) {
        self.events.push(event.clone());
    }

    fn on_telemetry(&mut self, vehicle: VehicleId, telemetry: &Telemetry) {
        self.telemetry_count += 1;
        self.latest.insert(vehicle, telemetry.clone());
    }

    fn on_task_completed(&mut self, vehicle: VehicleId, task: &TaskId) {
        self.completed.push((vehicle, task.clone()));
    }
}

/// Dispatch request from the task source.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    pub task_id: TaskId,
    pub destination: LatLng,
    /// Launch point for this mission; defaults to the vehicle's home.
    pub origin_override: Option<LatLng>,
}

impl TaskRequest {
    pub fn new(task_id: impl Into<String>, destination: LatLng) -> Self {
        Self {
            task_id: TaskId(task_id.into()),
            destination,
            origin_override: None,
        }
    }

    pub fn from_origin(mut self, origin: LatLng) -> Self {
        self.origin_override = Some(origin);
        self
    }
}

fn publish<O: FleetObserver>(observer: &mut O, time: f64, vehicle: VehicleId, kind: EventKind) {
    let event = FlightEvent { time, vehicle, kind };
    match event.severity() {
        Severity::Info => info!(vehicle = %vehicle, t = time, "{}", event.kind),
        Severity::Warning => warn!(vehicle = %vehicle, t = time, "{}", event.kind),
    }
    observer.on_event(&event);
}

pub fn default_detectors(config: &FlightConfig) -> Vec<Box<dyn EventDetector>> {
    vec![
        Box::new(AltitudeDetector::new(config.airborne_altitude, true)),
        Box::new(BatteryLowDetector { percent: config.battery_warn_percent }),
    ]
}

// ---------------------------------------------------------------------------
// Fleet coordinator
// ---------------------------------------------------------------------------

/// Owns every vehicle and is the only writer of their state.
pub struct FleetCoordinator<O: FleetObserver = NullObserver> {
    config: FlightConfig,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    observer: O,
    detectors: Vec<Box<dyn EventDetector>>,
    manual: Option<VehicleId>,
    axes: ControlAxes,
    clock: f64,
    next_id: u32,
}

impl<O: FleetObserver> FleetCoordinator<O> {
    pub fn new(config: FlightConfig, observer: O) -> Self {
        let detectors = default_detectors(&config);
        Self {
            config,
            vehicles: BTreeMap::new(),
            observer,
            detectors,
            manual: None,
            axes: ControlAxes::default(),
            clock: 0.0,
            next_id: 1,
        }
    }

    /// Fleet with one vehicle per home location.
    pub fn with_homes(config: FlightConfig, observer: O, homes: &[LatLng]) -> Self {
        let mut fleet = Self::new(config, observer);
        for home in homes {
            fleet.add_vehicle(*home);
        }
        fleet
    }

    pub fn add_vehicle(&mut self, home: LatLng) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        let color = PALETTE[(id.0 as usize - 1) % PALETTE.len()];
        self.vehicles.insert(id, Vehicle::new(id, color, home));
        debug!(vehicle = %id, lat = home.lat, lng = home.lng, "vehicle created");
        id
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Timestamp of the most recent tick.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Result<&mut Vehicle, FleetError> {
        self.vehicles.get_mut(&id).ok_or(FleetError::UnknownVehicle(id))
    }

    // -- Assignment ---------------------------------------------------------

    /// First idle vehicle in id order. First-fit, not least-loaded.
    pub fn find_available(&self) -> Option<VehicleId> {
        self.vehicles.values().find(|v| v.is_idle()).map(|v| v.id)
    }

    /// Hand a task and route to an idle vehicle. Does not arm it.
    pub fn assign(&mut self, id: VehicleId, task: TaskId, route: Route) -> Result<(), FleetError> {
        let clock = self.clock;
        let vehicle = self.vehicle_mut(id)?;
        if !vehicle.is_idle() {
            return Err(FleetError::VehicleBusy { id, status: vehicle.status });
        }
        vehicle.status = VehicleStatus::Dispatched;
        vehicle.task = Some(task.clone());
        vehicle.route = Some(route);
        vehicle.physics.reset_mission();
        vehicle.physics.last_tick = None;
        vehicle.publish_telemetry();
        publish(&mut self.observer, clock, id, EventKind::Dispatched { task });
        Ok(())
    }

    /// Pick the first idle vehicle and give it the canonical delivery route.
    pub fn dispatch(&mut self, request: TaskRequest) -> Result<VehicleId, FleetError> {
        let id = self.find_available().ok_or(FleetError::NoVehicleAvailable)?;
        let vehicle = self.vehicle_mut(id)?;
        if let Some(origin) = request.origin_override {
            vehicle.home = origin;
        }
        let home = vehicle.home;
        let route = presets::delivery(
            home,
            request.destination,
            self.config.default_altitude,
            self.config.loiter_time,
        );
        self.assign(id, request.task_id, route)?;
        Ok(id)
    }

    /// Replace the route of an assigned vehicle, mid-flight included. The
    /// active waypoint index is kept; guidance clamps it if it no longer fits.
    pub fn set_route(&mut self, id: VehicleId, route: Route) -> Result<(), FleetError> {
        let clock = self.clock;
        let vehicle = self.vehicle_mut(id)?;
        if vehicle.is_idle() {
            return Err(FleetError::NotAssigned(id));
        }
        let waypoints = route.len();
        vehicle.route = Some(route);
        publish(&mut self.observer, clock, id, EventKind::RouteReplaced { waypoints });
        Ok(())
    }

    pub fn set_gps_fix(&mut self, id: VehicleId, fix: bool) -> Result<(), FleetError> {
        self.vehicle_mut(id)?.gps_fix = fix;
        Ok(())
    }

    // -- Operator commands --------------------------------------------------

    pub fn arm(&mut self, id: VehicleId) -> Result<(), FleetError> {
        self.command(id, |vehicle, _, events| {
            if !vehicle.is_active() {
                vehicle.physics.last_tick = None;
            }
            arming::arm(vehicle, events)
        })
    }

    pub fn disarm(&mut self, id: VehicleId) -> Result<(), FleetError> {
        self.command(id, |vehicle, config, events| arming::disarm(vehicle, config, events))
    }

    pub fn set_mode(&mut self, id: VehicleId, mode: FlightMode) -> Result<(), FleetError> {
        self.command(id, |vehicle, _, events| arming::request_mode(vehicle, mode, events))
    }

    /// Run an operator command, publishing its events or its rejection.
    fn command<F>(&mut self, id: VehicleId, f: F) -> Result<(), FleetError>
    where
        F: FnOnce(&mut Vehicle, &FlightConfig, &mut Vec<EventKind>) -> Result<(), CommandRejected>,
    {
        let vehicle = self.vehicles.get_mut(&id).ok_or(FleetError::UnknownVehicle(id))?;
        let mut events = Vec::new();
        let result = f(vehicle, &self.config, &mut events);
        if result.is_ok() {
            vehicle.publish_telemetry();
        }
        for kind in events {
            publish(&mut self.observer, self.clock, id, kind);
        }
        if let Err(reason) = result {
            publish(&mut self.observer, self.clock, id, EventKind::Rejected(reason.clone()));
            return Err(reason.into());
        }
        Ok(())
    }

    // -- Manual control -----------------------------------------------------

    /// Route control input to one vehicle, or to none. Changing the selection
    /// releases every axis.
    pub fn select_manual(&mut self, id: Option<VehicleId>) -> Result<(), FleetError> {
        if let Some(id) = id {
            if !self.vehicles.contains_key(&id) {
                return Err(FleetError::UnknownVehicle(id));
            }
        }
        if self.manual != id {
            self.axes = ControlAxes::default();
        }
        self.manual = id;
        Ok(())
    }

    pub fn selected(&self) -> Option<VehicleId> {
        self.manual
    }

    pub fn set_axis(&mut self, action: Action, pressed: bool) {
        self.axes.set(action, pressed);
    }

    pub fn set_axes(&mut self, axes: ControlAxes) {
        self.axes = axes;
    }

    pub fn axes(&self) -> ControlAxes {
        self.axes
    }

    // -- Tick ---------------------------------------------------------------

    /// Advance every vehicle with a mission or running motors to `now`.
    ///
    /// Each vehicle is updated from its own state only and its notifications
    /// go out once its update is complete, so the iteration order has no
    /// effect on any vehicle's outcome.
    pub fn tick(&mut self, now: f64) {
        self.clock = now;
        let manual = self.manual;
        let axes = self.axes;

        for (id, vehicle) in self.vehicles.iter_mut() {
            if !vehicle.is_active() {
                continue;
            }
            let _span = info_span!("tick", vehicle = %id).entered();
            let input = (manual == Some(*id)).then_some(&axes);
            let outcome = integrator::step(vehicle, now, input, &self.config, &self.detectors);

            for kind in outcome.events {
                publish(&mut self.observer, now, *id, kind);
            }
            if let Some(task) = &outcome.completed_task {
                self.observer.on_task_completed(*id, task);
            }
            let telemetry = vehicle.publish_telemetry();
            self.observer.on_telemetry(*id, telemetry);
        }
    }
}
