use fleet_sim::config::FlightConfig;
use fleet_sim::physics::geodesy;
use fleet_sim::sim::runner::{Runner, TickRecord};
use fleet_sim::types::{
    EventKind, EventLog, FleetCoordinator, FlightMode, LatLng, TaskId, TaskRequest, VehicleId,
    VehicleStatus,
};

const HOME: LatLng = LatLng::new(18.5204, 73.8567);
const DEST: LatLng = LatLng::new(18.5304, 73.8767);

fn launch(dest: LatLng) -> (FleetCoordinator<EventLog>, VehicleId) {
    let cfg = FlightConfig::default().with_sim_speed(4.0);
    let mut fleet = FleetCoordinator::with_homes(cfg, EventLog::default(), &[HOME, HOME]);
    let id = fleet.dispatch(TaskRequest::new("T-0001", dest)).unwrap();
    fleet.arm(id).unwrap();
    fleet.set_mode(id, FlightMode::Auto).unwrap();
    (fleet, id)
}

fn event_time(log: &EventLog, id: VehicleId, pred: impl Fn(&EventKind) -> bool) -> Option<f64> {
    log.for_vehicle(id).find(|e| pred(&e.kind)).map(|e| e.time)
}

fn own(records: &[TickRecord], id: VehicleId) -> Vec<&TickRecord> {
    records.iter().filter(|r| r.vehicle == id).collect()
}

// ---------------------------------------------------------------------------
// Mission closure
// ---------------------------------------------------------------------------

#[test]
fn mission_closes_exactly_once() {
    let (mut fleet, id) = launch(geodesy::destination(&HOME, 60.0, 500.0));
    let mut saw_returning = false;
    Runner::new(0.05, 900.0).run_until(&mut fleet, |f| {
        let Some(v) = f.vehicle(id) else { return true };
        saw_returning |= v.physics.is_returning_home;
        v.is_idle()
    });

    let v = fleet.vehicle(id).unwrap();
    assert!(v.is_idle());
    assert!(v.route.is_none());
    assert!(v.task.is_none());
    assert!(!v.physics.armed);
    assert!(saw_returning, "is_returning_home never observed");
    assert_eq!(fleet.observer().completed, vec![(id, TaskId::from("T-0001"))]);

    let closes = fleet
        .observer()
        .for_vehicle(id)
        .filter(|e| e.kind == EventKind::MissionComplete)
        .count();
    assert_eq!(closes, 1);
}

#[test]
fn waypoint_index_is_monotonic_then_reset_once() {
    let (mut fleet, id) = launch(geodesy::destination(&HOME, 200.0, 400.0));
    let records = Runner::new(0.05, 900.0).run_until_idle(&mut fleet);
    let indices: Vec<i64> = own(&records, id).iter().map(|r| r.waypoint).collect();

    let first_reset = indices
        .iter()
        .position(|&i| i == -1)
        .expect("index never reset");
    assert!(first_reset > 0);
    assert!(indices[..first_reset].windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(indices[first_reset - 1], 4);
    assert!(indices[first_reset..].iter().all(|&i| i == -1));
}

#[test]
fn idle_vehicle_never_changes() {
    let (mut fleet, id) = launch(geodesy::destination(&HOME, 0.0, 300.0));
    let bystander = VehicleId(2);
    assert_ne!(id, bystander);
    let before = fleet.vehicle(bystander).unwrap().physics.clone();

    let records = Runner::new(0.05, 60.0).run_until(&mut fleet, |_| false);

    let after = &fleet.vehicle(bystander).unwrap().physics;
    assert_eq!(after.position, before.position);
    assert_eq!(after.battery_percent, before.battery_percent);
    assert_eq!(after.altitude, before.altitude);
    assert!(own(&records, bystander).is_empty());
}

// ---------------------------------------------------------------------------
// Concrete delivery across town
// ---------------------------------------------------------------------------

#[test]
fn concrete_scenario() {
    let (mut fleet, id) = launch(DEST);
    let sim_speed = fleet.config().sim_speed;
    let records = Runner::new(0.05, 1_800.0).run_until_idle(&mut fleet);
    let own = own(&records, id);

    // Climb happens over the pad
    let first_leg = own.iter().find(|r| r.waypoint >= 1).unwrap();
    assert!(first_leg.telemetry.altitude > 97.0, "alt {}", first_leg.telemetry.altitude);
    assert!(geodesy::distance(&HOME, &first_leg.telemetry.position()) < 15.0);

    let max_alt = own.iter().map(|r| r.telemetry.altitude).fold(0.0_f64, f64::max);
    assert!((max_alt - 100.0).abs() < 3.0, "max alt {}", max_alt);

    // Arrival at the destination
    let arrived = own
        .iter()
        .find(|r| geodesy::distance(&DEST, &r.telemetry.position()) < 15.0)
        .expect("destination never reached");
    let leg = geodesy::distance(&HOME, &DEST);
    assert!(arrived.time * sim_speed < 2.0 * leg / 15.0);
    assert!(arrived.time < leg / 15.0);

    // LAND, then the 3 s wait, then RTL
    let log = fleet.observer();
    let landed = event_time(log, id, |k| matches!(k, EventKind::DeliveryLanded { .. })).unwrap();
    let rtl = event_time(log, id, |k| *k == EventKind::RtlInitiated).unwrap();
    let waited = (rtl - landed) * sim_speed;
    assert!(waited >= 3.0 - 1e-6 && waited < 3.5, "waited {}", waited);
    assert!(log.for_vehicle(id).any(|e| e.kind
        == EventKind::ModeChanged { from: FlightMode::Auto, to: FlightMode::Rtl }));

    // Home, disarmed, idle
    let v = fleet.vehicle(id).unwrap();
    assert!(geodesy::distance(&HOME, &v.physics.position) < 5.0);
    assert!(v.physics.altitude < fleet.config().landed_altitude);
    assert!(!v.physics.armed);
    assert_eq!(v.status, VehicleStatus::Idle);
    assert!(v.physics.battery_percent < 100.0 && v.physics.battery_percent > 50.0);
}

// ---------------------------------------------------------------------------
// Route replacement while flying
// ---------------------------------------------------------------------------

fn short_route(dest: LatLng) -> fleet_sim::vehicle::Route {
    use fleet_sim::vehicle::{Command, RouteBuilder, WaypointBuilder};
    RouteBuilder::new()
        .step(WaypointBuilder::new(Command::Takeoff, HOME).altitude(60.0))
        .step(WaypointBuilder::new(Command::Waypoint, dest).altitude(60.0))
        .step(WaypointBuilder::new(Command::Land, dest))
        .build()
}

#[test]
fn replacing_route_at_index_two_lands_at_new_destination() {
    let (mut fleet, id) = launch(geodesy::destination(&HOME, 90.0, 800.0));
    let runner = Runner::new(0.05, 900.0);
    runner.run_until(&mut fleet, |f| f.vehicle(id).map_or(true, |v| v.physics.waypoint_index() == 2));
    assert_eq!(fleet.vehicle(id).unwrap().physics.waypoint_index(), 2);

    let new_dest = geodesy::destination(&HOME, 0.0, 300.0);
    fleet.set_route(id, short_route(new_dest)).unwrap();

    let mut delivered_at = None;
    let rest = Runner { start: fleet.clock() + 0.05, ..runner };
    rest.run_until(&mut fleet, |f| {
        let v = f.vehicle(id).unwrap();
        if delivered_at.is_none() && v.status == VehicleStatus::Completed {
            delivered_at = Some(v.physics.position);
        }
        v.is_idle()
    });

    let landed = delivered_at.expect("never delivered");
    assert!(geodesy::distance(&landed, &new_dest) < 15.0);
    assert!(fleet.vehicle(id).unwrap().is_idle());
    assert_eq!(fleet.observer().completed.len(), 1);
    assert!(fleet.observer().warnings().next().is_none());
}

#[test]
fn return_to_launch_step_is_flown_through() {
    use fleet_sim::vehicle::{Command, RouteBuilder, WaypointBuilder};

    let dest = geodesy::destination(&HOME, 120.0, 300.0);
    let route = RouteBuilder::new()
        .step(WaypointBuilder::new(Command::Takeoff, HOME).altitude(100.0))
        .step(WaypointBuilder::new(Command::ReturnToLaunch, HOME).altitude(100.0))
        .step(WaypointBuilder::new(Command::Waypoint, dest).altitude(100.0))
        .step(WaypointBuilder::new(Command::Land, dest))
        .build();

    let cfg = FlightConfig::default().with_sim_speed(4.0);
    let mut fleet = FleetCoordinator::with_homes(cfg, EventLog::default(), &[HOME]);
    let id = VehicleId(1);
    fleet.assign(id, TaskId::from("T-RTL"), route).unwrap();
    fleet.arm(id).unwrap();
    fleet.set_mode(id, FlightMode::Auto).unwrap();
    Runner::new(0.05, 900.0).run_until_idle(&mut fleet);

    let log = fleet.observer();
    assert!(log.for_vehicle(id).any(|e| e.kind
        == EventKind::WaypointAdvanced { index: 2, command: Command::Waypoint }));
    assert!(log.for_vehicle(id).any(|e| matches!(e.kind, EventKind::DeliveryLanded { .. })));
    assert_eq!(log.completed, vec![(id, TaskId::from("T-RTL"))]);
    assert!(fleet.vehicle(id).unwrap().is_idle());
}

#[test]
fn shorter_route_clamps_index_with_warning() {
    let (mut fleet, id) = launch(geodesy::destination(&HOME, 90.0, 800.0));
    let runner = Runner::new(0.05, 900.0);
    runner.run_until(&mut fleet, |f| f.vehicle(id).map_or(true, |v| v.physics.waypoint_index() == 3));

    let new_dest = geodesy::destination(&HOME, 0.0, 300.0);
    fleet.set_route(id, short_route(new_dest)).unwrap();
    fleet.tick(fleet.clock() + 0.05);

    let v = fleet.vehicle(id).unwrap();
    assert_eq!(v.physics.waypoint_index(), 2);
    let clamps: Vec<_> = fleet.observer().warnings().collect();
    assert_eq!(clamps.len(), 1);
    assert_eq!(clamps[0].kind, EventKind::WaypointClamped { index: 3, len: 3 });
}

// ---------------------------------------------------------------------------
// Simulation speed
// ---------------------------------------------------------------------------

struct Flight {
    /// Waypoint index and position each time the index changed.
    advances: Vec<(i64, LatLng)>,
    delivered_at: LatLng,
    sim_time: f64,
}

fn fly_delivery(sim_speed: f64) -> Flight {
    let cfg = FlightConfig::default().with_sim_speed(sim_speed);
    let mut fleet = FleetCoordinator::with_homes(cfg, EventLog::default(), &[HOME]);
    let dest = geodesy::destination(&HOME, 30.0, 400.0);
    let id = fleet.dispatch(TaskRequest::new("T-0001", dest)).unwrap();
    fleet.arm(id).unwrap();
    fleet.set_mode(id, FlightMode::Auto).unwrap();

    let mut advances: Vec<(i64, LatLng)> = Vec::new();
    Runner::new(0.05, 900.0).run_until(&mut fleet, |f| {
        let v = f.vehicle(id).unwrap();
        let index = v.physics.waypoint_index();
        if advances.last().map_or(true, |(last, _)| *last != index) {
            advances.push((index, v.physics.position));
        }
        v.status == VehicleStatus::Completed
    });

    let v = fleet.vehicle(id).unwrap();
    assert_eq!(v.status, VehicleStatus::Completed);
    Flight { advances, delivered_at: v.physics.position, sim_time: fleet.clock() * sim_speed }
}

#[test]
fn sim_speed_keeps_path_shape() {
    let slow = fly_delivery(1.0);
    let fast = fly_delivery(4.0);

    let indices = |f: &Flight| f.advances.iter().map(|(i, _)| *i).collect::<Vec<_>>();
    assert_eq!(indices(&slow), vec![0, 1, 2, 3, 4]);
    assert_eq!(indices(&slow), indices(&fast));

    for ((index, a), (_, b)) in slow.advances.iter().zip(&fast.advances) {
        let gap = geodesy::distance(a, b);
        assert!(gap < 5.0, "index {} advanced {} m apart", index, gap);
    }
    assert!(geodesy::distance(&slow.delivered_at, &fast.delivered_at) < 1.0);

    // Same mission in simulated seconds, a quarter of the wall clock
    assert!((slow.sim_time - fast.sim_time).abs() < 3.0, "{} vs {}", slow.sim_time, fast.sim_time);
}
