use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use fleet_sim::config::FlightConfig;
use fleet_sim::io::json::MissionSummary;
use fleet_sim::physics::geodesy;
use fleet_sim::sim::runner::Runner;
use fleet_sim::types::{EventLog, FleetCoordinator, FlightMode, LatLng, Severity, TaskRequest};

fn main() -> Result<()> {
    setup_logging();

    // Demo runs at 4x unless the file or FLEETSIM_SIM_SPEED says otherwise
    let base = FlightConfig::default().with_sim_speed(4.0);
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = FlightConfig::load_over(&base, path.as_deref())
        .with_context(|| match &path {
            Some(path) => format!("loading {}", path.display()),
            None => "loading configuration".to_string(),
        })?;

    // -----------------------------------------------------------------------
    // Scenario: two vehicles at one base, a single delivery across town
    // -----------------------------------------------------------------------
    let home = LatLng::new(18.5204, 73.8567);
    let destination = LatLng::new(18.5304, 73.8767);

    let mut fleet = FleetCoordinator::with_homes(config, EventLog::default(), &[home, home]);
    let id = fleet.dispatch(TaskRequest::new("T-0001", destination))?;
    fleet.arm(id)?;
    fleet.set_mode(id, FlightMode::Auto)?;

    let route_length = fleet
        .vehicle(id)
        .and_then(|v| v.route.as_ref())
        .map(|r| r.length())
        .unwrap_or_default();

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let runner = Runner::new(0.05, 1_800.0);
    let records = runner.run_until_idle(&mut fleet);
    let summary = MissionSummary::from_records(id, &records)
        .context("dispatched vehicle produced no telemetry")?;

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    let cfg = fleet.config();
    let log = fleet.observer();

    println!();
    println!("====================================================================");
    println!("  FLEET DELIVERY SIMULATION - {} vehicles", fleet.len());
    println!("====================================================================");
    println!();
    println!("  Scenario");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Home:          {:>9.4}, {:>9.4}   Destination: {:>9.4}, {:>9.4}",
        home.lat, home.lng, destination.lat, destination.lng
    );
    println!(
        "  Leg distance:  {:>8.0} m     Route length: {:>8.0} m",
        geodesy::distance(&home, &destination),
        route_length
    );
    println!(
        "  Cruise speed:  {:>8.1} m/s   Altitude:     {:>8.0} m",
        cfg.cruise_speed, cfg.default_altitude
    );
    println!("  Sim speed:     {:>8.1} x", cfg.sim_speed);
    println!();

    println!("  Flight Events ({})", id);
    println!("  ──────────────────────────────────────────────────────────────────");
    for event in log.for_vehicle(id) {
        let marker = match event.severity() {
            Severity::Info => " ",
            Severity::Warning => "!",
        };
        println!("  {} t={:>7.2}s   {}", marker, event.time, event.kind);
    }
    println!();

    println!("  Mission Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Max altitude:  {:>8.1} m", summary.max_altitude_m);
    println!("  Max speed:     {:>8.1} m/s", summary.max_speed_ms);
    println!("  Distance:      {:>8.0} m", summary.distance_flown_m);
    println!(
        "  Flight time:   {:>8.1} s (wall clock, x{} sim)",
        summary.flight_time_s, cfg.sim_speed
    );
    println!("  Battery used:  {:>8.2} %", summary.battery_used_percent);
    println!("  Final status:  {:>8}", summary.final_status);
    println!(
        "  Deliveries:    {:>8}",
        log.completed.iter().filter(|(v, _)| *v == id).count()
    );
    println!();

    println!("  Fleet");
    println!("  ──────────────────────────────────────────────────────────────────");
    for v in fleet.vehicles() {
        println!(
            "  {}  {:<8}  {:<10}  {:>6.1} m  {:>5.1} %  {}",
            v.id,
            v.physics.mode,
            v.status,
            v.physics.altitude,
            v.physics.battery_percent,
            v.display_color
        );
    }
    println!();
    println!("  Simulation: {} samples, cadence={} s", records.len(), runner.cadence);
    println!("====================================================================");
    println!();

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .try_init();
}
