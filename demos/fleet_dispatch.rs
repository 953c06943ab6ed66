//! Two concurrent deliveries, one of them taken over by the operator after
//! the drop and brought home with an explicit RTL. Telemetry goes to
//! `fleet_dispatch.csv`, summaries to `fleet_dispatch.json`.

use anyhow::Result;

use fleet_sim::config::FlightConfig;
use fleet_sim::io::{csv, json};
use fleet_sim::sim::runner::Runner;
use fleet_sim::types::{
    Action, EventLog, FleetCoordinator, FlightMode, LatLng, TaskRequest, VehicleStatus,
};

fn main() -> Result<()> {
    let base = LatLng::new(18.5204, 73.8567);
    let config = FlightConfig::default().with_sim_speed(8.0);
    let mut fleet = FleetCoordinator::with_homes(config, EventLog::default(), &[base, base, base]);

    let a = fleet.dispatch(TaskRequest::new("T-100", LatLng::new(18.5304, 73.8767)))?;
    let b = fleet.dispatch(TaskRequest::new("T-101", LatLng::new(18.5104, 73.8467)))?;
    for id in [a, b] {
        fleet.arm(id)?;
        fleet.set_mode(id, FlightMode::Auto)?;
    }

    let runner = Runner::new(0.05, 900.0);

    // Fly until the first vehicle has dropped its parcel
    let mut records = runner.run_until(&mut fleet, |f| {
        f.vehicle(a).is_some_and(|v| v.status == VehicleStatus::Completed)
    });

    // Nudge it off the pad by hand, then send it home
    fleet.select_manual(Some(a))?;
    fleet.set_axis(Action::Up, true);
    let resume = Runner { start: fleet.clock() + 0.05, cadence: 0.05, max_time: 2.0 };
    records.extend(resume.run_until(&mut fleet, |_| false));
    fleet.set_axis(Action::Up, false);
    fleet.select_manual(None)?;
    fleet.set_mode(a, FlightMode::Rtl)?;

    let rest = Runner { start: fleet.clock() + 0.05, ..runner };
    records.extend(rest.run_until_idle(&mut fleet));

    csv::write_trajectory_file("fleet_dispatch.csv", &records)?;
    let summaries: Vec<_> = [a, b]
        .into_iter()
        .filter_map(|id| json::MissionSummary::from_records(id, &records))
        .collect();
    json::write_summary_file("fleet_dispatch.json", &summaries)?;

    for s in &summaries {
        println!(
            "{}  {:>7.0} m flown  {:>6.2} % battery  {}",
            s.vehicle, s.distance_flown_m, s.battery_used_percent, s.final_status
        );
    }
    println!("{} deliveries completed", fleet.observer().completed.len());
    Ok(())
}
