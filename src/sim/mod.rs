pub mod event;
pub mod fleet;
pub mod integrator;
pub mod runner;

pub use event::{EventDetector, EventKind, FlightEvent, Severity};
pub use fleet::{EventLog, FleetCoordinator, FleetObserver, NullObserver, TaskRequest};
pub use integrator::{step, TickOutcome};
pub use runner::{run_realtime, Runner, TickRecord};
