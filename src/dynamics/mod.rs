pub mod kinematics;
pub mod state;

pub use kinematics::{integrate, Horizontal, Target};
pub use state::{FlightMode, PhysicsState, EARTH_RADIUS};
