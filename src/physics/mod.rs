pub mod battery;
pub mod geodesy;

pub use geodesy::{bearing, destination, distance, LatLng};
