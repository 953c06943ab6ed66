pub mod arming;
pub mod guidance;
pub mod manual;

pub use guidance::change_mode;
pub use manual::{Action, ControlAxes};
