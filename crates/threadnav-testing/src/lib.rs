//! Testing fixtures for threadnav

pub mod fixtures;

pub use fixtures::*;

pub mod prelude {
    pub use crate::fixtures::*;
    pub use threadnav_runtime_std::{HostLoop, ManualClock};
}
