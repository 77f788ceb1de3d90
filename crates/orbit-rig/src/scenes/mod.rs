pub mod orrery;

pub use orrery::{CameraMode, OrreryScene};
