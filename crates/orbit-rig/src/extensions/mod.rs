// extensions/mod.rs
//
// Small standalone helpers the scenes opt into.
// None of them know about the camera rig or the registry.

pub mod easing;
pub mod rng;
pub mod timeline;

pub use easing::{ease_vec3, lerp, lerp_vec3, Easing};
pub use rng::Rng;
pub use timeline::{Cue, Timeline};
