pub mod choreographer;
pub mod controls;
pub mod gate;
pub mod rig;
