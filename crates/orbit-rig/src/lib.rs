pub mod api;
pub mod bridge;
pub mod camera;
pub mod catalog;
pub mod core;
pub mod error;
pub mod extensions;
pub mod geo;
pub mod input;
pub mod orbit;
pub mod scenes;
pub mod tunnel;

// Re-export key types at crate root for convenience
pub use api::config::SceneConfig;
pub use api::scene::{EngineContext, Polyline, Scene};
pub use api::types::{BodyInstance, EngineEvent, EventKind, HubMarker};
pub use bridge::protocol::ProtocolLayout;
pub use camera::choreographer::{CameraChoreographer, ChoreographyConfig, ChoreographyPhase, FlightConfig, IntroConfig};
pub use camera::controls::{OrbitControls, OrbitControlsConfig};
pub use camera::gate::{is_input_accepted, ControlIntent, InteractionGate};
pub use camera::rig::{CameraDriver, CameraPose, CameraRig};
pub use catalog::Catalog;
pub use crate::core::cancel::CancelToken;
pub use crate::core::time::{FixedTimestep, SimClock};
pub use error::{ConfigError, ConfigResult};
pub use geo::{surface_point, GeoBounds, HubDescriptor};
pub use input::queue::{custom, InputEvent, InputQueue};
pub use orbit::registry::{BodyKind, OrbitingBody, OrbitingBodyRegistry, RegistrySnapshot};
pub use orbit::solver::OrbitalParameters;
pub use scenes::{CameraMode, OrreryScene};
pub use tunnel::path::TunnelPathPlanner;
pub use tunnel::traversal::{TraversalCameraDriver, TraversalState, TravelConfig};

// Extensions — standalone helpers
pub use extensions::{ease_vec3, lerp, lerp_vec3, Cue, Easing, Rng, Timeline};
