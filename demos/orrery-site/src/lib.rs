use wasm_bindgen::prelude::*;
use orbit_rig::OrreryScene;

orbit_rig_web::export_scene!(OrreryScene, "orrery-site");
