pub mod runner;

pub use runner::SceneRunner;

// Re-exported so `export_scene!` expands without extra dependencies in the
// calling crate (beyond wasm-bindgen itself).
pub use console_error_panic_hook;
pub use console_log;
pub use js_sys;
pub use log;
pub use orbit_rig;
pub use wasm_bindgen;
pub use web_sys;

/// Generate all `#[wasm_bindgen]` exports for a scene.
///
/// Generates:
/// - `thread_local!` storage for the SceneRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (scene_init, scene_tick, input handlers, hub
///   selection, config/catalog loading, unmount, data accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use orbit_rig::OrreryScene;
///
/// orbit_rig_web::export_scene!(OrreryScene, "orrery-site");
/// ```
///
/// # Arguments
///
/// - `$scene_type`: a type implementing `orbit_rig::Scene` with a `new()` constructor
/// - `$scene_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_scene {
    ($scene_type:ty, $scene_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::SceneRunner<$scene_type>>> = RefCell::new(None);
        }

        /// Runs `f` against the live runner. Before `scene_init` (or after
        /// `scene_unmount`) there is none; the logger may not exist yet either,
        /// so this reports straight to the browser console.
        fn with_runner<R>(f: impl FnOnce(&mut $crate::SceneRunner<$scene_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                match borrow.as_mut() {
                    Some(runner) => Some(f(runner)),
                    None => {
                        $crate::web_sys::console::warn_1(&$crate::wasm_bindgen::JsValue::from_str(
                            concat!($scene_name, ": scene not initialized, call scene_init() first"),
                        ));
                        None
                    }
                }
            })
        }

        fn to_js_error(err: $crate::orbit_rig::ConfigError) -> $crate::wasm_bindgen::JsValue {
            $crate::wasm_bindgen::JsValue::from_str(&err.to_string())
        }

        #[wasm_bindgen]
        pub fn scene_init() {
            $crate::console_error_panic_hook::set_once();
            let _ = $crate::console_log::init_with_level($crate::log::Level::Info);

            let mut runner = $crate::SceneRunner::new(<$scene_type>::new());
            runner.init();

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });
            $crate::log::info!("{}: initialized", $scene_name);
        }

        #[wasm_bindgen]
        pub fn scene_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        /// Cancel the scene and drop it. Safe to call more than once.
        #[wasm_bindgen]
        pub fn scene_unmount() {
            let runner = RUNNER.with(|cell| cell.borrow_mut().take());
            if let Some(mut runner) = runner {
                runner.unmount();
            }
        }

        // ---- Input ----

        #[wasm_bindgen]
        pub fn scene_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input($crate::orbit_rig::InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn scene_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input($crate::orbit_rig::InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn scene_pointer_move(x: f32, y: f32) {
            with_runner(|r| r.push_input($crate::orbit_rig::InputEvent::PointerMove { x, y }));
        }

        #[wasm_bindgen]
        pub fn scene_scroll(delta: f32) {
            with_runner(|r| r.push_input($crate::orbit_rig::InputEvent::Scroll { delta }));
        }

        #[wasm_bindgen]
        pub fn scene_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input($crate::orbit_rig::InputEvent::Custom { kind, a, b, c }));
        }

        #[wasm_bindgen]
        pub fn scene_start_traversal() {
            scene_custom_event($crate::orbit_rig::custom::START_TRAVERSAL, 0.0, 0.0, 0.0);
        }

        #[wasm_bindgen]
        pub fn scene_cancel_traversal() {
            scene_custom_event($crate::orbit_rig::custom::CANCEL_TRAVERSAL, 0.0, 0.0, 0.0);
        }

        /// Fly to a hub by id. Returns false for unknown ids or when the
        /// camera is busy (intro, traversal).
        #[wasm_bindgen]
        pub fn scene_select_hub(id: &str) -> bool {
            with_runner(|r| r.select_hub(id)).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn scene_hub_ids() -> $crate::js_sys::Array {
            with_runner(|r| r.hub_ids())
                .unwrap_or_default()
                .into_iter()
                .map($crate::wasm_bindgen::JsValue::from)
                .collect()
        }

        // ---- Configuration ----

        #[wasm_bindgen]
        pub fn scene_load_config(json: &str) -> Result<(), $crate::wasm_bindgen::JsValue> {
            with_runner(|r| r.load_config(json).map_err(to_js_error))
                .unwrap_or_else(|| Err($crate::wasm_bindgen::JsValue::from_str("scene not initialized")))
        }

        #[wasm_bindgen]
        pub fn scene_load_catalog(json: &str) -> Result<(), $crate::wasm_bindgen::JsValue> {
            with_runner(|r| r.load_catalog(json).map_err(to_js_error))
                .unwrap_or_else(|| Err($crate::wasm_bindgen::JsValue::from_str("scene not initialized")))
        }

        // ---- Static geometry (flat xyz) ----

        #[wasm_bindgen]
        pub fn scene_orbit_path(body_index: u32, samples: u32) -> Vec<f32> {
            with_runner(|r| r.polyline($crate::orbit_rig::Polyline::Orbit, body_index as usize, samples as usize))
                .unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn scene_region_outline(hub_index: u32, samples_per_edge: u32) -> Vec<f32> {
            with_runner(|r| r.polyline($crate::orbit_rig::Polyline::Region, hub_index as usize, samples_per_edge as usize))
                .unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn scene_tunnel_path(samples: u32) -> Vec<f32> {
            with_runner(|r| r.polyline($crate::orbit_rig::Polyline::Tunnel, 0, samples as usize))
                .unwrap_or_default()
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_frame_ptr() -> *const f32 {
            with_runner(|r| r.frame_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_camera_pose_ptr() -> *const f32 {
            with_runner(|r| r.camera_pose_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_events_ptr() -> *const f32 {
            with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_events_len() -> u32 {
            with_runner(|r| r.events_len()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_bodies_ptr() -> *const f32 {
            with_runner(|r| r.bodies_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_body_count() -> u32 {
            with_runner(|r| r.body_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_markers_ptr() -> *const f32 {
            with_runner(|r| r.markers_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_marker_count() -> u32 {
            with_runner(|r| r.marker_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_phase() -> f32 {
            with_runner(|r| r.phase()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_mode() -> f32 {
            with_runner(|r| r.mode()).unwrap_or(0.0)
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn get_max_bodies() -> u32 {
            with_runner(|r| r.max_bodies()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_max_hubs() -> u32 {
            with_runner(|r| r.max_hubs()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats()).unwrap_or(0)
        }
    };
}
