//! Frame buffer layout.
//! Must stay in sync with TypeScript `protocol.ts`.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 12 floats]
//! [Camera pose: 8 floats]
//! [Bodies: max_bodies × 6 floats]
//! [Hub markers: max_hubs × 8 floats]
//! [Events: max_events × 4 floats]
//! ```
//!
//! Capacities are written into the header every frame.
//! TypeScript reads them from the header to compute offsets dynamically.

use crate::api::config::SceneConfig;
use crate::api::scene::EngineContext;
use crate::api::types::{BodyInstance, EngineEvent, HubMarker};
use crate::camera::rig::CameraPose;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PHASE: usize = 2;
pub const HEADER_MODE: usize = 3;
pub const HEADER_SIM_TIME: usize = 4;
pub const HEADER_MAX_BODIES: usize = 5;
pub const HEADER_BODY_COUNT: usize = 6;
pub const HEADER_MAX_HUBS: usize = 7;
pub const HEADER_MARKER_COUNT: usize = 8;
pub const HEADER_MAX_EVENTS: usize = 9;
pub const HEADER_EVENT_COUNT: usize = 10;
pub const HEADER_DROPPED_EVENTS: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_bodies: usize,
    pub max_hubs: usize,
    pub max_events: usize,

    /// Offset (in floats) where the camera pose begins.
    pub pose_offset: usize,
    /// Offset (in floats) where body data begins.
    pub body_data_offset: usize,
    /// Offset (in floats) where marker data begins.
    pub marker_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_bodies: usize, max_hubs: usize, max_events: usize) -> Self {
        let pose_offset = HEADER_FLOATS;
        let body_data_offset = pose_offset + CameraPose::FLOATS;
        let marker_data_offset = body_data_offset + max_bodies * BodyInstance::FLOATS;
        let event_data_offset = marker_data_offset + max_hubs * HubMarker::FLOATS;
        let buffer_total_floats = event_data_offset + max_events * EngineEvent::FLOATS;

        Self {
            max_bodies,
            max_hubs,
            max_events,
            pose_offset,
            body_data_offset,
            marker_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a SceneConfig.
    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.max_bodies, config.max_hubs, config.max_events)
    }

    /// A zeroed buffer of the right size.
    pub fn allocate(&self) -> Vec<f32> {
        vec![0.0; self.buffer_total_floats]
    }

    /// Pack one frame of engine state into `buf`. Sections beyond their
    /// capacity are truncated; dropped events are counted in the header.
    pub fn write_frame(&self, buf: &mut Vec<f32>, frame: u32, ctx: &EngineContext) {
        if buf.len() != self.buffer_total_floats {
            buf.resize(self.buffer_total_floats, 0.0);
        }

        let bodies = &ctx.bodies[..ctx.bodies.len().min(self.max_bodies)];
        let markers = &ctx.markers[..ctx.markers.len().min(self.max_hubs)];
        let events = &ctx.events[..ctx.events.len().min(self.max_events)];
        let dropped = ctx.events.len() - events.len();
        if dropped > 0 {
            log::warn!("protocol: {dropped} events over capacity {} dropped", self.max_events);
        }

        buf[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        buf[HEADER_FRAME_COUNTER] = frame as f32;
        buf[HEADER_PHASE] = ctx.phase;
        buf[HEADER_MODE] = ctx.mode;
        buf[HEADER_SIM_TIME] = ctx.sim_time as f32;
        buf[HEADER_MAX_BODIES] = self.max_bodies as f32;
        buf[HEADER_BODY_COUNT] = bodies.len() as f32;
        buf[HEADER_MAX_HUBS] = self.max_hubs as f32;
        buf[HEADER_MARKER_COUNT] = markers.len() as f32;
        buf[HEADER_MAX_EVENTS] = self.max_events as f32;
        buf[HEADER_EVENT_COUNT] = events.len() as f32;
        buf[HEADER_DROPPED_EVENTS] = dropped as f32;

        copy_section(buf, self.pose_offset, std::slice::from_ref(ctx.rig.pose()));
        copy_section(buf, self.body_data_offset, bodies);
        copy_section(buf, self.marker_data_offset, markers);
        copy_section(buf, self.event_data_offset, events);
    }
}

fn copy_section<T: bytemuck::Pod>(buf: &mut [f32], offset: usize, items: &[T]) {
    let floats: &[f32] = bytemuck::cast_slice(items);
    buf[offset..offset + floats.len()].copy_from_slice(floats);
}
