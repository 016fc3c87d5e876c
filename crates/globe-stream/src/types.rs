//! Core data types for the streaming service, focused on what crosses the
//! thread and GPU boundaries.

use glam::DVec3;

/// Camera state for one `update` call. Supplied fresh each frame by the
/// caller and never retained; the position is expressed relative to the
/// unit sphere the globe mesh is built on.
#[derive(Debug, Clone, Copy)]
pub struct MapCamera {
    pub position: DVec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    /// Viewport width over height.
    pub aspect: f64,
}

impl MapCamera {
    /// Geodetic latitude/longitude (degrees) of the point under the camera.
    pub fn geodetic(&self) -> (f64, f64) {
        slippy::coord::camera_geodetic(self.position)
    }

    /// Height above the unit-sphere surface.
    pub fn altitude(&self) -> f64 {
        (self.position.length() - 1.0).max(0.0)
    }
}

/// A single slippy-tile address, already wrapped/clamped into the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A tile queued for background fetch, with its atlas layer fixed at
/// dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTile {
    pub id: TileId,
    pub layer: u32,
}

/// Result of a completed download, carried from a fetch thread to the
/// frame thread. The bytes are still PNG-compressed; decoding happens on
/// drain, on the frame thread.
#[derive(Debug)]
pub struct FetchedTile {
    pub id: TileId,
    pub layer: u32,
    /// Window generation the tile was dispatched under. A tile from a
    /// superseded generation is discarded on drain instead of overwriting
    /// a layer the current window owns.
    pub generation: u64,
    pub bytes: Vec<u8>,
}

/// Per-frame uniform block describing how the atlas maps onto the visible
/// window. Must match the layout of `TileSettings` in the globe shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileSettings {
    pub vertex_tiles_per_axis: u32,
    pub texture_tiles_per_axis: u32,
    pub min_tile_x: u32,
    pub min_tile_y: u32,
    pub tiles_count_y: u32,
    pub _pad: [u32; 3],
}
