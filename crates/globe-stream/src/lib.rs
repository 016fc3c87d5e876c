//! Dynamic globe tile streaming.
//!
//! Turns a camera moving above a spherical globe into three things the
//! renderer consumes: a regenerated index window over a coarse vertex grid,
//! a continuously refreshed set of raster tiles inside a fixed-capacity
//! texture array, and the small per-frame uniform block the globe shader
//! uses to map one onto the other. Tile fetching runs on background
//! threads; everything else happens on the frame thread.

pub mod config;
pub mod gpu;
pub mod service;
pub mod types;

mod fetch;

pub use config::MapConfig;
pub use service::{MapService, MapSurface};
pub use types::{FetchedTile, MapCamera, PendingTile, TileId, TileSettings};

use thiserror::Error;

/// Errors surfaced by the streaming service.
///
/// Network failures never appear here: a tile that fails to download is
/// logged and skipped, and its atlas layer keeps whatever it held before.
/// Decode failures are likewise local to one tile; the `Decode` variant is
/// reported per tile during drain, not propagated out of `update`.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Tile(#[from] slippy::SlippyError),

    #[error("invalid map configuration: {0}")]
    Config(String),

    #[error("tile decode failed: {0}")]
    Decode(#[from] image::ImageError),
}
