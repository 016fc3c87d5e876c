//! Slippy-tile math for a camera orbiting a spherical globe.
//!
//! Pure functions and plain values only: no I/O, no threads, no GPU types.
//!
//! - [`coord`]: longitude/latitude ↔ tile indices under the standard
//!   Web-Mercator pyramid, camera geodesy on the unit sphere.
//! - [`window`]: the rectangular (possibly antimeridian-crossing) tile range
//!   visible from a camera position.
//! - [`grid`]: triangle-index generation over a fixed `(n+1)²` vertex grid
//!   covering a window.
//! - [`atlas`]: toroidal assignment of window tiles to layers of a
//!   fixed-capacity texture array.
//!
//! Conventions: columns (x) wrap modulo `tiles_per_axis`, rows (y) clamp to
//! `[0, tiles_per_axis)`. Window math deliberately keeps raw, unwrapped
//! indices; wrapping and clamping happen once, at consumption.

pub mod atlas;
pub mod coord;
pub mod grid;
pub mod window;

pub use atlas::SlotTable;
pub use window::TileWindow;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SlippyError {
    /// The requested pyramid level does not exist under the configured
    /// zoom ceiling.
    #[error("zoom {zoom} exceeds configured maximum {max_zoom}")]
    InvalidZoom { zoom: u8, max_zoom: u8 },

    /// The tile window needs more array layers than the atlas has. The
    /// window width times `count_y + 1` must stay within capacity; this is
    /// a precondition on the configured zoom limits, checked when the
    /// window is committed.
    #[error("tile window needs {required} atlas layers, capacity is {capacity}")]
    AtlasOverflow { required: u32, capacity: u32 },
}
