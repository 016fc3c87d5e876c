//! Toroidal assignment of window tiles to texture array layers.

use crate::window::TileWindow;
use crate::SlippyError;

/// Maps window-relative tile offsets to layers of a fixed-capacity texture
/// array.
///
/// The mapping is positional, not content-addressed: the window's own
/// wrapped top-left corner is the allocation origin, so a scrolling window
/// reuses layers without any per-tile bookkeeping. A tile that leaves the
/// window and later re-enters lands on whatever layer its new offset
/// dictates and is fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTable {
    origin_x: u32,
    origin_y: u32,
    tiles_per_axis: u32,
    count_y: u32,
}

impl SlotTable {
    /// Builds the slot table for `window`, verifying up front that every
    /// cell fits inside `max_layers`.
    ///
    /// The bound is a precondition on the configured zoom limits; a window
    /// that violates it must be rejected wholesale, keeping the previous
    /// layout, rather than writing past the end of the atlas.
    pub fn new(window: &TileWindow, max_layers: u32) -> Result<Self, SlippyError> {
        let required = window.width() * (window.count_y + 1);
        if required > max_layers {
            return Err(SlippyError::AtlasOverflow {
                required,
                capacity: max_layers,
            });
        }

        Ok(Self {
            origin_x: window.wrap_x(window.min_x),
            origin_y: window.clamp_y(window.min_y),
            tiles_per_axis: window.tiles_per_axis,
            count_y: window.count_y,
        })
    }

    /// Texture array layer owning tile `(x, y)`.
    ///
    /// Raw window coordinates are accepted and wrapped/clamped with the
    /// same rules the grid builder applies, so the two stay aligned per
    /// cell.
    pub fn layer_for(&self, x: i64, y: i64) -> u32 {
        let n = self.tiles_per_axis as i64;
        let valid_x = ((x % n) + n) % n;
        let valid_y = y.clamp(0, n - 1);
        let offset_x = ((valid_x - self.origin_x as i64 + n) % n) as u32;
        let offset_y = ((valid_y - self.origin_y as i64 + n) % n) as u32;
        offset_x * (self.count_y + 1) + offset_y
    }

    /// The wrapped/clamped window origin this table allocates from.
    pub fn origin(&self) -> (u32, u32) {
        (self.origin_x, self.origin_y)
    }
}
