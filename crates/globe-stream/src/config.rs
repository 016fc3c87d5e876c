//! Service configuration.

use crate::types::TileId;
use crate::MapError;
use std::time::Duration;

/// Hard ceiling of the Web-Mercator pyramid this service understands.
pub const MAX_SUPPORTED_ZOOM: u8 = 20;

/// Tunables for the streaming service.
///
/// All of these were compile-time constants in earlier revisions; a caller
/// now supplies them once at construction and [`MapConfig::validate`]
/// rejects combinations that would otherwise fail deep in the per-frame
/// path.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Tile server base URL; tiles are fetched from
    /// `{base}/{zoom}/{x}/{y}.png`.
    pub tile_server_url: String,
    /// Edge length of one square tile in pixels.
    pub tile_size_px: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Floor for the zoom that drives mesh density; imagery zoom may be
    /// finer.
    pub min_vertex_zoom: u8,
    /// Layer capacity of the atlas texture array.
    pub max_atlas_layers: u32,
    /// Minimum interval between texture-window commits triggered by camera
    /// movement alone; a zoom change commits immediately.
    pub debounce: Duration,
    /// Per-request cap on a single tile fetch. Bounds how long shutdown can
    /// wait on an in-flight request.
    pub fetch_timeout: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_server_url: "https://tile.openstreetmap.org".to_string(),
            tile_size_px: 256,
            min_zoom: 1,
            max_zoom: 20,
            min_vertex_zoom: 6,
            max_atlas_layers: 2048,
            debounce: Duration::from_millis(1500),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl MapConfig {
    pub fn validate(&self) -> Result<(), MapError> {
        if self.tile_server_url.is_empty() {
            return Err(MapError::Config("tile server URL is empty".into()));
        }
        if self.tile_size_px == 0 {
            return Err(MapError::Config("tile size must be nonzero".into()));
        }
        if self.max_atlas_layers == 0 {
            return Err(MapError::Config("atlas layer capacity must be nonzero".into()));
        }
        if self.min_zoom == 0 || self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "zoom bounds {}..{} are not ordered from 1",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(MapError::Config(format!(
                "max zoom {} exceeds supported ceiling {}",
                self.max_zoom, MAX_SUPPORTED_ZOOM
            )));
        }
        if self.min_vertex_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "min vertex zoom {} exceeds max zoom {}",
                self.min_vertex_zoom, self.max_zoom
            )));
        }
        Ok(())
    }

    pub(crate) fn tile_url(&self, id: TileId) -> String {
        format!(
            "{}/{}/{}/{}.png",
            self.tile_server_url.trim_end_matches('/'),
            id.zoom,
            id.x,
            id.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(MapConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_zoom_bounds_are_rejected() {
        let config = MapConfig {
            min_zoom: 12,
            max_zoom: 8,
            ..MapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn vertex_zoom_above_ceiling_is_rejected() {
        let config = MapConfig {
            min_vertex_zoom: 21,
            ..MapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tile_url_follows_the_pyramid_path_pattern() {
        let config = MapConfig {
            tile_server_url: "http://tiles.example/".to_string(),
            ..MapConfig::default()
        };
        let id = TileId { zoom: 10, x: 550, y: 335 };
        assert_eq!(config.tile_url(id), "http://tiles.example/10/550/335.png");
    }
}
