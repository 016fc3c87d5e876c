//! Longitude/latitude ↔ slippy-tile conversions and camera geodesy.

use crate::SlippyError;
use glam::DVec3;
use std::f64::consts::PI;

/// Number of tiles spanning one axis of the globe at `zoom`, with the zoom
/// clamped into `[min_zoom, max_zoom]`.
///
/// A zoom beyond `max_zoom` is rejected rather than clamped: the caller
/// asked for a pyramid level that does not exist.
pub fn tiles_per_axis(zoom: u8, min_zoom: u8, max_zoom: u8) -> Result<u32, SlippyError> {
    if zoom > max_zoom {
        return Err(SlippyError::InvalidZoom { zoom, max_zoom });
    }
    Ok(1u32 << zoom.clamp(min_zoom, max_zoom))
}

/// Tile column containing `lon_deg` at a level with `tiles_per_axis`
/// columns.
///
/// Unclamped: `lon = 180°` yields `tiles_per_axis` itself, which consumers
/// wrap back to column 0.
#[inline]
pub fn lon_to_tile_x(lon_deg: f64, tiles_per_axis: u32) -> i64 {
    ((lon_deg + 180.0) / 360.0 * tiles_per_axis as f64).floor() as i64
}

/// Tile row containing `lat_deg` (standard Web-Mercator projection).
///
/// Unclamped: latitudes past the Mercator cutoff land outside
/// `[0, tiles_per_axis)` and are clamped by consumers.
#[inline]
pub fn lat_to_tile_y(lat_deg: f64, tiles_per_axis: u32) -> i64 {
    let lat_rad = lat_deg.to_radians();
    ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * tiles_per_axis as f64).floor() as i64
}

/// Geodetic latitude/longitude (degrees) of the point under a camera whose
/// position is expressed relative to the unit sphere.
pub fn camera_geodetic(position: DVec3) -> (f64, f64) {
    let p = position.normalize();
    let lat = p.y.asin().to_degrees();
    let lon = p.x.atan2(p.z).to_degrees();
    (lat, lon)
}

/// Horizontal and vertical angular extents (degrees) of the globe surface
/// visible from `altitude` above the unit sphere, for a perspective camera
/// with vertical field of view `fov_y_deg` and the given aspect ratio.
///
/// The ground footprint of each frustum half-angle is
/// `altitude · tan(θ/2)`; on the unit sphere that arc length is itself the
/// subtended angle in radians.
pub fn angular_footprint(fov_y_deg: f64, aspect: f64, altitude: f64) -> (f64, f64) {
    let half_v = (fov_y_deg.to_radians() / 2.0).tan();
    let half_h = half_v * aspect;
    let alt = altitude.max(0.0);
    let v_deg = 2.0 * (alt * half_v).to_degrees();
    let h_deg = 2.0 * (alt * half_h).to_degrees();
    (h_deg, v_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_per_axis_is_power_of_two_over_full_range() {
        for zoom in 1..=20u8 {
            assert_eq!(tiles_per_axis(zoom, 1, 20).unwrap(), 1u32 << zoom);
        }
        assert_eq!(tiles_per_axis(10, 1, 20).unwrap(), 1024);
    }

    #[test]
    fn tiles_per_axis_clamps_below_minimum() {
        assert_eq!(tiles_per_axis(3, 6, 20).unwrap(), 1 << 6);
    }

    #[test]
    fn tiles_per_axis_rejects_zoom_beyond_maximum() {
        assert_eq!(
            tiles_per_axis(21, 1, 20),
            Err(SlippyError::InvalidZoom { zoom: 21, max_zoom: 20 })
        );
    }

    #[test]
    fn antimeridian_column_needs_wrapping() {
        // lon = 180° lands one past the last column; consumers wrap it to 0.
        assert_eq!(lon_to_tile_x(180.0, 4), 4);
        assert_eq!(lon_to_tile_x(-180.0, 4), 0);
        assert_eq!(lon_to_tile_x(0.0, 4), 2);
    }

    #[test]
    fn equator_maps_to_middle_row() {
        assert_eq!(lat_to_tile_y(0.0, 4), 2);
    }

    #[test]
    fn tile_indices_are_monotonic() {
        let mut prev_x = i64::MIN;
        for step in 0..=36 {
            let lon = -180.0 + step as f64 * 10.0;
            let x = lon_to_tile_x(lon, 256);
            assert!(x >= prev_x, "x not monotonic at lon {lon}");
            prev_x = x;
        }

        // Row index grows as latitude decreases (row 0 is the north edge).
        let mut prev_y = i64::MIN;
        for step in 0..=16 {
            let lat = 80.0 - step as f64 * 10.0;
            let y = lat_to_tile_y(lat, 256);
            assert!(y >= prev_y, "y not monotonic at lat {lat}");
            prev_y = y;
        }
    }

    #[test]
    fn tile_indices_are_idempotent() {
        assert_eq!(lon_to_tile_x(13.4, 1024), lon_to_tile_x(13.4, 1024));
        assert_eq!(lat_to_tile_y(52.5, 1024), lat_to_tile_y(52.5, 1024));
    }

    #[test]
    fn camera_geodetic_axes() {
        let (lat, lon) = camera_geodetic(DVec3::new(0.0, 1.0, 0.0));
        assert!((lat - 90.0).abs() < 1e-9);
        let _ = lon; // longitude is degenerate at the pole

        let (lat, lon) = camera_geodetic(DVec3::new(0.0, 0.0, 2.0));
        assert!(lat.abs() < 1e-9);
        assert!(lon.abs() < 1e-9);

        let (lat, lon) = camera_geodetic(DVec3::new(1.0, 0.0, 0.0));
        assert!(lat.abs() < 1e-9);
        assert!((lon - 90.0).abs() < 1e-9);
    }

    #[test]
    fn footprint_scales_with_altitude_and_aspect() {
        let (h0, v0) = angular_footprint(60.0, 2.0, 0.0);
        assert_eq!((h0, v0), (0.0, 0.0));

        let (h, v) = angular_footprint(60.0, 2.0, 0.1);
        assert!(v > 0.0);
        assert!((h - 2.0 * v).abs() < 1e-9);

        let (_, v_higher) = angular_footprint(60.0, 2.0, 0.2);
        assert!(v_higher > v);
    }
}
