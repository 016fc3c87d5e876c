//! Triangle-index generation over the fixed coarse vertex grid.

use crate::window::TileWindow;

/// Emits two triangles per window cell over the shared
/// `(tiles_per_axis + 1)²` vertex grid.
///
/// Columns wrap around the antimeridian; rows clamp at the poles, which
/// collapses out-of-range cells onto the edge row rather than skipping
/// them. An empty window yields an empty vector, and callers must not
/// replace an existing index buffer with it.
pub fn grid_indices(window: &TileWindow) -> Vec<u32> {
    if window.is_empty() {
        return Vec::new();
    }

    let stride = window.tiles_per_axis + 1;
    let cells = window.width() as usize * (window.max_y - window.min_y) as usize;
    let mut indices = Vec::with_capacity(cells * 6);

    for x in window.min_x..window.max_x {
        for y in window.min_y..window.max_y {
            let valid_x = window.wrap_x(x);
            let valid_y = window.clamp_y(y);
            let first = valid_y * stride + valid_x;
            let second = first + stride;
            indices.extend_from_slice(&[first, second, first + 1, second, second + 1, first + 1]);
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(tiles_per_axis: u32, min_x: i64, max_x: i64, min_y: i64, max_y: i64) -> TileWindow {
        TileWindow {
            tiles_per_axis,
            min_x,
            max_x,
            min_y,
            max_y,
            count_y: (max_y - min_y).max(0) as u32,
        }
    }

    #[test]
    fn empty_window_yields_no_indices() {
        assert!(grid_indices(&window(8, 3, 3, 0, 2)).is_empty());
        assert!(grid_indices(&window(8, 0, 2, 5, 5)).is_empty());
    }

    #[test]
    fn six_indices_per_cell() {
        let w = window(8, 1, 4, 2, 4);
        let indices = grid_indices(&w);
        assert_eq!(indices.len(), 3 * 2 * 6);
    }

    #[test]
    fn indices_stay_inside_the_vertex_grid() {
        let n = 8u32;
        let w = window(n, -3, 5, -2, 9);
        let vertex_count = (n + 1) * (n + 1);
        for &i in &grid_indices(&w) {
            assert!(i < vertex_count, "index {i} out of grid");
        }
    }

    #[test]
    fn cell_winding_matches_the_vertex_layout() {
        // Single cell at (2, 1) on an 8-axis grid, stride 9.
        let w = window(8, 2, 3, 1, 2);
        let first = 1u32 * 9 + 2;
        let second = first + 9;
        assert_eq!(
            grid_indices(&w),
            vec![first, second, first + 1, second, second + 1, first + 1]
        );
    }

    #[test]
    fn antimeridian_cells_reference_wrapped_columns() {
        let w = window(8, -1, 1, 3, 4);
        let indices = grid_indices(&w);
        // Two cells: columns 7 and 0, both on row 3.
        let firsts: Vec<u32> = indices.chunks(6).map(|tri| tri[0]).collect();
        assert_eq!(firsts, vec![3 * 9 + 7, 3 * 9]);
    }
}
