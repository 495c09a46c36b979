use crate::{
    error::{GyroidError, Result},
    interp::{find_t, interpolate_points},
    tables::TRI_TABLE,
    types::{Coord, Point, Value},
};

/// Converts the active edge crossings for a given marching cubes `state` into
/// a flat list of triangle vertices.
///
/// `TRI_TABLE[state]` contains edge indices in groups of three, terminated by `-1`:
/// ```text
/// TRI_TABLE[state] = [e0, e1, e2,  e3, e4, e5,  -1, ...]
///                     \___tri0__/   \___tri1__/
/// ```
/// Each edge index maps into `edge_points` to retrieve the interpolated crossing.
#[inline]
pub fn triangle_verts_from_state(edge_points: &[Option<Point>; 12], state: usize) -> Vec<Point> {
    TRI_TABLE[state]
        .iter()
        .take_while(|&&v| v != -1)
        .map(|&t| edge_points[t as usize].expect("edge crossing missing for tri table entry"))
        .collect()
}

/// Returns the 8 lattice coordinates of the cell whose lowest corner is `origin`.
///
/// Corners are ordered to match the standard marching cubes convention:
/// ```text
///     7----6          Y
///    /|   /|          |
///   3----2 |          *-- X
///   | 4--|-5         /
///   |/   |/         Z
///   0----1
///
///  0 = (x,    y,    z   )    4 = (x,    y,    z+bz)
///  1 = (x+bx, y,    z   )    5 = (x+bx, y,    z+bz)
///  2 = (x+bx, y+by, z   )    6 = (x+bx, y+by, z+bz)
///  3 = (x,    y+by, z   )    7 = (x,    y+by, z+bz)
/// ```
#[inline]
pub fn cell_corner_coords(origin: Coord, step: Coord) -> [Coord; 8] {
    let [x, y, z] = origin;
    let [bx, by, bz] = step;
    [
        [x, y, z],
        [x + bx, y, z],
        [x + bx, y + by, z],
        [x, y + by, z],
        [x, y, z + bz],
        [x + bx, y, z + bz],
        [x + bx, y + by, z + bz],
        [x, y + by, z + bz],
    ]
}

/// Returns the 8 world-space corner positions of a cell: each corner coordinate scaled by `scale`.
#[inline]
pub fn get_corner_positions(corners: &[Coord; 8], scale: Value) -> [Point; 8] {
    corners.map(|[x, y, z]| Point::new(x as Value, y as Value, z as Value) * scale)
}

/// Computes the marching cubes state bitmask for a cell.
///
/// Each of the 8 corners maps to one bit. A bit is set when the corner's value
/// is **at or below** the threshold (i.e. "inside" the surface):
///
/// ```text
/// corner index:  7  6  5  4  3  2  1  0
/// state bits:   [_][_][_][_][_][_][_][_]
///                                      ^-- corner 0 inside?
/// ```
///
/// Returns [`GyroidError::InvalidCorners`] if `eval_corners` does not contain exactly 8 values.
#[inline]
pub fn get_state(eval_corners: &[Value], threshold: Value) -> Result<usize> {
    if eval_corners.len() != 8 {
        return Err(GyroidError::InvalidCorners);
    }

    let mut state: usize = 0;
    for (i, &v) in eval_corners.iter().enumerate() {
        if v <= threshold {
            state |= 1 << i;
        }
    }

    Ok(state)
}

/// Interpolates the crossing along each edge of the cell that the iso-surface cuts.
///
/// `edges_mask` is a 12-bit field from `EDGE_TABLE`; a set bit means that edge is active.
///
/// For each active edge the crossing is found by linearly interpolating between
/// the two endpoint positions at the iso-value. Edges whose endpoints hold the
/// same value resolve to their midpoint.
#[inline]
pub fn get_edge_midpoints(
    edges_mask: u16,
    point_indices: &[[i8; 2]; 12],
    corner_positions: &[Point; 8],
    corner_values: &[Value],
    threshold: Value,
) -> [Option<Point>; 12] {
    let mut edge_points: [Option<Point>; 12] = [None; 12];

    for i in 0..12_usize {
        if (edges_mask & (1 << i)) == 0 {
            continue;
        }

        let pair = point_indices[i];
        let vi = corner_values[pair[0] as usize];
        let vf = corner_values[pair[1] as usize];
        let pi = corner_positions[pair[0] as usize];
        let pf = corner_positions[pair[1] as usize];

        let t = find_t(vi, vf, threshold);
        edge_points[i] = Some(interpolate_points(pi, pf, t));
    }

    edge_points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{CORNER_POINT_INDICES, EDGE_TABLE};
    use approx::assert_relative_eq;

    #[test]
    fn state_requires_eight_corners() {
        assert_eq!(get_state(&[0.0; 7], 0.0), Err(GyroidError::InvalidCorners));
    }

    #[test]
    fn state_bits() {
        assert_eq!(get_state(&[1.0; 8], 0.0), Ok(0));
        assert_eq!(get_state(&[-1.0; 8], 0.0), Ok(255));
        let mut corners = [1.0; 8];
        corners[0] = -1.0;
        corners[6] = 0.0;
        assert_eq!(get_state(&corners, 0.0), Ok(0b0100_0001));
    }

    #[test]
    fn uniform_cells_emit_nothing() {
        for state in [0, 255] {
            assert_eq!(EDGE_TABLE[state], 0);
            assert!(triangle_verts_from_state(&[None; 12], state).is_empty());
        }
    }

    #[test]
    fn every_case_emits_whole_triangles() {
        let all_edges = [Some(Point::origin()); 12];
        for state in 0..256 {
            assert_eq!(triangle_verts_from_state(&all_edges, state).len() % 3, 0);
        }
    }

    #[test]
    fn single_corner_inside() {
        let corners = cell_corner_coords([0, 0, 0], [1, 1, 1]);
        let positions = get_corner_positions(&corners, 1.0);
        let mut values = [1.0; 8];
        values[0] = -1.0;

        let state = get_state(&values, 0.0).unwrap();
        assert_eq!(state, 1);
        let edges = get_edge_midpoints(
            EDGE_TABLE[state],
            &CORNER_POINT_INDICES,
            &positions,
            &values,
            0.0,
        );
        let verts = triangle_verts_from_state(&edges, state);
        assert_eq!(verts.len(), 3);
        // Crossings sit halfway along edges 0, 8 and 3
        assert_relative_eq!(verts[0], Point::new(0.5, 0.0, 0.0));
        assert_relative_eq!(verts[1], Point::new(0.0, 0.0, 0.5));
        assert_relative_eq!(verts[2], Point::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn stepped_corner_positions() {
        let corners = cell_corner_coords([2, 4, 6], [2, 2, 2]);
        assert_eq!(corners[6], [4, 6, 8]);
        let positions = get_corner_positions(&corners, 0.5);
        assert_relative_eq!(positions[6], Point::new(2.0, 3.0, 4.0));
    }
}
