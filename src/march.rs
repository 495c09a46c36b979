use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::warn;

use crate::{
    error::{GyroidError, Result},
    lattice::LatticeBox,
    tables::{CORNER_POINT_INDICES, EDGE_TABLE},
    types::{Point, Value},
    utils::{
        cell_corner_coords, get_corner_positions, get_edge_midpoints, get_state,
        triangle_verts_from_state,
    },
    volume::DensityVolume,
};

/// Runs the marching cubes algorithm over every cell of `cells`.
///
/// Each coordinate in `cells` is the lowest corner of one cell; its other seven
/// corners sit one `cells.by` step further along each axis and must all be
/// populated in `volume`. For a volume sampled over `0..=n`, pass
/// [`LatticeBox::shrink_by_step`] of the volume bounds.
///
/// Returns a flat list of vertices, three per triangle, in emission order
/// (x outermost, then y, then z). Work is parallelised over X slices using Rayon
/// and the slices are concatenated in order, so the output matches a sequential walk.
///
/// ```text
/// Per cell:
/// 1. cell_corner_coords         →  8 lattice coordinates
/// 2. volume.get (×8)            →  8 scalar values
/// 3. get_state                  →  256-entry lookup key
/// 4. EDGE_TABLE[state]          →  bitmask of intersected edges
/// 5. get_edge_midpoints         →  up to 12 interpolated points
/// 6. triangle_verts_from_state  →  triangle vertices from TRI_TABLE
/// ```
///
/// Returns [`GyroidError::InvalidStep`] if either box has a non-positive step, and
/// [`GyroidError::InvalidBounds`] if any cell corner falls outside `volume`.
pub fn marching_cubes(
    volume: &DensityVolume,
    cells: &LatticeBox,
    res: Value,
    threshold: Value,
) -> Result<Vec<Point>> {
    cells.validate()?;
    volume.bounds().validate()?;
    if cells.is_empty() {
        return Ok(Vec::new());
    }
    check_bounds(volume, cells)?;

    let [nx, ny, nz] = cells.shape();
    let per_x: Vec<Vec<Point>> = (0..nx)
        .into_par_iter()
        .map(|i| -> Result<Vec<Point>> {
            let mut local: Vec<Point> = Vec::new();
            let per_cell_max = 15_usize; // upper bound of vertices per cell
            local.reserve(ny * nz * per_cell_max);

            for j in 0..ny {
                for k in 0..nz {
                    let corners = cell_corner_coords(cells.coord_at(i, j, k), cells.by);
                    let corner_positions = get_corner_positions(&corners, res);
                    let eval_corners: [Value; 8] = corners.map(|c| volume.get(c));

                    let state = get_state(&eval_corners, threshold)?;

                    let edges_mask = EDGE_TABLE[state];
                    if edges_mask == 0 {
                        continue;
                    }

                    let edge_points = get_edge_midpoints(
                        edges_mask,
                        &CORNER_POINT_INDICES,
                        &corner_positions,
                        &eval_corners,
                        threshold,
                    );

                    local.extend(triangle_verts_from_state(&edge_points, state));
                }
            }
            Ok(local)
        })
        .collect::<Result<_>>()?;

    // Merge per-X slices into a single vertex buffer
    let total: usize = per_x.iter().map(|v| v.len()).sum();
    let mut vertices: Vec<Point> = Vec::with_capacity(total);
    for mut v in per_x {
        vertices.append(&mut v);
    }

    if vertices.is_empty() {
        warn!(cells = cells.len(), "marching cubes produced no triangles");
    }
    Ok(vertices)
}

/// Checks that the far corner of the first and last cell are both lattice points of `volume`.
///
/// Cells and the volume share a lattice when `cells.by` is a multiple of the volume step and
/// both extreme corners land on it; every corner in between then does too.
fn check_bounds(volume: &DensityVolume, cells: &LatticeBox) -> Result<()> {
    let [nx, ny, nz] = cells.shape();
    let first = cells.from;
    let last = cell_corner_coords(cells.coord_at(nx - 1, ny - 1, nz - 1), cells.by)[6];
    let vby = volume.bounds().by;
    let aligned = (0..3).all(|a| cells.by[a] % vby[a] == 0);

    if aligned && volume.contains(first) && volume.contains(last) {
        Ok(())
    } else {
        Err(GyroidError::InvalidBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ISO_LEVEL, field::gyroid_volume};

    fn sphere_volume(n: i32, radius: Value) -> DensityVolume {
        let c = n as Value / 2.0;
        DensityVolume::from_fn(LatticeBox::unit([0, 0, 0], [n, n, n]), |[x, y, z]| {
            let p = Point::new(x as Value - c, y as Value - c, z as Value - c);
            p.coords.norm() - radius
        })
    }

    #[test]
    fn gyroid_emits_whole_triangles() {
        let bounds = LatticeBox::unit([0, 0, 0], [16, 16, 16]);
        let volume = gyroid_volume(bounds, 0.5);
        let vertices = marching_cubes(&volume, &bounds.shrink_by_step(), 1.0, ISO_LEVEL).unwrap();
        assert!(!vertices.is_empty());
        assert_eq!(vertices.len() % 3, 0);
        for v in &vertices {
            assert!((0.0..=16.0).contains(&v.x));
            assert!((0.0..=16.0).contains(&v.y));
            assert!((0.0..=16.0).contains(&v.z));
        }
    }

    #[test]
    fn uniform_volume_is_empty() {
        let bounds = LatticeBox::unit([0, 0, 0], [4, 4, 4]);
        for value in [1.0, -1.0] {
            let volume = DensityVolume::from_fn(bounds, |_| value);
            let vertices =
                marching_cubes(&volume, &bounds.shrink_by_step(), 1.0, ISO_LEVEL).unwrap();
            assert!(vertices.is_empty());
        }
    }

    #[test]
    fn sphere_vertices_lie_near_radius() {
        let volume = sphere_volume(8, 2.5);
        let cells = volume.bounds().shrink_by_step();
        let vertices = marching_cubes(&volume, &cells, 1.0, 0.0).unwrap();
        assert_eq!(vertices.len() % 3, 0);
        for v in &vertices {
            let r = (*v - Point::new(4.0, 4.0, 4.0)).norm();
            assert!((r - 2.5).abs() < 0.25, "vertex {v} at radius {r}");
        }
    }

    #[test]
    fn emission_order_is_deterministic() {
        let volume = sphere_volume(8, 3.0);
        let cells = volume.bounds().shrink_by_step();
        let a = marching_cubes(&volume, &cells, 1.0, 0.0).unwrap();
        let b = marching_cubes(&volume, &cells, 1.0, 0.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn resolution_scales_positions() {
        let volume = sphere_volume(8, 2.5);
        let cells = volume.bounds().shrink_by_step();
        let unit = marching_cubes(&volume, &cells, 1.0, 0.0).unwrap();
        let half = marching_cubes(&volume, &cells, 0.5, 0.0).unwrap();
        assert_eq!(unit.len(), half.len());
        for (u, h) in unit.iter().zip(&half) {
            approx::assert_relative_eq!(*u * 0.5, *h);
        }
    }

    #[test]
    fn rejects_cells_reaching_past_volume() {
        let bounds = LatticeBox::unit([0, 0, 0], [4, 4, 4]);
        let volume = DensityVolume::from_fn(bounds, |_| 1.0);
        assert_eq!(
            marching_cubes(&volume, &bounds, 1.0, 0.0),
            Err(GyroidError::InvalidBounds)
        );
        let shifted = LatticeBox::unit([-1, 0, 0], [3, 3, 3]);
        assert_eq!(
            marching_cubes(&volume, &shifted, 1.0, 0.0),
            Err(GyroidError::InvalidBounds)
        );
    }

    #[test]
    fn rejects_zero_cell_step() {
        let bounds = LatticeBox::unit([0, 0, 0], [4, 4, 4]);
        let volume = DensityVolume::from_fn(bounds, |_| 1.0);
        let cells = LatticeBox {
            by: [1, 0, 1],
            ..bounds.shrink_by_step()
        };
        assert_eq!(
            marching_cubes(&volume, &cells, 1.0, 0.0),
            Err(GyroidError::InvalidStep)
        );
    }

    #[test]
    fn empty_cell_box_is_empty_mesh() {
        let bounds = LatticeBox::unit([0, 0, 0], [0, 0, 0]);
        let volume = DensityVolume::from_fn(bounds, |_| 1.0);
        let vertices = marching_cubes(&volume, &bounds.shrink_by_step(), 1.0, 0.0).unwrap();
        assert!(vertices.is_empty());
    }
}
