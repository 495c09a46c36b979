//! Scalar field sampling.
use tracing::debug;

use crate::{
    config::{GYROID_RANGE, MARCHING_CUBE_RANGE},
    interp::remap,
    lattice::LatticeBox,
    types::{CompiledFunction, Point, Value},
    volume::DensityVolume,
};

/// The gyroid: `sin(x)·cos(y) + sin(y)·cos(z) + sin(z)·cos(x)`.
///
/// Output lies roughly in [`GYROID_RANGE`].
#[inline]
pub fn gyroid(p: Point) -> Value {
    p.x.sin() * p.y.cos() + p.y.sin() * p.z.cos() + p.z.sin() * p.x.cos()
}

/// Samples `function` at every coordinate of `bounds` scaled by `resolution`
/// and remaps the raw output from `range_in` to `range_out`.
///
/// The resulting volume is indexed by the unscaled lattice coordinates:
///
/// ```text
/// volume[x, y, z] = remap(function((x, y, z) · resolution), range_in, range_out)
/// ```
pub fn sample_volume(
    bounds: LatticeBox,
    resolution: Value,
    function: &CompiledFunction,
    range_in: [Value; 2],
    range_out: [Value; 2],
) -> DensityVolume {
    let volume = DensityVolume::from_fn(bounds, |[x, y, z]| {
        let p = Point::new(x as Value, y as Value, z as Value) * resolution;
        remap(function(p), range_in, range_out)
    });
    debug!(samples = volume.len(), resolution, "sampled scalar field");
    volume
}

/// Samples the [`gyroid`] over `bounds`, remapped from [`GYROID_RANGE`] to [`MARCHING_CUBE_RANGE`].
pub fn gyroid_volume(bounds: LatticeBox, resolution: Value) -> DensityVolume {
    sample_volume(bounds, resolution, &gyroid, GYROID_RANGE, MARCHING_CUBE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gyroid_origin_is_zero() {
        let volume = gyroid_volume(LatticeBox::unit([0, 0, 0], [0, 0, 0]), 0.5);
        assert_eq!(volume.len(), 1);
        assert_abs_diff_eq!(volume.get([0, 0, 0]), 0.0);
    }

    #[test]
    fn every_coord_sampled_within_range() {
        let bounds = LatticeBox::unit([0, 0, 0], [16, 16, 16]);
        let volume = gyroid_volume(bounds, 0.5);
        assert_eq!(volume.len(), 17 * 17 * 17);
        for coord in bounds.iter() {
            let v = volume.get(coord);
            assert!(
                (MARCHING_CUBE_RANGE[0]..=MARCHING_CUBE_RANGE[1]).contains(&v),
                "{coord:?} -> {v}"
            );
        }
    }

    #[test]
    fn samples_at_scaled_coordinates() {
        let volume = gyroid_volume(LatticeBox::unit([0, 0, 0], [4, 4, 4]), 0.5);
        let expected = remap(
            gyroid(Point::new(1.5, 0.5, 2.0)),
            GYROID_RANGE,
            MARCHING_CUBE_RANGE,
        );
        assert_abs_diff_eq!(volume.get([3, 1, 4]), expected);
    }

    #[test]
    fn custom_function_and_ranges() {
        let plane = |p: Point| p.x;
        let volume = sample_volume(
            LatticeBox::unit([0, 0, 0], [2, 0, 0]),
            1.0,
            &plane,
            [0.0, 2.0],
            [-1.0, 1.0],
        );
        assert_eq!(volume.get([0, 0, 0]), -1.0);
        assert_eq!(volume.get([1, 0, 0]), 0.0);
        assert_eq!(volume.get([2, 0, 0]), 1.0);
    }
}
