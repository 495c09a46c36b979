use bevy::{color::palettes::css, prelude::*};

use crate::{
    lattice::LatticeBox,
    types::{Coord, Point, Value},
};

/// Expected raw output range of the gyroid.
pub const GYROID_RANGE: [Value; 2] = [-1.5, 1.5];

/// Iso-threshold space the density volume is remapped into.
pub const MARCHING_CUBE_RANGE: [Value; 2] = [-1.0, 1.0];

/// Iso-surface threshold. Corners at or below it count as inside.
pub const ISO_LEVEL: Value = 0.0;

/// Scale applied to lattice coordinates before the gyroid is evaluated.
pub const GYROID_RESOLUTION: Value = 0.5;

/// World-space size of one marching cubes cell.
pub const CELL_RESOLUTION: Value = 1.0;

pub const VOLUME_FROM: Coord = [0, 0, 0];
pub const VOLUME_TO: Coord = [16, 16, 16];
pub const VOLUME_BY: Coord = [1, 1, 1];

pub const LIGHT: [Value; 3] = [2.0, 2.0, -5.0];

pub const CAMERA_ZOOM: Value = 0.06;

/// Per-tick rotation increments in degrees. Shuffled once at startup.
pub const ROTATION_INCREMENTS: [Value; 3] = [0.5, 1.0, 1.5];

/// Initial tilt in degrees, applied about X then Y.
pub const INITIAL_TILT: [Value; 2] = [40.0, 40.0];

/// Facing ratios are clamped to `[0, FACING_RATIO_RANGE[1]]` and mapped onto
/// the palette from this range.
pub const FACING_RATIO_RANGE: [Value; 2] = [0.001, 0.16];

pub const OPACITY: Value = 0.1;

pub const OUTLINE: Srgba = css::LIGHT_GRAY;

/// Shading palette, darkest (barely lit) to brightest (facing the light).
pub const PALETTE: [Srgba; 8] = [
    Srgba::new(0.110, 0.098, 0.294, 1.0),
    Srgba::new(0.196, 0.133, 0.424, 1.0),
    Srgba::new(0.322, 0.169, 0.529, 1.0),
    Srgba::new(0.471, 0.208, 0.576, 1.0),
    Srgba::new(0.631, 0.259, 0.557, 1.0),
    Srgba::new(0.784, 0.345, 0.490, 1.0),
    Srgba::new(0.906, 0.482, 0.404, 1.0),
    Srgba::new(0.980, 0.686, 0.388, 1.0),
];

/// Runtime configuration for scene generation and rendering.
///
/// Inserted as a resource by [`GyroidPlugin`](crate::plugin::GyroidPlugin). The
/// defaults reproduce the stock demo; everything is read once at startup.
#[derive(Resource, Clone, Debug)]
pub struct GyroidConfig {
    /// Lattice box the scalar field is sampled over.
    pub volume: LatticeBox,
    pub gyroid_resolution: Value,
    pub cell_resolution: Value,
    pub iso_level: Value,
    pub light: Point,
    pub zoom: Value,
    /// Rotation increments in degrees, before shuffling.
    pub increments: [Value; 3],
    pub initial_tilt: [Value; 2],
    pub facing_ratio_range: [Value; 2],
    pub opacity: Value,
    pub palette: Vec<Srgba>,
    pub outline: Srgba,
}

impl Default for GyroidConfig {
    fn default() -> Self {
        Self {
            volume: LatticeBox {
                from: VOLUME_FROM,
                to: VOLUME_TO,
                by: VOLUME_BY,
            },
            gyroid_resolution: GYROID_RESOLUTION,
            cell_resolution: CELL_RESOLUTION,
            iso_level: ISO_LEVEL,
            light: Point::from(LIGHT),
            zoom: CAMERA_ZOOM,
            increments: ROTATION_INCREMENTS,
            initial_tilt: INITIAL_TILT,
            facing_ratio_range: FACING_RATIO_RANGE,
            opacity: OPACITY,
            palette: PALETTE.to_vec(),
            outline: OUTLINE,
        }
    }
}
