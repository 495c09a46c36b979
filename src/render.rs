//! Per-frame rotation, depth ordering, flat shading and projection.
use std::{
    cmp::Ordering,
    sync::atomic::{self, AtomicBool},
};

use bevy::color::Srgba;
use nalgebra::Matrix4;
use rand::{Rng, seq::SliceRandom};
use tracing::debug;

use crate::{
    camera::Camera,
    canvas::DrawingSurface,
    config::GyroidConfig,
    error::{GyroidError, Result},
    interp::remap,
    mesh::face_normal,
    types::{Face, Point, ScreenPoint, Transform, Value, Vector},
};

/// Accumulated rotation applied to every vertex before projection.
///
/// Rotations compose onto the existing transform and are never reset, so
/// stepping the same increments every frame produces a continuous spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    transform: Transform,
}

impl Default for RotationState {
    fn default() -> Self {
        Self::identity()
    }
}

impl RotationState {
    pub fn identity() -> Self {
        Self {
            transform: Transform::identity(),
        }
    }

    /// Identity rotated by `degrees[0]` about X, then `degrees[1]` about Y.
    pub fn tilted(degrees: [Value; 2]) -> Self {
        Self::identity()
            .rot_x(degrees[0].to_radians())
            .rot_y(degrees[1].to_radians())
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn rot_x(self, radians: Value) -> Self {
        self.compose(Matrix4::new_rotation(Vector::x() * radians))
    }

    pub fn rot_y(self, radians: Value) -> Self {
        self.compose(Matrix4::new_rotation(Vector::y() * radians))
    }

    pub fn rot_z(self, radians: Value) -> Self {
        self.compose(Matrix4::new_rotation(Vector::z() * radians))
    }

    #[inline]
    fn compose(self, rotation: Transform) -> Self {
        Self {
            transform: self.transform * rotation,
        }
    }

    /// Returns the next state: `increments` radians about X, then Y, then Z.
    pub fn step(self, increments: &[Value; 3]) -> Self {
        self.rot_x(increments[0])
            .rot_y(increments[1])
            .rot_z(increments[2])
    }

    #[inline]
    pub fn apply(&self, p: &Point) -> Point {
        self.transform.transform_point(p)
    }

    /// A transformed copy of `face`.
    pub fn apply_face(&self, face: &Face) -> Face {
        face.map(|p| self.apply(&p))
    }
}

/// Shuffles per-axis increments given in degrees and converts them to radians.
pub fn shuffle_increments<R: Rng + ?Sized>(degrees: [Value; 3], rng: &mut R) -> [Value; 3] {
    let mut increments = degrees;
    increments.shuffle(rng);
    increments.map(Value::to_radians)
}

/// Orders faces back to front by their first vertex: z, then x, then y, all ascending.
pub fn depth_order(a: &Face, b: &Face) -> Ordering {
    let (a, b) = (&a[0], &b[0]);
    cmp_value(a.z, b.z)
        .then_with(|| cmp_value(a.x, b.x))
        .then_with(|| cmp_value(a.y, b.y))
}

#[inline]
fn cmp_value(a: Value, b: Value) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Stable painter's-algorithm sort. Faces with equal keys keep their input order.
pub fn depth_sort(faces: &mut [Face]) {
    faces.sort_by(depth_order);
}

/// Clamps `normal · ray` into `[0, max]`.
#[inline]
pub fn facing_ratio(normal: &Vector, ray: &Vector, max: Value) -> Value {
    let d = normal.dot(ray);
    if d.is_nan() { 0.0 } else { d.clamp(0.0, max) }
}

/// Flat shading against a fixed point light.
#[derive(Clone, Debug)]
pub struct Shading {
    light: Point,
    palette: Vec<Srgba>,
    outline: Srgba,
    ratio_range: [Value; 2],
    opacity: Value,
}

impl Shading {
    /// Returns [`GyroidError::EmptyPalette`] if `palette` has no colors.
    pub fn new(
        light: Point,
        palette: Vec<Srgba>,
        outline: Srgba,
        ratio_range: [Value; 2],
        opacity: Value,
    ) -> Result<Self> {
        if palette.is_empty() {
            return Err(GyroidError::EmptyPalette);
        }
        Ok(Self {
            light,
            palette,
            outline,
            ratio_range,
            opacity,
        })
    }

    pub fn from_config(config: &GyroidConfig) -> Result<Self> {
        Self::new(
            config.light,
            config.palette.clone(),
            config.outline,
            config.facing_ratio_range,
            config.opacity,
        )
    }

    pub fn opacity(&self) -> Value {
        self.opacity
    }

    /// Facing ratio of an already transformed face.
    ///
    /// ```text
    /// normal = normalize((v1 - v0) × (v2 - v1))
    /// ray    = normalize(light - v1)
    /// ratio  = clamp(normal · ray, 0, ratio_range[1])
    /// ```
    ///
    /// Degenerate faces have a zero normal and therefore a ratio of 0.
    pub fn facing_ratio(&self, face: &Face) -> Value {
        let normal = face_normal(face);
        let ray = (self.light - face[1])
            .try_normalize(0.0)
            .unwrap_or_else(Vector::zeros);
        facing_ratio(&normal, &ray, self.ratio_range[1])
    }

    /// Maps a ratio from `ratio_range` onto the palette, or `None` below the range.
    ///
    /// The top of the range selects the last color.
    pub fn palette_index(&self, ratio: Value) -> Option<usize> {
        let last = (self.palette.len() - 1) as Value;
        // Normalise first so the top of the range is exactly 1
        let index = (remap(ratio, self.ratio_range, [0.0, 1.0]) * last).floor();
        if index.is_nan() || index < 0.0 || index > last {
            return None;
        }
        Some(index as usize)
    }

    /// Stroke and fill colors for `face`. Faces below the palette range get the
    /// outline color and no fill.
    pub fn colors(&self, face: &Face) -> (Srgba, Option<Srgba>) {
        match self.palette_index(self.facing_ratio(face)) {
            Some(i) => (self.palette[i], Some(self.palette[i])),
            None => (self.outline, None),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// No tick has run yet.
    Idle,
    Rendering,
}

/// Face counts for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub filled: usize,
    pub outlined: usize,
}

/// Owns the rotation state and draws one frame per [`tick`](FrameRenderer::tick).
///
/// ```text
/// tick:
/// 1. surface.clear
/// 2. rotation = rotation.step(increments)     (cumulative)
/// 3. rotated  = faces × rotation              (copies; originals untouched)
/// 4. depth_sort(rotated)                      (z, x, y ascending; stable)
/// 5. per face: shade → project → draw_polygon
/// ```
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    rotation: RotationState,
    increments: [Value; 3],
    shading: Shading,
    camera: Camera,
    frames: u64,
}

impl FrameRenderer {
    /// `increments` are radians per tick about X, Y and Z.
    pub fn new(
        rotation: RotationState,
        increments: [Value; 3],
        shading: Shading,
        camera: Camera,
    ) -> Self {
        Self {
            rotation,
            increments,
            shading,
            camera,
            frames: 0,
        }
    }

    /// Builds a renderer for a `width` × `height` surface, shuffling the configured
    /// increments with `rng`.
    pub fn from_config<R: Rng + ?Sized>(
        config: &GyroidConfig,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Result<Self> {
        let shading = Shading::from_config(config)?;
        let camera = Camera::fixed(width, height, config.zoom)?;
        let increments = shuffle_increments(config.increments, rng);
        debug!(?increments, "shuffled rotation increments");

        Ok(Self::new(
            RotationState::tilted(config.initial_tilt),
            increments,
            shading,
            camera,
        ))
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn increments(&self) -> &[Value; 3] {
        &self.increments
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state(&self) -> RenderState {
        if self.frames == 0 {
            RenderState::Idle
        } else {
            RenderState::Rendering
        }
    }

    /// Applies one rotation step without drawing.
    pub fn advance(&mut self) {
        self.rotation = self.rotation.step(&self.increments);
    }

    /// Transformed copies of `faces` under the current rotation, in input order.
    pub fn transform_faces(&self, faces: &[Face]) -> Vec<Face> {
        faces.iter().map(|f| self.rotation.apply_face(f)).collect()
    }

    /// Renders one frame of `faces` onto `surface`.
    pub fn tick<S>(&mut self, faces: &[Face], surface: &mut S) -> FrameStats
    where
        S: DrawingSurface + ?Sized,
    {
        surface.clear();
        self.advance();

        let mut rotated = self.transform_faces(faces);
        depth_sort(&mut rotated);

        let mut stats = FrameStats::default();
        for face in &rotated {
            let (stroke, fill) = self.shading.colors(face);
            if fill.is_some() {
                stats.filled += 1;
            } else {
                stats.outlined += 1;
            }

            let triangle: [ScreenPoint; 3] = face.map(|p| self.camera.project(&p));
            surface.draw_polygon(&triangle, stroke, fill, self.shading.opacity());
        }

        self.frames += 1;
        debug!(
            frame = self.frames,
            filled = stats.filled,
            outlined = stats.outlined,
            "rendered frame"
        );
        stats
    }

    /// Ticks until `cancel` is set, calling `present` after every frame.
    ///
    /// The token is checked before each tick; returns the number of frames rendered.
    pub fn run_until_cancelled<S, F>(
        &mut self,
        faces: &[Face],
        surface: &mut S,
        cancel: &AtomicBool,
        mut present: F,
    ) -> u64
    where
        S: DrawingSurface + ?Sized,
        F: FnMut(&S, FrameStats),
    {
        let start = self.frames;
        while !cancel.load(atomic::Ordering::Acquire) {
            let stats = self.tick(faces, surface);
            present(surface, stats);
        }
        self.frames - start
    }
}
