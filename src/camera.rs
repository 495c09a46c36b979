//! Orthographic projection from scene space onto the drawing surface.
use nalgebra::Rotation3;

use crate::{
    error::{GyroidError, Result},
    types::{Point, ScreenPoint, Value, Vector},
};

/// A fixed orthographic camera.
///
/// Points are expressed relative to `position` in the camera basis, the depth
/// axis is dropped, and the remaining `(x, y)` is scaled by `zoom` times the
/// shorter viewport side and moved to the viewport centre:
///
/// ```text
/// screen.x = width  / 2 + x · zoom · min(width, height)
/// screen.y = height / 2 - y · zoom · min(width, height)
/// ```
///
/// Screen Y grows downwards. A zero `direction` keeps the world axes as the camera basis.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    position: Point,
    view: Rotation3<Value>,
    width: Value,
    height: Value,
    zoom: Value,
}

impl Camera {
    /// Returns [`GyroidError::InvalidViewport`] if `width` or `height` is zero.
    pub fn new(
        position: Point,
        direction: Vector,
        up: Vector,
        width: u32,
        height: u32,
        zoom: Value,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GyroidError::InvalidViewport);
        }

        let view = if direction.norm_squared() == 0.0 {
            Rotation3::identity()
        } else {
            Rotation3::look_at_rh(&direction, &up)
        };

        Ok(Self {
            position,
            view,
            width: width as Value,
            height: height as Value,
            zoom,
        })
    }

    /// Camera at the origin looking down the world axes, as used by the demo.
    pub fn fixed(width: u32, height: u32, zoom: Value) -> Result<Self> {
        Self::new(
            Point::origin(),
            Vector::zeros(),
            Vector::y(),
            width,
            height,
            zoom,
        )
    }

    pub fn width(&self) -> Value {
        self.width
    }

    pub fn height(&self) -> Value {
        self.height
    }

    /// Projects a scene point onto the viewport.
    pub fn project(&self, p: &Point) -> ScreenPoint {
        let local = self.view * (*p - self.position);
        let scale = self.zoom * self.width.min(self.height);
        ScreenPoint::new(
            self.width * 0.5 + local.x * scale,
            self.height * 0.5 - local.y * scale,
        )
    }
}
