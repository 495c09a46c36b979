use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// A projected point in screen space (pixels, Y pointing down).
pub type ScreenPoint = Point2<Value>;

/// Homogeneous 4×4 transform applied to every vertex before projection.
pub type Transform = Matrix4<Value>;

/// Integer lattice coordinate `[x, y, z]`.
pub type Coord = [i32; 3];

/// An ordered vertex triple. Winding follows marching cubes emission order.
pub type Face = [Point; 3];

/// A scalar field function: maps a [`Point`] to a [`Value`].
pub type CompiledFunction = dyn Fn(Point) -> Value + Sync;
