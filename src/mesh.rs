use crate::{
    error::{GyroidError, Result},
    types::{Face, Point, Value, Vector},
};

/// Static triangle soup produced once from the marching cubes output.
///
/// Every face is an ordered vertex triple, recentered so that rotations about
/// the origin spin the mesh in place. Faces are never mutated after construction;
/// renderers derive transformed copies instead.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    faces: Vec<Face>,
}

impl Scene {
    /// Groups every three consecutive vertices into a face and shifts each
    /// vertex by `-extent / 2`.
    ///
    /// `extent` is the upper corner of the sampled box (its `to` bound),
    /// not the bounding box of the emitted geometry, so the mesh is centred on the
    /// middle of the volume rather than on its own centroid.
    ///
    /// ```text
    /// [v0, v1, v2, v3, v4, v5, ...]  →  [[v0, v1, v2], [v3, v4, v5], ...]
    /// ```
    ///
    /// Returns [`GyroidError::IncompleteTriangle`] if the vertex count is not a multiple of 3.
    pub fn from_vertices(vertices: &[Point], extent: Vector) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(GyroidError::IncompleteTriangle);
        }

        let offset = extent * 0.5;
        let faces = vertices
            .chunks_exact(3)
            .map(|tri| [tri[0] - offset, tri[1] - offset, tri[2] - offset])
            .collect();

        Ok(Self { faces })
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Arithmetic mean of every face vertex, or the origin for an empty scene.
    pub fn centroid(&self) -> Point {
        if self.faces.is_empty() {
            return Point::origin();
        }
        let sum: Vector = self
            .faces
            .iter()
            .flat_map(|f| f.iter())
            .map(|p| p.coords)
            .sum();
        Point::from(sum / (self.faces.len() * 3) as Value)
    }
}

/// Computes the unit normal of `face` as `(v1 - v0) × (v2 - v1)`.
///
/// Returns the zero vector if the triangle is degenerate.
pub fn face_normal(face: &Face) -> Vector {
    let v_a_b = face[1] - face[0];
    let v_b_c = face[2] - face[1];

    let cross = v_a_b.cross(&v_b_c);

    let nrm = cross.norm();
    if nrm == 0.0 {
        Vector::zeros()
    } else {
        cross / nrm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn groups_consecutive_triples() {
        let vertices: Vec<Point> = (0..6).map(|i| Point::new(i as Value, 0.0, 0.0)).collect();
        let scene = Scene::from_vertices(&vertices, Vector::zeros()).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.faces()[1][0], Point::new(3.0, 0.0, 0.0));
        assert_eq!(scene.faces()[1][2], Point::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn rejects_partial_triangle() {
        let vertices = vec![Point::origin(); 4];
        assert_eq!(
            Scene::from_vertices(&vertices, Vector::zeros()).unwrap_err(),
            GyroidError::IncompleteTriangle
        );
    }

    #[test]
    fn symmetric_input_recenters_on_origin() {
        // Mirror pairs about (8, 8, 8)
        let vertices = vec![
            Point::new(2.0, 8.0, 5.0),
            Point::new(9.0, 3.0, 16.0),
            Point::new(8.0, 12.0, 1.0),
            Point::new(14.0, 8.0, 11.0),
            Point::new(7.0, 13.0, 0.0),
            Point::new(8.0, 4.0, 15.0),
        ];
        let scene = Scene::from_vertices(&vertices, Vector::new(16.0, 16.0, 16.0)).unwrap();
        assert_abs_diff_eq!(scene.centroid(), Point::origin(), epsilon = 1e-5);
    }

    #[test]
    fn recentering_uses_extent_not_geometry() {
        // Geometry occupies [10, 12]^3 but the box extent is 16, so the mesh
        // lands off-centre at +3 rather than at its own centroid.
        let vertices = vec![
            Point::new(10.0, 10.0, 10.0),
            Point::new(12.0, 12.0, 12.0),
            Point::new(11.0, 11.0, 11.0),
        ];
        let scene = Scene::from_vertices(&vertices, Vector::new(16.0, 16.0, 16.0)).unwrap();
        assert_relative_eq!(scene.centroid(), Point::new(3.0, 3.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn normal_of_ccw_triangle() {
        let face = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        ];
        assert_relative_eq!(face_normal(&face), Vector::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn degenerate_normal_is_zero() {
        let face = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(2.0, 2.0, 2.0),
        ];
        assert_eq!(face_normal(&face), Vector::zeros());
    }
}
