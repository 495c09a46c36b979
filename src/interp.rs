use crate::types::{Point, Value};

// linearly map a number from one range to another
pub fn remap(s: Value, range_in: [Value; 2], range_out: [Value; 2]) -> Value {
    range_out[0] + (s - range_in[0]) * (range_out[1] - range_out[0]) / (range_in[1] - range_in[0])
}

// Return the interpolation factor t corresponding to iso_val.
// Flat edges (v0 == v1) resolve to the midpoint.
pub fn find_t(v0: Value, v1: Value, iso_val: Value) -> Value {
    let denom = v1 - v0;
    if denom == 0.0 {
        return 0.5;
    }
    (iso_val - v0) / denom
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

// Linearly interpolate between two points by factor t
pub fn interpolate_points(p0: Point, p1: Point, t: Value) -> Point {
    Point::new(lerp(p0.x, p1.x, t), lerp(p0.y, p1.y, t), lerp(p0.z, p1.z, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn remap_gyroid_range() {
        assert_relative_eq!(remap(0.0, [-1.5, 1.5], [-1.0, 1.0]), 0.0);
        assert_relative_eq!(remap(1.5, [-1.5, 1.5], [-1.0, 1.0]), 1.0);
        assert_relative_eq!(remap(-0.75, [-1.5, 1.5], [-1.0, 1.0]), -0.5);
    }

    #[test]
    fn find_t_on_flat_edge_is_midpoint() {
        assert_eq!(find_t(0.3, 0.3, 0.0), 0.5);
        assert_eq!(find_t(0.0, 0.0, 0.0), 0.5);
    }

    #[test]
    fn find_t_crossing() {
        assert_relative_eq!(find_t(-1.0, 1.0, 0.0), 0.5);
        assert_relative_eq!(find_t(-0.25, 0.75, 0.0), 0.25);
    }

    #[test]
    fn interpolate_between_points() {
        let p = interpolate_points(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 4.0, -2.0), 0.25);
        assert_relative_eq!(p, Point::new(0.5, 1.0, -0.5));
    }
}
