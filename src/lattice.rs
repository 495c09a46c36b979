use crate::{
    error::{GyroidError, Result},
    types::Coord,
};

/// An inclusive box of integer lattice coordinates walked from `from` to `to` in steps of `by`.
///
/// ```text
///  from = [0, 0, 0], to = [2, 2, 2], by = [1, 1, 1]
///  → 3 × 3 × 3 = 27 coordinates, x outermost, z innermost
/// ```
///
/// An axis where `to < from` is empty, which makes the whole box empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeBox {
    pub from: Coord,
    pub to: Coord,
    pub by: Coord,
}

impl LatticeBox {
    /// Returns [`GyroidError::InvalidStep`] if any step component is not positive.
    pub fn new(from: Coord, to: Coord, by: Coord) -> Result<Self> {
        let lattice = Self { from, to, by };
        lattice.validate()?;
        Ok(lattice)
    }

    /// Checks that every step component is positive.
    ///
    /// Boxes built field by field skip [`LatticeBox::new`], so anything that walks a
    /// box it did not construct calls this first.
    pub fn validate(&self) -> Result<()> {
        if self.by.iter().any(|&b| b <= 0) {
            return Err(GyroidError::InvalidStep);
        }
        Ok(())
    }

    /// A box with unit steps.
    pub fn unit(from: Coord, to: Coord) -> Self {
        Self {
            from,
            to,
            by: [1, 1, 1],
        }
    }

    /// Number of lattice points along each axis.
    pub fn shape(&self) -> [usize; 3] {
        let axis = |i: usize| {
            if self.to[i] < self.from[i] {
                0
            } else {
                ((self.to[i] - self.from[i]) / self.by[i]) as usize + 1
            }
        };
        [axis(0), axis(1), axis(2)]
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The coordinate at lattice index `(i, j, k)`.
    #[inline]
    pub fn coord_at(&self, i: usize, j: usize, k: usize) -> Coord {
        [
            self.from[0] + i as i32 * self.by[0],
            self.from[1] + j as i32 * self.by[1],
            self.from[2] + k as i32 * self.by[2],
        ]
    }

    /// Lattice index of `coord`, or `None` if it is outside the box or off-step.
    pub fn index_of(&self, coord: Coord) -> Option<[usize; 3]> {
        let shape = self.shape();
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let offset = coord[axis] - self.from[axis];
            if offset < 0 || offset % self.by[axis] != 0 {
                return None;
            }
            let i = (offset / self.by[axis]) as usize;
            if i >= shape[axis] {
                return None;
            }
            index[axis] = i;
        }
        Some(index)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.index_of(coord).is_some()
    }

    /// The same box with `to` pulled in by one step on every axis.
    ///
    /// Iterating cells over the shrunk box keeps every `+by` corner inside `self`.
    pub fn shrink_by_step(&self) -> Self {
        Self {
            from: self.from,
            to: [
                self.to[0] - self.by[0],
                self.to[1] - self.by[1],
                self.to[2] - self.by[2],
            ],
            by: self.by,
        }
    }

    /// Iterates every coordinate in the box, x outermost and z innermost.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        let [nx, ny, nz] = self.shape();
        (0..nx).flat_map(move |i| {
            (0..ny).flat_map(move |j| (0..nz).map(move |k| self.coord_at(i, j, k)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_step() {
        assert_eq!(
            LatticeBox::new([0, 0, 0], [4, 4, 4], [1, 0, 1]),
            Err(GyroidError::InvalidStep)
        );
        assert_eq!(
            LatticeBox::new([0, 0, 0], [4, 4, 4], [-1, 1, 1]),
            Err(GyroidError::InvalidStep)
        );
    }

    #[test]
    fn validate_catches_literal_boxes() {
        let zero = LatticeBox {
            from: [0, 0, 0],
            to: [16, 16, 16],
            by: [0, 1, 1],
        };
        assert_eq!(zero.validate(), Err(GyroidError::InvalidStep));
        let negative = LatticeBox { by: [1, 1, -2], ..zero };
        assert_eq!(negative.validate(), Err(GyroidError::InvalidStep));
        assert_eq!(LatticeBox::unit([0, 0, 0], [4, 4, 4]).validate(), Ok(()));
    }

    #[test]
    fn inclusive_iteration_order() {
        let b = LatticeBox::unit([0, 0, 0], [1, 1, 1]);
        let coords: Vec<Coord> = b.iter().collect();
        assert_eq!(
            coords,
            vec![
                [0, 0, 0],
                [0, 0, 1],
                [0, 1, 0],
                [0, 1, 1],
                [1, 0, 0],
                [1, 0, 1],
                [1, 1, 0],
                [1, 1, 1],
            ]
        );
    }

    #[test]
    fn stepped_shape_and_index() {
        let b = LatticeBox::new([0, -4, 2], [8, 4, 2], [2, 4, 1]).unwrap();
        assert_eq!(b.shape(), [5, 3, 1]);
        assert_eq!(b.len(), 15);
        assert_eq!(b.index_of([6, 0, 2]), Some([3, 1, 0]));
        assert_eq!(b.index_of([5, 0, 2]), None);
        assert_eq!(b.index_of([10, 0, 2]), None);
        assert_eq!(b.coord_at(3, 1, 0), [6, 0, 2]);
    }

    #[test]
    fn inverted_axis_is_empty() {
        let b = LatticeBox::unit([0, 0, 0], [4, -1, 4]);
        assert!(b.is_empty());
        assert_eq!(b.iter().count(), 0);
    }

    #[test]
    fn shrink_keeps_corners_inside() {
        let b = LatticeBox::unit([0, 0, 0], [16, 16, 16]);
        let cells = b.shrink_by_step();
        assert_eq!(cells.to, [15, 15, 15]);
        assert!(b.contains([16, 16, 16]));
        assert!(!cells.contains([16, 16, 16]));
    }
}
