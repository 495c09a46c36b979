use ndarray::Array3;

use crate::{
    lattice::LatticeBox,
    types::{Coord, Value},
};

/// A dense grid of density values addressed by integer lattice coordinates.
///
/// Every coordinate of [`bounds`](DensityVolume::bounds) holds exactly one value.
/// Values are stored as `values[[i, j, k]]`, where `(i, j, k)` is the lattice index
/// of the coordinate inside the box, so stepped and offset boxes are both supported.
///
/// Built once and read-only afterwards.
#[derive(Clone, Debug)]
pub struct DensityVolume {
    bounds: LatticeBox,
    values: Array3<Value>,
}

impl DensityVolume {
    /// Fills a volume by calling `f` at every coordinate of `bounds`.
    pub fn from_fn<F>(bounds: LatticeBox, mut f: F) -> Self
    where
        F: FnMut(Coord) -> Value,
    {
        let [nx, ny, nz] = bounds.shape();
        let values = Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| f(bounds.coord_at(i, j, k)));
        Self { bounds, values }
    }

    pub fn bounds(&self) -> &LatticeBox {
        &self.bounds
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.bounds.contains(coord)
    }

    /// Returns the value at `coord`, or `None` outside the populated box.
    pub fn try_get(&self, coord: Coord) -> Option<Value> {
        let [i, j, k] = self.bounds.index_of(coord)?;
        self.values.get([i, j, k]).copied()
    }

    /// Returns the value at `coord`.
    ///
    /// # Panics
    /// Panics if `coord` is not a lattice point of the volume. Callers validate
    /// their iteration bounds up front, so a miss here is a logic error.
    #[inline]
    pub fn get(&self, coord: Coord) -> Value {
        match self.try_get(coord) {
            Some(v) => v,
            None => panic!("density lookup outside volume at {coord:?} (bounds {:?})", self.bounds),
        }
    }

    /// Iterates `(coord, value)` pairs in lattice order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Value)> + '_ {
        self.values
            .indexed_iter()
            .map(|((i, j, k), &v)| (self.bounds.coord_at(i, j, k), v))
    }
}
