//! Control points of the embedding space.
//!
//! A [`ControlPoint`] is an immutable point with one scalar per embedding dimension.
//! Lattices of control points live in [`physical_space`][crate::physical_space]; this
//! type is the unit of exchange at construction and accessor boundaries.

use nalgebra::dvector;

use crate::types::VecD;

/// An immutable point in the embedding (physical) space.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    coordinates: VecD,
}

impl ControlPoint {
    pub fn new(coordinates: VecD) -> Self {
        Self { coordinates }
    }

    /// Number of embedding dimensions.
    pub fn dimensionality(&self) -> usize {
        self.coordinates.len()
    }

    /// Coordinate of embedding dimension `dimension`.
    ///
    /// # Panics
    /// Panics if `dimension` is not smaller than [`Self::dimensionality`].
    pub fn value(&self, dimension: usize) -> f64 {
        self.coordinates[dimension]
    }

    pub fn coordinates(&self) -> &VecD {
        &self.coordinates
    }

    /// Point at the origin of a `dimensionality`-dimensional embedding space.
    pub fn origin(dimensionality: usize) -> Self {
        Self::new(VecD::zeros(dimensionality))
    }

    /// Convenience constructor for planar points.
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(dvector![x, y])
    }
}

impl From<Vec<f64>> for ControlPoint {
    fn from(coordinates: Vec<f64>) -> Self {
        Self::new(VecD::from_vec(coordinates))
    }
}

impl From<&[f64]> for ControlPoint {
    fn from(coordinates: &[f64]) -> Self {
        Self::new(VecD::from_row_slice(coordinates))
    }
}
