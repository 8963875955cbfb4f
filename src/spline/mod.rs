//! Tensor-product spline functions.
//!
//! A spline `S` maps a parametric coordinate `u = (u_1, ..., u_P)` into an
//! `N`-dimensional physical space by blending control points with tensor products of
//! the per-direction basis functions, see eq. (3.11) in \[Piegl1997\]:
//!
//! ```text
//! S(u) = Σ_{i_1} ... Σ_{i_P}  N_{i_1,p_1}(u_1) · ... · N_{i_P,p_P}(u_P) · P_{i_1,...,i_P}
//! ```
//!
//! Per direction only `degree + 1` basis functions are nonzero at any coordinate, so
//! the sums collapse to a window of `(p_1+1) · ... · (p_P+1)` contributions.
//! [`BSpline`] blends its control points directly; [`Nurbs`] blends in homogeneous
//! coordinates and projects back, which realizes the rational basis
//! `R_i(u) = N_i(u) w_i / Σ_j N_j(u) w_j`.
//!
//! Coordinates outside the knot vector ranges are not an error: every basis function
//! vanishes there and the zero point is returned.

use thiserror::Error;

use crate::index::MultiIndexHandler;
use crate::knots::{KnotError, KnotVector};
use crate::manipulation::{degree::DegreeError, insert::InsertError, remove::RemoveError};
use crate::numeric;
use crate::parameter_space::{ParameterSpace, ParameterSpaceError};
use crate::physical_space::PhysicalSpaceError;
use crate::types::VecD;

mod bspline;
mod nurbs;

pub use bspline::BSpline;
pub use nurbs::Nurbs;

#[derive(Error, Debug, PartialEq)]
pub enum SplineError {
    #[error(transparent)]
    ParameterSpace(#[from] ParameterSpaceError),
    #[error(transparent)]
    PhysicalSpace(#[from] PhysicalSpaceError),
    #[error(transparent)]
    Knots(#[from] KnotError),
    #[error(transparent)]
    Insertion(#[from] InsertError),
    #[error(transparent)]
    Removal(#[from] RemoveError),
    #[error(transparent)]
    Degree(#[from] DegreeError),
    #[error("The knot vectors and degrees call for {expected:?} control points per direction, but the lattice holds {actual:?}.")]
    MismatchedSpaces { expected: Vec<usize>, actual: Vec<usize> },
    #[error("Got a parametric coordinate with {number_of_coordinates} entries for a spline with {dimensions} parametric directions.")]
    WrongCoordinateCount { number_of_coordinates: usize, dimensions: usize },
    #[error("Got {number_of_orders} derivative orders for a spline with {dimensions} parametric directions.")]
    WrongOrderCount { number_of_orders: usize, dimensions: usize },
    #[error("The spline maps into {dimensionality} spatial dimensions, but dimension {dimension} was requested.")]
    UnknownSpatialDimension { dimension: usize, dimensionality: usize },
}

/// Common surface of [`BSpline`] and [`Nurbs`].
pub trait Spline {
    /// The parametric domain: knot vectors and degrees of all directions.
    fn parameter_space(&self) -> &ParameterSpace;

    /// Number of coordinates of each control point.
    fn dimensionality(&self) -> usize;

    /// The spline value at `coordinate`, restricted to the requested spatial
    /// `dimensions`.
    ///
    /// Coordinates outside the knot vector ranges yield the zero point.
    fn evaluate(&self, coordinate: &[f64], dimensions: &[usize]) -> Result<VecD, SplineError>;

    /// The mixed partial derivative of the spline at `coordinate` with one
    /// differentiation order per parametric direction, restricted to the requested
    /// spatial `dimensions`.
    fn evaluate_derivative(
        &self,
        coordinate: &[f64],
        dimensions: &[usize],
        orders: &[usize],
    ) -> Result<VecD, SplineError>;

    /// Number of parametric directions.
    fn dimensions(&self) -> usize {
        self.parameter_space().dimensions()
    }

    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    fn degree(&self, direction: usize) -> usize {
        self.parameter_space().degree(direction)
    }

    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    fn knot_vector(&self, direction: usize) -> &KnotVector {
        self.parameter_space().knot_vector(direction)
    }

    /// The full spline value at `coordinate`, all spatial dimensions.
    fn point(&self, coordinate: &[f64]) -> Result<VecD, SplineError> {
        let dimensions: Vec<usize> = (0..self.dimensionality()).collect();
        self.evaluate(coordinate, &dimensions)
    }

    /// Whether both splines describe the same geometry within `tolerance`, compared
    /// on a uniform grid of roughly one hundred samples over the parametric domain.
    fn are_geometrically_equal<S: Spline>(&self, other: &S, tolerance: f64) -> bool {
        if self.dimensions() != other.dimensions()
            || self.dimensionality() != other.dimensionality()
        {
            return false;
        }
        let dimensions = self.dimensions();
        let samples = (100.0_f64.powf(1.0 / dimensions as f64)).ceil() as usize;
        let mut coordinate = vec![0.0; dimensions];
        let mut grid = MultiIndexHandler::new(&vec![samples; dimensions]);
        for _ in 0..grid.linear_length() {
            for (direction, &step) in grid.indices().iter().enumerate() {
                let knots = self.knot_vector(direction);
                let fraction = step as f64 / (samples - 1) as f64;
                coordinate[direction] =
                    knots.first_knot() + fraction * (knots.last_knot() - knots.first_knot());
            }
            match (self.point(&coordinate), other.point(&coordinate)) {
                (Ok(mine), Ok(theirs)) => {
                    let close = mine
                        .iter()
                        .zip(theirs.iter())
                        .all(|(&a, &b)| numeric::are_equal_with_tolerance(a, b, tolerance));
                    if !close {
                        return false;
                    }
                }
                _ => return false,
            }
            grid.advance();
        }
        true
    }
}

/// Calls `contribute(linear, blend)` for every tensor-product combination of the
/// per-direction windows, with `linear` indexing the lattice and `blend` the product
/// of the combined basis function values.
pub(crate) fn for_each_window_contribution(
    windows: &[VecD],
    firsts: &[usize],
    points_per_direction: &[usize],
    mut contribute: impl FnMut(usize, f64),
) {
    let window_sizes: Vec<usize> = windows.iter().map(VecD::len).collect();
    let mut window = MultiIndexHandler::new(&window_sizes);
    let mut lattice = MultiIndexHandler::new(points_per_direction);
    let mut tuple = vec![0; firsts.len()];
    for _ in 0..window.linear_length() {
        let mut blend = 1.0;
        for (direction, &offset) in window.indices().iter().enumerate() {
            blend *= windows[direction][offset];
            tuple[direction] = firsts[direction] + offset;
        }
        lattice.set_indices(&tuple);
        contribute(lattice.linear_index(), blend);
        window.advance();
    }
}

pub(crate) fn check_coordinate(dimensions: usize, coordinate: &[f64]) -> Result<(), SplineError> {
    if coordinate.len() != dimensions {
        return Err(SplineError::WrongCoordinateCount {
            number_of_coordinates: coordinate.len(),
            dimensions,
        });
    }
    Ok(())
}

pub(crate) fn check_orders(dimensions: usize, orders: &[usize]) -> Result<(), SplineError> {
    if orders.len() != dimensions {
        return Err(SplineError::WrongOrderCount { number_of_orders: orders.len(), dimensions });
    }
    Ok(())
}

pub(crate) fn check_output_dimensions(
    dimensionality: usize,
    dimensions: &[usize],
) -> Result<(), SplineError> {
    match dimensions.iter().find(|&&dimension| dimension >= dimensionality) {
        Some(&dimension) => {
            Err(SplineError::UnknownSpatialDimension { dimension, dimensionality })
        }
        None => Ok(()),
    }
}

/// Restriction of `point` to the requested spatial dimensions.
pub(crate) fn select_dimensions(point: &VecD, dimensions: &[usize]) -> VecD {
    VecD::from_fn(dimensions.len(), |i, _| point[dimensions[i]])
}
