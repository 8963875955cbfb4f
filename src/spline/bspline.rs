use crate::knots::KnotVector;
use crate::manipulation::{degree, insert, remove};
use crate::parameter_space::ParameterSpace;
use crate::physical_space::PhysicalSpace;
use crate::points::ControlPoint;
use crate::types::VecD;

use super::{Spline, SplineError};

/// Piecewise polynomial tensor-product spline.
///
/// Pairs a [`ParameterSpace`] with a [`PhysicalSpace`] whose lattice provides one
/// control point per tensor-product basis function. Evaluation blends the control
/// points with the nonzero basis function windows of all directions.
#[derive(Debug, Clone)]
pub struct BSpline {
    parameter_space: ParameterSpace,
    physical_space: PhysicalSpace,
}

impl BSpline {
    /// Creates a spline from one knot vector and degree per parametric direction and
    /// the control points in lattice order, direction 0 varying fastest.
    pub fn new(
        knot_vectors: Vec<KnotVector>,
        degrees: Vec<usize>,
        control_points: &[ControlPoint],
    ) -> Result<Self, SplineError> {
        let parameter_space = ParameterSpace::new(knot_vectors, degrees)?;
        let physical_space =
            PhysicalSpace::new(control_points, parameter_space.basis_function_counts())?;
        Ok(Self { parameter_space, physical_space })
    }

    /// Combines prebuilt spaces, validating that the lattice provides exactly one
    /// control point per basis function in every direction.
    pub fn from_spaces(
        parameter_space: ParameterSpace,
        physical_space: PhysicalSpace,
    ) -> Result<Self, SplineError> {
        let expected = parameter_space.basis_function_counts();
        if physical_space.points_per_direction() != expected {
            return Err(SplineError::MismatchedSpaces {
                expected,
                actual: physical_space.points_per_direction().to_vec(),
            });
        }
        Ok(Self { parameter_space, physical_space })
    }

    pub fn physical_space(&self) -> &PhysicalSpace {
        &self.physical_space
    }

    /// Inserts `u` into the knot vector of `direction` without changing the described
    /// geometry, widening the control point lattice by one position along that
    /// direction, see \[Boehm1980\].
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn insert_knot(&mut self, direction: usize, u: f64) -> Result<(), SplineError> {
        let insertion =
            insert::prepare(self.knot_vector(direction), self.degree(direction), u)?;
        let (lattice, points_per_direction) = insert::widen_lattice(
            self.physical_space.lattice(),
            self.physical_space.points_per_direction(),
            direction,
            &insertion,
        );
        self.parameter_space.insert_knot(direction, u)?;
        self.physical_space.set_lattice(lattice, points_per_direction);
        Ok(())
    }

    /// Inserts all `knots` into `direction`. Either every knot is inserted or the
    /// spline is left untouched.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn refine_knots(&mut self, direction: usize, knots: &[f64]) -> Result<(), SplineError> {
        let mut refined = self.clone();
        for &u in knots {
            refined.insert_knot(direction, u)?;
        }
        *self = refined;
        Ok(())
    }

    /// Removes one copy of the knot `u` from `direction` if the described geometry
    /// stays within `tolerance` of the original, narrowing the control point lattice
    /// by one position along that direction.
    ///
    /// Returns `false` and leaves the spline untouched if `u` is not a knot or the
    /// removal would move the geometry by more than `tolerance`.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn remove_knot(
        &mut self,
        direction: usize,
        u: f64,
        tolerance: f64,
    ) -> Result<bool, SplineError> {
        let removal = match remove::prepare(self.knot_vector(direction), self.degree(direction), u)?
        {
            Some(removal) => removal,
            None => return Ok(false),
        };
        let narrowed = remove::narrow_lattice(
            self.physical_space.lattice(),
            self.physical_space.points_per_direction(),
            direction,
            &removal,
            tolerance,
        );
        let (lattice, points_per_direction) = match narrowed {
            Some(narrowed) => narrowed,
            None => return Ok(false),
        };
        let removed = self.parameter_space.remove_knot(direction, u);
        debug_assert!(removed);
        self.physical_space.set_lattice(lattice, points_per_direction);
        Ok(true)
    }

    /// Raises the degree of `direction` by one without changing the described
    /// geometry. Every distinct knot of that direction gains one copy and the lattice
    /// grows by one point per non-degenerate span.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn elevate_degree(&mut self, direction: usize) -> Result<(), SplineError> {
        let change = degree::elevate(
            self.knot_vector(direction),
            self.degree(direction),
            self.physical_space.lattice(),
            self.physical_space.points_per_direction(),
            direction,
        )?;
        self.parameter_space.set_basis(direction, change.knots, change.degree);
        self.physical_space.set_lattice(change.lattice, change.points_per_direction);
        Ok(())
    }

    /// Lowers the degree of `direction` by one if the described geometry stays within
    /// `tolerance` of the original, the approximate inverse of
    /// [`Self::elevate_degree`].
    ///
    /// Returns `false` and leaves the spline untouched if the error bound of the
    /// reduction exceeds `tolerance`.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn reduce_degree(
        &mut self,
        direction: usize,
        tolerance: f64,
    ) -> Result<bool, SplineError> {
        let reduced = degree::reduce(
            self.knot_vector(direction),
            self.degree(direction),
            self.physical_space.lattice(),
            self.physical_space.points_per_direction(),
            direction,
            tolerance,
        )?;
        let change = match reduced {
            Some(change) => change,
            None => return Ok(false),
        };
        self.parameter_space.set_basis(direction, change.knots, change.degree);
        self.physical_space.set_lattice(change.lattice, change.points_per_direction);
        Ok(true)
    }

    /// Whether both splines have the same parametrization and control points within
    /// `tolerance`.
    pub fn are_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.parameter_space.are_equal(&other.parameter_space, tolerance)
            && self.physical_space.are_equal(&other.physical_space, tolerance)
    }

    fn first_nonzero_positions(&self, coordinate: &[f64]) -> Vec<usize> {
        coordinate
            .iter()
            .enumerate()
            .map(|(direction, &u)| self.parameter_space.first_nonzero_basis_function(direction, u))
            .collect()
    }

    fn blended_point(&self, windows: &[VecD], firsts: &[usize]) -> VecD {
        let mut point = VecD::zeros(self.physical_space.dimensionality());
        super::for_each_window_contribution(
            windows,
            firsts,
            self.physical_space.points_per_direction(),
            |linear, blend| point.axpy(blend, &self.physical_space.point_view(linear), 1.0),
        );
        point
    }
}

impl Spline for BSpline {
    fn parameter_space(&self) -> &ParameterSpace {
        &self.parameter_space
    }

    fn dimensionality(&self) -> usize {
        self.physical_space.dimensionality()
    }

    fn evaluate(&self, coordinate: &[f64], dimensions: &[usize]) -> Result<VecD, SplineError> {
        super::check_coordinate(self.dimensions(), coordinate)?;
        super::check_output_dimensions(self.dimensionality(), dimensions)?;
        let windows: Vec<VecD> = coordinate
            .iter()
            .enumerate()
            .map(|(direction, &u)| {
                self.parameter_space.evaluate_all_nonzero_basis_functions(direction, u)
            })
            .collect();
        let point = self.blended_point(&windows, &self.first_nonzero_positions(coordinate));
        Ok(super::select_dimensions(&point, dimensions))
    }

    fn evaluate_derivative(
        &self,
        coordinate: &[f64],
        dimensions: &[usize],
        orders: &[usize],
    ) -> Result<VecD, SplineError> {
        super::check_coordinate(self.dimensions(), coordinate)?;
        super::check_orders(self.dimensions(), orders)?;
        super::check_output_dimensions(self.dimensionality(), dimensions)?;
        let windows: Vec<VecD> = coordinate
            .iter()
            .enumerate()
            .map(|(direction, &u)| {
                self.parameter_space.evaluate_all_nonzero_basis_function_derivatives(
                    direction,
                    u,
                    orders[direction],
                )
            })
            .collect();
        let point = self.blended_point(&windows, &self.first_nonzero_positions(coordinate));
        Ok(super::select_dimensions(&point, dimensions))
    }
}

impl PartialEq for BSpline {
    fn eq(&self, other: &Self) -> bool {
        self.parameter_space == other.parameter_space
            && self.physical_space == other.physical_space
    }
}
