//! The parametric domain of a tensor-product spline.
//!
//! A [`ParameterSpace`] pairs one knot vector and one polynomial degree per parametric
//! direction. At a parameter `u` in direction `i` at most `degree_i + 1` basis
//! functions are nonzero, namely those starting at positions `s - degree_i` through
//! `s` for the knot span `s` containing `u`, see section 2.5 in \[Piegl1997\]. The
//! per-direction window of these values is what tensor-product evaluation combines
//! across directions.
//!
//! Parameters outside the knot vector range are tolerated: every basis function
//! vanishes there, so windows of zeros are returned instead of an error.

use thiserror::Error;

use crate::basis::BasisFunctions;
use crate::knots::{KnotError, KnotVector};
use crate::types::VecD;

/// Knot vectors and degrees of all parametric directions.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    bases: Vec<BasisFunctions>,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParameterSpaceError {
    #[error("Got {number_of_knot_vectors} knot vectors and {number_of_degrees} degrees, but one of each is needed per parametric direction.")]
    DimensionMismatch { number_of_knot_vectors: usize, number_of_degrees: usize },
    #[error(transparent)]
    Knots(#[from] KnotError),
}

impl ParameterSpace {
    /// Validates that every direction brings enough knots for its degree, namely
    /// `2 * (degree + 1)` so that at least one basis function spans the domain.
    pub fn new(
        knot_vectors: Vec<KnotVector>,
        degrees: Vec<usize>,
    ) -> Result<Self, ParameterSpaceError> {
        if knot_vectors.len() != degrees.len() {
            return Err(ParameterSpaceError::DimensionMismatch {
                number_of_knot_vectors: knot_vectors.len(),
                number_of_degrees: degrees.len(),
            });
        }
        let mut bases = Vec::with_capacity(degrees.len());
        for (knots, &degree) in knot_vectors.into_iter().zip(&degrees) {
            if knots.len() < 2 * (degree + 1) {
                return Err(KnotError::TooFewKnots {
                    degree,
                    needed: 2 * (degree + 1),
                    number_of_knots: knots.len(),
                }
                .into());
            }
            bases.push(BasisFunctions::new(knots, degree));
        }
        Ok(Self { bases })
    }

    /// Number of parametric directions.
    pub fn dimensions(&self) -> usize {
        self.bases.len()
    }

    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn degree(&self, direction: usize) -> usize {
        self.bases[direction].degree()
    }

    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn knot_vector(&self, direction: usize) -> &KnotVector {
        self.bases[direction].knot_vector()
    }

    /// Number of basis functions in `direction`, which equals the number of control
    /// points the physical space must provide along that direction.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn number_of_basis_functions(&self, direction: usize) -> usize {
        self.bases[direction].number_of_basis_functions()
    }

    /// Basis function counts of all directions.
    pub fn basis_function_counts(&self) -> Vec<usize> {
        self.bases.iter().map(BasisFunctions::number_of_basis_functions).collect()
    }

    /// Total number of tensor-product basis functions.
    pub fn total_number_of_basis_functions(&self) -> usize {
        self.bases.iter().map(BasisFunctions::number_of_basis_functions).product()
    }

    /// Position of the first basis function whose support contains `u`, clamped into
    /// the valid window range so that the window never indexes past the basis.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn first_nonzero_basis_function(&self, direction: usize, u: f64) -> usize {
        let basis = &self.bases[direction];
        let degree = basis.degree();
        let span = basis.knot_vector().knot_span(u);
        span.saturating_sub(degree).min(basis.number_of_basis_functions() - degree - 1)
    }

    /// Value of the basis function starting at `start` in `direction`.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`] or `start` does
    /// not index a basis function.
    pub fn evaluate_basis_function(&self, direction: usize, start: usize, u: f64) -> f64 {
        let basis = &self.bases[direction];
        basis.evaluate(basis.degree(), start, u)
    }

    /// Value of the `order`-th derivative of the basis function starting at `start` in
    /// `direction`.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`] or `start` does
    /// not index a basis function.
    pub fn evaluate_basis_function_derivative(
        &self,
        direction: usize,
        start: usize,
        u: f64,
        order: usize,
    ) -> f64 {
        let basis = &self.bases[direction];
        basis.evaluate_derivative(basis.degree(), start, u, order)
    }

    /// The `degree + 1` possibly nonzero basis function values at `u`, starting at
    /// [`Self::first_nonzero_basis_function`]. All zeros if `u` lies outside the knot
    /// vector range.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn evaluate_all_nonzero_basis_functions(&self, direction: usize, u: f64) -> VecD {
        let first = self.first_nonzero_basis_function(direction, u);
        let degree = self.degree(direction);
        VecD::from_fn(degree + 1, |i, _| self.evaluate_basis_function(direction, first + i, u))
    }

    /// The `order`-th derivatives of the window returned by
    /// [`Self::evaluate_all_nonzero_basis_functions`].
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn evaluate_all_nonzero_basis_function_derivatives(
        &self,
        direction: usize,
        u: f64,
        order: usize,
    ) -> VecD {
        let first = self.first_nonzero_basis_function(direction, u);
        let degree = self.degree(direction);
        VecD::from_fn(degree + 1, |i, _| {
            self.evaluate_basis_function_derivative(direction, first + i, u, order)
        })
    }

    /// Inserts `u` into the knot vector of `direction` and rebuilds the basis.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn insert_knot(&mut self, direction: usize, u: f64) -> Result<(), KnotError> {
        let basis = &self.bases[direction];
        let mut knots = basis.knot_vector().clone();
        knots.insert(u)?;
        self.bases[direction] = BasisFunctions::new(knots, basis.degree());
        Ok(())
    }

    /// Removes one copy of the knot `u` from `direction` and rebuilds the basis.
    /// Returns `false` if `u` is not a knot.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub fn remove_knot(&mut self, direction: usize, u: f64) -> bool {
        let basis = &self.bases[direction];
        let mut knots = basis.knot_vector().clone();
        if !knots.remove(u) {
            return false;
        }
        self.bases[direction] = BasisFunctions::new(knots, basis.degree());
        true
    }

    /// Replaces the knot vector and degree of `direction` and rebuilds the basis,
    /// committing a degree change.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Self::dimensions`].
    pub(crate) fn set_basis(&mut self, direction: usize, knots: KnotVector, degree: usize) {
        debug_assert!(knots.len() >= 2 * (degree + 1));
        self.bases[direction] = BasisFunctions::new(knots, degree);
    }

    /// Whether both spaces have the same degrees and knot vectors within `tolerance`.
    pub fn are_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.dimensions() == other.dimensions()
            && self.bases.iter().zip(&other.bases).all(|(a, b)| {
                a.degree() == b.degree() && a.knot_vector().are_equal(b.knot_vector(), tolerance)
            })
    }
}

impl PartialEq for ParameterSpace {
    fn eq(&self, other: &Self) -> bool {
        self.are_equal(other, crate::numeric::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dvector, DVector};
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn quadratic_1d() -> ParameterSpace {
        let knots =
            KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 5.0, 5.0, 5.0])
                .unwrap();
        ParameterSpace::new(vec![knots], vec![2]).unwrap()
    }

    #[fixture]
    fn biquadratic() -> ParameterSpace {
        let knots = || KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        ParameterSpace::new(vec![knots(), knots()], vec![2, 2]).unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_mismatched_directions() {
            let knots = KnotVector::new(dvector![0.0, 0.0, 1.0, 1.0]).unwrap();
            assert_eq!(
                ParameterSpace::new(vec![knots], vec![1, 1]),
                Err(ParameterSpaceError::DimensionMismatch {
                    number_of_knot_vectors: 1,
                    number_of_degrees: 2,
                })
            );
        }

        #[test]
        fn rejects_too_few_knots_for_the_degree() {
            let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 1.0]).unwrap();
            assert_eq!(
                ParameterSpace::new(vec![knots], vec![2]),
                Err(ParameterSpaceError::Knots(KnotError::TooFewKnots {
                    degree: 2,
                    needed: 6,
                    number_of_knots: 5,
                }))
            );
        }

        #[rstest]
        fn counts_basis_functions(quadratic_1d: ParameterSpace, biquadratic: ParameterSpace) {
            assert_eq!(quadratic_1d.dimensions(), 1);
            assert_eq!(quadratic_1d.number_of_basis_functions(0), 8);
            assert_eq!(biquadratic.dimensions(), 2);
            assert_eq!(biquadratic.basis_function_counts(), vec![3, 3]);
            assert_eq!(biquadratic.total_number_of_basis_functions(), 9);
        }
    }

    mod windows {
        use super::*;

        #[rstest]
        #[case(0.0, 0)]
        #[case(1.5, 1)]
        #[case(4.5, 5)]
        #[case(5.0, 5)]
        fn locates_the_first_nonzero_basis_function(
            quadratic_1d: ParameterSpace,
            #[case] u: f64,
            #[case] first: usize,
        ) {
            assert_eq!(quadratic_1d.first_nonzero_basis_function(0, u), first);
        }

        #[rstest]
        fn evaluates_the_nonzero_window(quadratic_1d: ParameterSpace) {
            let window = quadratic_1d.evaluate_all_nonzero_basis_functions(0, 1.5);
            assert_relative_eq!(window, dvector![0.125, 0.75, 0.125]);
        }

        #[rstest]
        fn window_at_the_boundary_is_interpolatory(quadratic_1d: ParameterSpace) {
            let window = quadratic_1d.evaluate_all_nonzero_basis_functions(0, 5.0);
            assert_relative_eq!(window, dvector![0.0, 0.0, 1.0]);
        }

        #[rstest]
        #[case(-1.0)]
        #[case(5.5)]
        fn window_outside_the_range_is_zero(quadratic_1d: ParameterSpace, #[case] u: f64) {
            let window = quadratic_1d.evaluate_all_nonzero_basis_functions(0, u);
            assert_eq!(window, DVector::zeros(3));
        }

        #[rstest]
        fn evaluates_bernstein_values_on_a_bezier_patch(biquadratic: ParameterSpace) {
            let window = biquadratic.evaluate_all_nonzero_basis_functions(1, 0.4);
            assert_relative_eq!(window, dvector![0.36, 0.48, 0.16], epsilon = 1e-12);
        }

        #[rstest]
        #[case(0.7)]
        #[case(2.25)]
        #[case(3.9)]
        fn window_derivatives_sum_to_zero(quadratic_1d: ParameterSpace, #[case] u: f64) {
            let derivatives =
                quadratic_1d.evaluate_all_nonzero_basis_function_derivatives(0, u, 1);
            assert_relative_eq!(derivatives.sum(), 0.0, epsilon = 1e-12);
        }
    }

    mod mutation {
        use super::*;

        #[rstest]
        fn insertion_extends_the_basis(mut quadratic_1d: ParameterSpace) {
            quadratic_1d.insert_knot(0, 2.5).unwrap();
            assert_eq!(quadratic_1d.number_of_basis_functions(0), 9);
            assert_eq!(quadratic_1d.knot_vector(0).multiplicity(2.5), 1);
            let window = quadratic_1d.evaluate_all_nonzero_basis_functions(0, 2.5);
            assert_relative_eq!(window.sum(), 1.0, epsilon = 1e-12);
        }

        #[rstest]
        fn removal_shrinks_the_basis(mut quadratic_1d: ParameterSpace) {
            quadratic_1d.insert_knot(0, 2.5).unwrap();
            assert!(quadratic_1d.remove_knot(0, 2.5));
            assert_eq!(quadratic_1d.number_of_basis_functions(0), 8);
            assert!(!quadratic_1d.remove_knot(0, 2.5));
        }
    }

    mod comparison {
        use super::*;

        #[rstest]
        fn recognizes_equal_spaces(biquadratic: ParameterSpace) {
            assert_eq!(biquadratic.clone(), biquadratic);
        }

        #[rstest]
        fn distinguishes_degrees(quadratic_1d: ParameterSpace) {
            let knots = quadratic_1d.knot_vector(0).clone();
            let linear = ParameterSpace::new(vec![knots], vec![1]).unwrap();
            assert!(!quadratic_1d.are_equal(&linear, 1.0));
        }
    }
}
