use crate::index::MultiIndexHandler;
use crate::knots::KnotVector;
use crate::manipulation::{degree, insert, remove};
use crate::parameter_space::ParameterSpace;
use crate::physical_space::WeightedPhysicalSpace;
use crate::points::ControlPoint;
use crate::types::{MatD, VecD};

use super::{Spline, SplineError};

/// Rational tensor-product spline.
///
/// Pairs a [`ParameterSpace`] with a [`WeightedPhysicalSpace`]. Evaluation blends the
/// homogeneous control points and projects the blend back through its weight
/// coordinate, which realizes the rational basis
/// `R_i(u) = N_i(u) w_i / Σ_j N_j(u) w_j`. Knot insertion and removal run on the
/// homogeneous lattice for the same reason, so the rational geometry is preserved
/// exactly.
#[derive(Debug, Clone)]
pub struct Nurbs {
    parameter_space: ParameterSpace,
    physical_space: WeightedPhysicalSpace,
}

impl Nurbs {
    /// Creates a spline from one knot vector and degree per parametric direction, the
    /// control points in lattice order with direction 0 varying fastest, and one
    /// weight per control point.
    pub fn new(
        knot_vectors: Vec<KnotVector>,
        degrees: Vec<usize>,
        control_points: &[ControlPoint],
        weights: VecD,
    ) -> Result<Self, SplineError> {
        let parameter_space = ParameterSpace::new(knot_vectors, degrees)?;
        let physical_space = WeightedPhysicalSpace::new(
            control_points,
            weights,
            parameter_space.basis_function_counts(),
        )?;
        Ok(Self { parameter_space, physical_space })
    }

    /// Combines prebuilt spaces, validating that the lattice provides exactly one
    /// control point per basis function in every direction.
    pub fn from_spaces(
        parameter_space: ParameterSpace,
        physical_space: WeightedPhysicalSpace,
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

    pub fn physical_space(&self) -> &WeightedPhysicalSpace {
        &self.physical_space
    }

    /// Inserts `u` into the knot vector of `direction` without changing the described
    /// geometry, widening the homogeneous control point lattice by one position along
    /// that direction, see \[Boehm1980\].
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn insert_knot(&mut self, direction: usize, u: f64) -> Result<(), SplineError> {
        let insertion =
            insert::prepare(self.knot_vector(direction), self.degree(direction), u)?;
        let (homogeneous, points_per_direction) = insert::widen_lattice(
            &self.homogeneous_lattice(),
            self.physical_space.points_per_direction(),
            direction,
            &insertion,
        );
        self.parameter_space.insert_knot(direction, u)?;
        self.commit_homogeneous_lattice(homogeneous, points_per_direction);
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
    /// stays within `tolerance` of the original, narrowing the homogeneous control
    /// point lattice by one position along that direction.
    ///
    /// The tolerance is tightened to `tolerance * w_min / (1 + d_max)` on the
    /// homogeneous lattice, with `w_min` the minimum weight and `d_max` the maximum
    /// control point distance from the origin, so that the projected geometry moves
    /// by no more than `tolerance`, see eq. (5.30) in \[Piegl1997\].
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
        let scaled = tolerance * self.physical_space.minimum_weight()
            / (1.0 + self.physical_space.space().maximum_distance_from_origin());
        let narrowed = remove::narrow_lattice(
            &self.homogeneous_lattice(),
            self.physical_space.points_per_direction(),
            direction,
            &removal,
            scaled,
        );
        let (homogeneous, points_per_direction) = match narrowed {
            Some(narrowed) => narrowed,
            None => return Ok(false),
        };
        let removed = self.parameter_space.remove_knot(direction, u);
        debug_assert!(removed);
        self.commit_homogeneous_lattice(homogeneous, points_per_direction);
        Ok(true)
    }

    /// Raises the degree of `direction` by one without changing the described
    /// geometry. Every distinct knot of that direction gains one copy and the
    /// homogeneous lattice grows by one position per non-degenerate span, so points
    /// and weights are blended together.
    ///
    /// # Panics
    /// Panics if `direction` is not smaller than [`Spline::dimensions`].
    pub fn elevate_degree(&mut self, direction: usize) -> Result<(), SplineError> {
        let change = degree::elevate(
            self.knot_vector(direction),
            self.degree(direction),
            &self.homogeneous_lattice(),
            self.physical_space.points_per_direction(),
            direction,
        )?;
        self.parameter_space.set_basis(direction, change.knots, change.degree);
        self.commit_homogeneous_lattice(change.lattice, change.points_per_direction);
        Ok(())
    }

    /// Lowers the degree of `direction` by one if the described geometry stays within
    /// `tolerance` of the original, the approximate inverse of
    /// [`Self::elevate_degree`].
    ///
    /// The tolerance is tightened on the homogeneous lattice the same way as for
    /// [`Self::remove_knot`], so the bound keeps its projected-coordinate meaning.
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
        let scaled = tolerance * self.physical_space.minimum_weight()
            / (1.0 + self.physical_space.space().maximum_distance_from_origin());
        let reduced = degree::reduce(
            self.knot_vector(direction),
            self.degree(direction),
            &self.homogeneous_lattice(),
            self.physical_space.points_per_direction(),
            direction,
            scaled,
        )?;
        let change = match reduced {
            Some(change) => change,
            None => return Ok(false),
        };
        self.parameter_space.set_basis(direction, change.knots, change.degree);
        self.commit_homogeneous_lattice(change.lattice, change.points_per_direction);
        Ok(true)
    }

    /// Whether both splines have the same parametrization, control points and weights
    /// within `tolerance`.
    pub fn are_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.parameter_space.are_equal(&other.parameter_space, tolerance)
            && self.physical_space.are_equal(&other.physical_space, tolerance)
    }

    /// All homogeneous control points as one lattice with the weights in the last
    /// row.
    fn homogeneous_lattice(&self) -> MatD {
        let dimensionality = self.physical_space.dimensionality();
        let total = self.physical_space.total_number_of_points();
        let mut lattice = MatD::zeros(dimensionality + 1, total);
        for linear in 0..total {
            lattice.set_column(linear, &self.physical_space.homogeneous_control_point(linear));
        }
        lattice
    }

    /// Splits a homogeneous lattice back into projected control points and weights.
    fn commit_homogeneous_lattice(
        &mut self,
        homogeneous: MatD,
        points_per_direction: Vec<usize>,
    ) {
        let dimensionality = self.physical_space.dimensionality();
        let weights = homogeneous.row(dimensionality).transpose();
        let mut lattice = homogeneous.rows(0, dimensionality).into_owned();
        for (linear, &weight) in weights.iter().enumerate() {
            let mut column = lattice.column_mut(linear);
            column /= weight;
        }
        self.physical_space.set_lattice(lattice, weights, points_per_direction);
    }

    fn first_nonzero_positions(&self, coordinate: &[f64]) -> Vec<usize> {
        coordinate
            .iter()
            .enumerate()
            .map(|(direction, &u)| self.parameter_space.first_nonzero_basis_function(direction, u))
            .collect()
    }

    /// Blend of the homogeneous control points with the given per-direction windows.
    fn blended_homogeneous_point(&self, windows: &[VecD], firsts: &[usize]) -> VecD {
        let mut point = VecD::zeros(self.physical_space.dimensionality() + 1);
        super::for_each_window_contribution(
            windows,
            firsts,
            self.physical_space.points_per_direction(),
            |linear, blend| {
                point.axpy(blend, &self.physical_space.homogeneous_control_point(linear), 1.0)
            },
        );
        point
    }

    fn blended_homogeneous_derivative(
        &self,
        coordinate: &[f64],
        firsts: &[usize],
        orders: &[usize],
    ) -> VecD {
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
        self.blended_homogeneous_point(&windows, firsts)
    }
}

impl Spline for Nurbs {
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
        let homogeneous =
            self.blended_homogeneous_point(&windows, &self.first_nonzero_positions(coordinate));
        let dimensionality = self.dimensionality();
        let weight = homogeneous[dimensionality];
        // Outside the knot vector ranges every basis function vanishes, so the blended
        // weight coordinate is zero and the projection degenerates to the zero point.
        if weight == 0.0 {
            return Ok(VecD::zeros(dimensions.len()));
        }
        let point = homogeneous.rows(0, dimensionality) / weight;
        Ok(super::select_dimensions(&point, dimensions))
    }

    /// Derivatives of the projected spline are recovered from the homogeneous
    /// derivatives by peeling off the lower ones, see eq. (4.20) in \[Piegl1997\]
    /// generalized to mixed partials:
    ///
    /// ```text
    /// C^(γ) = (A^(γ) - Σ_{0<β≤γ} binom(γ,β) w^(β) C^(γ-β)) / w
    /// ```
    ///
    /// with `A` the homogeneous coordinates and `w` the weight coordinate. The mixed
    /// partials up to `γ` are computed in lattice order, so every `C^(γ-β)` is ready
    /// when needed.
    fn evaluate_derivative(
        &self,
        coordinate: &[f64],
        dimensions: &[usize],
        orders: &[usize],
    ) -> Result<VecD, SplineError> {
        super::check_coordinate(self.dimensions(), coordinate)?;
        super::check_orders(self.dimensions(), orders)?;
        super::check_output_dimensions(self.dimensionality(), dimensions)?;
        let dimensionality = self.dimensionality();
        let firsts = self.first_nonzero_positions(coordinate);
        let sizes: Vec<usize> = orders.iter().map(|&order| order + 1).collect();
        let mut grid = MultiIndexHandler::new(&sizes);
        let total = grid.linear_length();
        let mut projected: Vec<VecD> = Vec::with_capacity(total);
        let mut weights: Vec<f64> = Vec::with_capacity(total);
        for step in 0..total {
            let gamma = grid.indices().to_vec();
            let homogeneous = self.blended_homogeneous_derivative(coordinate, &firsts, &gamma);
            weights.push(homogeneous[dimensionality]);
            if step == 0 {
                if weights[0] == 0.0 {
                    return Ok(VecD::zeros(dimensions.len()));
                }
                projected.push(homogeneous.rows(0, dimensionality) / weights[0]);
                grid.advance();
                continue;
            }
            let mut numerator = homogeneous.rows(0, dimensionality).into_owned();
            let mut beta = MultiIndexHandler::new(&sizes);
            beta.advance();
            for _ in 1..total {
                let within = beta.indices().iter().zip(&gamma).all(|(&b, &g)| b <= g);
                if within {
                    let mut factor = 1.0;
                    let mut remainder = vec![0; gamma.len()];
                    for (direction, (&b, &g)) in beta.indices().iter().zip(&gamma).enumerate() {
                        factor *= binomial_coefficient(g, b);
                        remainder[direction] = g - b;
                    }
                    let mut lower = MultiIndexHandler::new(&sizes);
                    lower.set_indices(&remainder);
                    numerator.axpy(
                        -factor * weights[beta.linear_index()],
                        &projected[lower.linear_index()],
                        1.0,
                    );
                }
                beta.advance();
            }
            projected.push(numerator / weights[0]);
            grid.advance();
        }
        Ok(super::select_dimensions(&projected[total - 1], dimensions))
    }
}

impl PartialEq for Nurbs {
    fn eq(&self, other: &Self) -> bool {
        self.parameter_space == other.parameter_space
            && self.physical_space == other.physical_space
    }
}

/// Binomial coefficient `n` over `k` as a float.
fn binomial_coefficient(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    let mut result = 1;
    for i in 0..k {
        result = result * (n - i) / (i + 1);
    }
    result as f64
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dvector;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::manipulation::remove::RemoveError;
    use crate::physical_space::PhysicalSpaceError;
    use crate::spline::BSpline;

    fn planar(coordinates: &[(f64, f64)]) -> Vec<ControlPoint> {
        coordinates.iter().map(|&(x, y)| ControlPoint::planar(x, y)).collect()
    }

    fn surface_points() -> Vec<ControlPoint> {
        planar(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (3.0, 0.0),
            (-1.0, 0.5),
            (2.0, 2.0),
            (4.0, 1.0),
            (0.0, 2.0),
            (2.5, 3.5),
            (5.0, 2.0),
        ])
    }

    #[fixture]
    fn rational_curve() -> Nurbs {
        let knots =
            KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0]).unwrap();
        let points = planar(&[(0.0, 0.0), (1.0, 1.0), (3.0, 2.0), (4.0, 1.0), (5.0, -1.0)]);
        Nurbs::new(vec![knots], vec![2], &points, dvector![1.0, 4.0, 1.0, 1.0, 1.0]).unwrap()
    }

    #[fixture]
    fn rational_surface() -> Nurbs {
        let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let weights = dvector![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0];
        Nurbs::new(vec![knots.clone(), knots], vec![2, 2], &surface_points(), weights).unwrap()
    }

    mod construction {
        use super::*;

        #[rstest]
        fn derives_the_lattice_shape_from_the_bases(rational_surface: Nurbs) {
            assert_eq!(rational_surface.dimensions(), 2);
            assert_eq!(rational_surface.dimensionality(), 2);
            assert_eq!(rational_surface.physical_space().points_per_direction(), &[3, 3]);
            assert_relative_eq!(rational_surface.physical_space().weight(7), 2.0);
        }

        #[test]
        fn rejects_a_weight_count_not_matching_the_points() {
            let knots =
                KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0]).unwrap();
            let points = planar(&[(0.0, 0.0), (1.0, 1.0), (3.0, 2.0), (4.0, 1.0), (5.0, -1.0)]);
            assert_eq!(
                Nurbs::new(vec![knots], vec![2], &points, dvector![1.0, 1.0]),
                Err(SplineError::PhysicalSpace(PhysicalSpaceError::WrongNumberOfWeights {
                    number_of_points: 5,
                    number_of_weights: 2
                }))
            );
        }

        #[rstest]
        fn rejects_a_lattice_not_matching_the_bases(rational_curve: Nurbs) {
            let knots =
                KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0]).unwrap();
            let parameter_space = ParameterSpace::new(vec![knots], vec![2]).unwrap();
            assert_eq!(
                Nurbs::from_spaces(parameter_space, rational_curve.physical_space().clone()),
                Err(SplineError::MismatchedSpaces { expected: vec![6], actual: vec![5] })
            );
        }
    }

    mod evaluation {
        use super::*;

        #[rstest]
        fn interpolates_the_boundary_points(rational_curve: Nurbs) {
            assert_relative_eq!(rational_curve.point(&[0.0]).unwrap(), dvector![0.0, 0.0]);
            assert_relative_eq!(rational_curve.point(&[3.0]).unwrap(), dvector![5.0, -1.0]);
        }

        #[rstest]
        fn pulls_the_curve_towards_a_heavy_point(rational_curve: Nurbs) {
            assert_relative_eq!(
                rational_curve.point(&[1.0]).unwrap(),
                dvector![1.4, 1.2],
                epsilon = 1e-12
            );
        }

        #[rstest]
        fn interpolates_the_surface_corners(rational_surface: Nurbs) {
            assert_relative_eq!(rational_surface.point(&[0.0, 0.0]).unwrap(), dvector![0.0, 0.0]);
            assert_relative_eq!(rational_surface.point(&[1.0, 0.0]).unwrap(), dvector![3.0, 0.0]);
            assert_relative_eq!(rational_surface.point(&[1.0, 1.0]).unwrap(), dvector![5.0, 2.0]);
        }

        #[rstest]
        fn projects_the_homogeneous_blend(rational_surface: Nurbs) {
            assert_relative_eq!(
                rational_surface.point(&[0.5, 1.0]).unwrap(),
                dvector![2.5, 3.0],
                epsilon = 1e-12
            );
            assert_relative_eq!(
                rational_surface.point(&[0.4, 0.6]).unwrap(),
                dvector![1.62074, 1.88267],
                epsilon = 1e-5
            );
            assert_relative_eq!(
                rational_surface.point(&[0.9, 1.0]).unwrap(),
                dvector![4.19492, 2.45763],
                epsilon = 1e-5
            );
        }

        #[rstest]
        fn vanishes_outside_the_knot_vector_ranges(rational_curve: Nurbs) {
            assert_relative_eq!(rational_curve.point(&[-1.0]).unwrap(), dvector![0.0, 0.0]);
            assert_relative_eq!(rational_curve.point(&[4.0]).unwrap(), dvector![0.0, 0.0]);
        }

        #[rstest]
        fn rejects_a_wrong_coordinate_count(rational_curve: Nurbs) {
            assert_eq!(
                rational_curve.evaluate(&[0.5, 0.5], &[0]),
                Err(SplineError::WrongCoordinateCount {
                    number_of_coordinates: 2,
                    dimensions: 1
                })
            );
        }

        #[rstest]
        fn rejects_an_unknown_spatial_dimension(rational_surface: Nurbs) {
            assert_eq!(
                rational_surface.evaluate(&[0.5, 0.5], &[2]),
                Err(SplineError::UnknownSpatialDimension { dimension: 2, dimensionality: 2 })
            );
        }
    }

    mod derivatives {
        use super::*;

        #[rstest]
        fn takes_corner_derivatives(rational_surface: Nurbs) {
            assert_relative_eq!(
                rational_surface.evaluate_derivative(&[0.0, 1.0], &[0, 1], &[1, 0]).unwrap(),
                dvector![10.0, 6.0]
            );
            assert_relative_eq!(
                rational_surface.evaluate_derivative(&[0.0, 1.0], &[0, 1], &[0, 1]).unwrap(),
                dvector![2.0, 3.0]
            );
        }

        #[rstest]
        fn peels_the_weight_derivatives_off_interior_ones(rational_surface: Nurbs) {
            assert_relative_eq!(
                rational_surface.evaluate_derivative(&[0.4, 0.6], &[0, 1], &[1, 0]).unwrap(),
                dvector![4.15298, 0.792032],
                epsilon = 1e-5
            );
            assert_relative_eq!(
                rational_surface.evaluate_derivative(&[0.4, 0.6], &[0, 1], &[0, 1]).unwrap(),
                dvector![1.40046, 3.13402],
                epsilon = 1e-5
            );
        }

        #[rstest]
        fn reduces_to_the_value_for_zero_orders(rational_surface: Nurbs) {
            assert_relative_eq!(
                rational_surface.evaluate_derivative(&[0.4, 0.6], &[0, 1], &[0, 0]).unwrap(),
                rational_surface.point(&[0.4, 0.6]).unwrap()
            );
        }

        #[rstest]
        fn rejects_a_wrong_order_count(rational_curve: Nurbs) {
            assert_eq!(
                rational_curve.evaluate_derivative(&[1.0], &[0], &[1, 1]),
                Err(SplineError::WrongOrderCount { number_of_orders: 2, dimensions: 1 })
            );
        }
    }

    mod knot_insertion {
        use super::*;

        #[rstest]
        fn preserves_the_described_geometry(rational_curve: Nurbs) {
            let mut refined = rational_curve.clone();
            refined.insert_knot(0, 1.5).unwrap();

            assert_eq!(refined.knot_vector(0).len(), 9);
            assert_eq!(refined.physical_space().total_number_of_points(), 6);
            for i in 0..=30 {
                let u = i as f64 / 10.0;
                assert_relative_eq!(
                    refined.point(&[u]).unwrap(),
                    rational_curve.point(&[u]).unwrap(),
                    epsilon = 1e-12
                );
            }
        }

        #[rstest]
        fn blends_the_weights_alongside_the_points(rational_curve: Nurbs) {
            let mut refined = rational_curve.clone();
            refined.insert_knot(0, 1.5).unwrap();

            let weights = refined.physical_space().weights();
            assert_relative_eq!(weights, &dvector![1.0, 4.0, 1.75, 1.0, 1.0, 1.0]);
        }

        #[rstest]
        fn widens_a_surface_lattice_in_one_direction(rational_surface: Nurbs) {
            let mut refined = rational_surface.clone();
            refined.insert_knot(0, 0.5).unwrap();

            assert_eq!(refined.physical_space().points_per_direction(), &[4, 3]);
            assert!(refined.are_geometrically_equal(&rational_surface, 1e-10));
        }
    }

    mod knot_removal {
        use super::*;

        #[rstest]
        fn inverts_an_insertion(rational_curve: Nurbs) {
            let mut curve = rational_curve.clone();
            curve.insert_knot(0, 1.5).unwrap();

            assert_eq!(curve.remove_knot(0, 1.5, 1e-10), Ok(true));
            assert!(curve.are_equal(&rational_curve, 1e-10));
        }

        #[rstest]
        fn keeps_an_essential_knot(rational_curve: Nurbs) {
            let mut curve = rational_curve.clone();
            assert_eq!(curve.remove_knot(0, 1.0, 1e-12), Ok(false));
            assert_eq!(curve, rational_curve);
        }

        #[rstest]
        fn reports_a_coordinate_that_is_not_a_knot(rational_curve: Nurbs) {
            let mut curve = rational_curve;
            assert_eq!(curve.remove_knot(0, 1.5, 1e-10), Ok(false));
        }

        #[rstest]
        fn rejects_a_knot_outside_the_removable_interval(rational_curve: Nurbs) {
            let mut curve = rational_curve;
            assert_eq!(
                curve.remove_knot(0, 3.0, 1e-10),
                Err(SplineError::Removal(RemoveError::OutOfBounds {
                    u: 3.0,
                    lower_bound: 0.0,
                    upper_bound: 3.0
                }))
            );
        }
    }

    mod degree_change {
        use super::*;

        #[rstest]
        fn elevation_preserves_the_described_geometry(rational_curve: Nurbs) {
            let mut elevated = rational_curve.clone();
            elevated.elevate_degree(0).unwrap();

            assert_eq!(elevated.degree(0), 3);
            assert_eq!(elevated.knot_vector(0).len(), 12);
            assert_eq!(elevated.physical_space().total_number_of_points(), 8);
            assert!(elevated.are_geometrically_equal(&rational_curve, 1e-10));
            // Clamped end weights carry over unchanged.
            assert_relative_eq!(elevated.physical_space().weight(0), 1.0);
            assert_relative_eq!(elevated.physical_space().weight(7), 1.0);
        }

        #[rstest]
        fn elevates_one_direction_of_a_surface(rational_surface: Nurbs) {
            let mut elevated = rational_surface.clone();
            elevated.elevate_degree(1).unwrap();

            assert_eq!(elevated.degree(1), 3);
            assert_eq!(elevated.physical_space().points_per_direction(), &[3, 4]);
            assert!(elevated.are_geometrically_equal(&rational_surface, 1e-10));
        }

        #[rstest]
        fn reduction_inverts_an_elevation(rational_curve: Nurbs) {
            let mut curve = rational_curve.clone();
            curve.elevate_degree(0).unwrap();

            assert_eq!(curve.reduce_degree(0, 1e-8), Ok(true));
            assert_eq!(curve.degree(0), 2);
            assert!(curve.are_equal(&rational_curve, 1e-8));
        }

        #[rstest]
        fn keeps_a_genuinely_quadratic_curve(rational_curve: Nurbs) {
            let mut curve = rational_curve.clone();
            assert_eq!(curve.reduce_degree(0, 1e-10), Ok(false));
            assert_eq!(curve, rational_curve);
        }

        #[test]
        fn matches_the_polynomial_elevation_for_unit_weights() {
            let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
            let mut nurbs = Nurbs::new(
                vec![knots.clone(), knots.clone()],
                vec![2, 2],
                &surface_points(),
                VecD::from_element(9, 1.0),
            )
            .unwrap();
            let mut bspline =
                BSpline::new(vec![knots.clone(), knots], vec![2, 2], &surface_points()).unwrap();
            nurbs.elevate_degree(0).unwrap();
            bspline.elevate_degree(0).unwrap();

            assert!(nurbs.are_geometrically_equal(&bspline, 1e-10));
            // Unit weights stay unit weights under homogeneous blending.
            assert_relative_eq!(nurbs.physical_space().weights(), &VecD::from_element(12, 1.0));
        }
    }

    mod comparison {
        use super::*;

        #[test]
        fn reduces_to_a_polynomial_spline_for_unit_weights() {
            let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 2.0, 2.0, 2.0]).unwrap();
            let nurbs = Nurbs::new(
                vec![knots.clone(), knots.clone()],
                vec![2, 2],
                &surface_points(),
                VecD::from_element(9, 1.0),
            )
            .unwrap();
            let bspline =
                BSpline::new(vec![knots.clone(), knots], vec![2, 2], &surface_points()).unwrap();

            assert_relative_eq!(
                nurbs.point(&[0.8, 1.2]).unwrap(),
                bspline.point(&[0.8, 1.2]).unwrap(),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                nurbs.evaluate_derivative(&[0.8, 1.2], &[0, 1], &[1, 1]).unwrap(),
                bspline.evaluate_derivative(&[0.8, 1.2], &[0, 1], &[1, 1]).unwrap(),
                epsilon = 1e-12
            );
            assert!(nurbs.are_geometrically_equal(&bspline, 1e-10));
        }

        #[rstest]
        fn detects_a_changed_weight(rational_surface: Nurbs) {
            let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
            let plain = Nurbs::new(
                vec![knots.clone(), knots],
                vec![2, 2],
                &surface_points(),
                VecD::from_element(9, 1.0),
            )
            .unwrap();
            assert!(!plain.are_geometrically_equal(&rational_surface, 1e-3));
            assert!(!plain.are_equal(&rational_surface, 1e-3));
        }
    }
}
