//! Inserts an additional knot into one parametric direction.
//!
//! Knot insertion after Boehm, see \[Boehm1980\] and section 5.2 in \[Piegl1997\]: for
//! a knot `u` in the span `(u_k, u_{k+1}]` of direction `d`, the knot vector gains one
//! copy of `u` while the lattice lines along `d` grow by one point. Only the points
//! `k-p+1` through `k` of each line change, replaced by the convex combinations
//!
//! ```text
//! Q_i = α_i · P_i + (1 - α_i) · P_{i-1},    α_i = (u - u_i) / (u_{i+p} - u_i)
//! ```
//!
//! which leaves every evaluation of the spline unchanged. Rational splines blend their
//! lattice in homogeneous coordinates, so the same routine serves both spline kinds.

use thiserror::Error;

use crate::index::MultiIndexHandler;
use crate::knots::KnotVector;
use crate::types::MatD;

#[derive(Error, Debug, PartialEq)]
pub enum InsertError {
    #[error("Parameter `u = {u}` lies outside the insertable interval `({lower_bound}, {upper_bound})`.")]
    OutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error(
        "The knot `u = {u}` has a multiplicity of `{multiplicity}` already. \
    Another insertion would raise it beyond the degree `{degree}`."
    )]
    MultiplicityExceeded { u: f64, multiplicity: usize, degree: usize },
}

/// The lattice positions touched by one insertion and their blending factors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SingleInsertion {
    /// First changed point position along the direction.
    pub first: usize,
    /// Last changed point position along the direction.
    pub last: usize,
    /// The factors `α_i` for `i` in `first..=last`.
    pub scalings: Vec<f64>,
}

/// Validates `u` against the natural domain `(u_p, u_{m-p})` and the multiplicity
/// limit, and precomputes the blending factors.
pub(crate) fn prepare(
    knots: &KnotVector,
    degree: usize,
    u: f64,
) -> Result<SingleInsertion, InsertError> {
    let lower_bound = knots.knot(degree);
    let upper_bound = knots.knot(knots.len() - 1 - degree);
    if u <= lower_bound || u >= upper_bound {
        return Err(InsertError::OutOfBounds { u, lower_bound, upper_bound });
    }
    let multiplicity = knots.multiplicity(u);
    if multiplicity >= degree {
        return Err(InsertError::MultiplicityExceeded { u, multiplicity, degree });
    }
    let span = knots.knot_span(u);
    let first = span + 1 - degree;
    let last = span - multiplicity;
    let scalings = (first..=last)
        .map(|i| (u - knots.knot(i)) / (knots.knot(i + degree) - knots.knot(i)))
        .collect();
    Ok(SingleInsertion { first, last, scalings })
}

/// Grows the lattice by one point along `direction`, blending the affected lines.
///
/// Returns the widened lattice together with the updated per-direction counts.
pub(crate) fn widen_lattice(
    lattice: &MatD,
    points_per_direction: &[usize],
    direction: usize,
    insertion: &SingleInsertion,
) -> (MatD, Vec<usize>) {
    let mut widened_counts = points_per_direction.to_vec();
    widened_counts[direction] += 1;
    let total: usize = widened_counts.iter().product();
    let mut widened = MatD::zeros(lattice.nrows(), total);
    let mut target = MultiIndexHandler::new(&widened_counts);
    let mut source = MultiIndexHandler::new(points_per_direction);
    for linear in 0..total {
        target.set_linear_index(linear);
        let mut tuple = target.indices().to_vec();
        let i = tuple[direction];
        if i < insertion.first {
            source.set_indices(&tuple);
            widened.set_column(linear, &lattice.column(source.linear_index()));
        } else if i > insertion.last {
            tuple[direction] = i - 1;
            source.set_indices(&tuple);
            widened.set_column(linear, &lattice.column(source.linear_index()));
        } else {
            let alpha = insertion.scalings[i - insertion.first];
            source.set_indices(&tuple);
            let current = source.linear_index();
            tuple[direction] = i - 1;
            source.set_indices(&tuple);
            let previous = source.linear_index();
            widened.set_column(
                linear,
                &(alpha * lattice.column(current) + (1.0 - alpha) * lattice.column(previous)),
            );
        }
    }
    (widened, widened_counts)
}

#[cfg(test)]
mod tests {
    use nalgebra::{dmatrix, dvector};

    use super::*;

    fn quadratic_bezier_knots() -> KnotVector {
        KnotVector::new(dvector![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn blends_the_affected_points_of_a_line() {
        let knots = quadratic_bezier_knots();
        let insertion = prepare(&knots, 2, 0.5).unwrap();
        assert_eq!(insertion.first, 1);
        assert_eq!(insertion.last, 2);
        assert_eq!(insertion.scalings, vec![0.5, 0.5]);

        let lattice = dmatrix![-1.0, 0.0, 1.0;];
        let (widened, counts) = widen_lattice(&lattice, &[3], 0, &insertion);
        assert_eq!(counts, vec![4]);
        assert_eq!(widened, dmatrix![-1.0, -0.5, 0.5, 1.0;]);
    }

    #[test]
    fn repeated_insertion_converges_to_the_curve_point() {
        let mut knots = quadratic_bezier_knots();
        let mut lattice = dmatrix![-1.0, 0.0, 1.0;];
        let mut counts = vec![3];
        for _ in 0..2 {
            let insertion = prepare(&knots, 2, 0.5).unwrap();
            let widened = widen_lattice(&lattice, &counts, 0, &insertion);
            lattice = widened.0;
            counts = widened.1;
            knots.insert(0.5).unwrap();
        }
        assert_eq!(lattice, dmatrix![-1.0, -0.5, 0.0, 0.5, 1.0;]);
        assert_eq!(counts, vec![5]);
    }

    #[test]
    fn insertion_at_a_preexisting_knot_shifts_one_position() {
        let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0]).unwrap();
        let insertion = prepare(&knots, 2, 0.5).unwrap();
        assert_eq!((insertion.first, insertion.last), (2, 2));

        let lattice = dmatrix![-1.5, -0.5, 0.5, 1.5;];
        let (widened, _) = widen_lattice(&lattice, &[4], 0, &insertion);
        assert_eq!(widened, dmatrix![-1.5, -0.5, 0.0, 0.5, 1.5;]);
    }

    #[test]
    fn widens_one_direction_of_a_surface_lattice() {
        let knots = quadratic_bezier_knots();
        let insertion = prepare(&knots, 2, 0.5).unwrap();
        // Two rows of a planar lattice, y simply tags the second direction.
        let lattice = dmatrix![
            -1.0, 0.0, 1.0, -1.0, 0.0, 1.0;
            0.0, 0.0, 0.0, 1.0, 1.0, 1.0;
        ];
        let (widened, counts) = widen_lattice(&lattice, &[3, 2], 0, &insertion);
        assert_eq!(counts, vec![4, 2]);
        assert_eq!(
            widened,
            dmatrix![
                -1.0, -0.5, 0.5, 1.0, -1.0, -0.5, 0.5, 1.0;
                0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0;
            ]
        );
    }

    #[test]
    fn rejects_coordinates_outside_the_natural_domain() {
        let knots = quadratic_bezier_knots();
        assert_eq!(
            prepare(&knots, 2, 1.0),
            Err(InsertError::OutOfBounds { u: 1.0, lower_bound: 0.0, upper_bound: 1.0 })
        );
        assert_eq!(
            prepare(&knots, 2, -0.5),
            Err(InsertError::OutOfBounds { u: -0.5, lower_bound: 0.0, upper_bound: 1.0 })
        );
    }

    #[test]
    fn rejects_insertion_beyond_the_degree_multiplicity() {
        let knots = KnotVector::new(dvector![0.0, 0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(
            prepare(&knots, 2, 0.5),
            Err(InsertError::MultiplicityExceeded { u: 0.5, multiplicity: 2, degree: 2 })
        );
    }
}
