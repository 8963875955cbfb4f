//! Generation methods for commonly used knot vector layouts.

use crate::types::{VecD, VecHelpers};

use super::{KnotError, KnotVector};

/// Clamped knot vector with equally spaced interior knots, see eq. (9.9) in \[Piegl1997\].
///
/// Both boundary knots are repeated `degree + 1` times, so a spline over the vector
/// interpolates its first and last control point. For `number_of_points` control points
/// the vector holds `number_of_points + degree + 1` knots; with `number_of_points ==
/// degree + 1` the result is the Bézier layout without interior knots.
pub fn clamped_uniform(
    degree: usize,
    number_of_points: usize,
    lower_bound: f64,
    upper_bound: f64,
) -> Result<KnotVector, KnotError> {
    let number_of_knots = number_of_points + degree + 1;
    if number_of_points < degree + 1 {
        return Err(KnotError::TooFewKnots {
            degree,
            needed: 2 * (degree + 1),
            number_of_knots,
        });
    }
    let mut knots = VecD::zeros(number_of_knots);
    knots.head_mut(degree + 1).fill(lower_bound);
    knots.tail_mut(degree + 1).fill(upper_bound);
    let number_of_interior_knots = number_of_points - degree - 1;
    let step = (upper_bound - lower_bound) / (number_of_interior_knots + 1) as f64;
    for i in 1..=number_of_interior_knots {
        knots[degree + i] = lower_bound + i as f64 * step;
    }
    KnotVector::new(knots)
}
