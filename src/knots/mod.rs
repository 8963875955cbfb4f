//! Knot vectors partitioning one parametric direction.
//!
//! A knot vector `U = (u_0, ..., u_{m-1})` is a non-decreasing sequence of parametric
//! coordinates. Consecutive distinct knots bound the knot spans; repeated knots
//! (multiplicities) shrink spans to zero length and reduce the continuity of the basis
//! functions built over the vector. A vector is *clamped* when both end knots appear
//! `degree + 1` times, which makes the spline interpolate its first and last control
//! points.
//!
//! Span location follows the half-open convention `u ∈ [u_s, u_{s+1})` with one
//! exception: the last knot belongs to the last non-degenerate span, so evaluation at
//! the upper domain boundary remains well-defined.
//!
//! Knot vector [generation methods][methods] are available for the common clamped
//! uniform layout.

use thiserror::Error;

use crate::{numeric, types::VecD};

pub mod methods;

/// A non-decreasing sequence of parametric coordinates for one direction.
#[derive(Debug, Clone)]
pub struct KnotVector {
    knots: VecD,
}

#[derive(Error, Debug, PartialEq)]
pub enum KnotError {
    #[error("Parameter `u = {u}` lies outside the interval `[{lower_bound}, {upper_bound}]`.")]
    ParameterOutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },
    #[error("Knots must be non-decreasing, but the knot at position {position} drops from `{previous}` to `{current}`.")]
    Unsorted { position: usize, previous: f64, current: f64 },
    #[error("A knot vector of degree {degree} needs at least `2 * (degree + 1) = {needed}` knots, but {number_of_knots} were given.")]
    TooFewKnots { degree: usize, needed: usize, number_of_knots: usize },
}

impl KnotVector {
    /// Validates that `knots` is non-decreasing and contains at least two entries.
    pub fn new(knots: VecD) -> Result<Self, KnotError> {
        if knots.len() < 2 {
            return Err(KnotError::TooFewKnots { degree: 0, needed: 2, number_of_knots: knots.len() });
        }
        for i in 1..knots.len() {
            if knots[i] < knots[i - 1] {
                return Err(KnotError::Unsorted { position: i, previous: knots[i - 1], current: knots[i] });
            }
        }
        Ok(Self { knots })
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Knot at position `i`.
    ///
    /// # Panics
    /// Panics if `i` is not smaller than [`Self::len`].
    pub fn knot(&self, i: usize) -> f64 {
        self.knots[i]
    }

    pub fn first_knot(&self) -> f64 {
        self.knots[0]
    }

    pub fn last_knot(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.knots.iter().copied()
    }

    /// Whether `u` lies inside `[first_knot, last_knot]`.
    pub fn is_in_range(&self, u: f64) -> bool {
        self.first_knot() <= u && u <= self.last_knot()
    }

    /// Whether `u` equals the last knot within [`numeric::EPSILON`].
    pub fn is_last_knot(&self, u: f64) -> bool {
        numeric::are_equal(u, self.last_knot())
    }

    /// Index `s` of the span containing `u`, i.e. `u ∈ [u_s, u_{s+1})`.
    ///
    /// The last knot is assigned to the last non-degenerate span, so that a right-closed
    /// evaluation at the upper domain boundary has a well-defined span.
    pub fn knot_span(&self, u: f64) -> usize {
        let knots = self.knots.as_slice();
        if self.is_last_knot(u) {
            knots.partition_point(|&knot| knot < u).saturating_sub(1)
        } else {
            knots.partition_point(|&knot| knot <= u).saturating_sub(1)
        }
    }

    /// Number of knots equal to `u` within [`numeric::EPSILON`].
    pub fn multiplicity(&self, u: f64) -> usize {
        self.knots.iter().filter(|&&knot| numeric::are_equal(knot, u)).count()
    }

    /// The distinct knot values in ascending order.
    pub fn distinct_knots(&self) -> Vec<f64> {
        let mut distinct: Vec<f64> = Vec::new();
        for &knot in &self.knots {
            match distinct.last() {
                Some(&last) if numeric::are_equal(last, knot) => {}
                _ => distinct.push(knot),
            }
        }
        distinct
    }

    /// The non-degenerate knot spans as `(lower, upper)` pairs of distinct knots.
    pub fn spans(&self) -> Vec<(f64, f64)> {
        self.distinct_knots().windows(2).map(|pair| (pair[0], pair[1])).collect()
    }

    /// Inserts `u` behind its span, keeping the sequence sorted.
    pub fn insert(&mut self, u: f64) -> Result<(), KnotError> {
        if !self.is_in_range(u) {
            return Err(KnotError::ParameterOutOfBounds {
                u,
                lower_bound: self.first_knot(),
                upper_bound: self.last_knot(),
            });
        }
        let position = self.knot_span(u) + 1;
        self.knots = self.knots.clone().insert_row(position, u);
        Ok(())
    }

    /// Removes the last copy of `u`. Returns `false` if `u` is not a knot.
    pub fn remove(&mut self, u: f64) -> bool {
        let upper = self.knots.as_slice().partition_point(|&knot| knot <= u);
        if upper == 0 || !numeric::are_equal(self.knots[upper - 1], u) {
            return false;
        }
        self.knots = self.knots.clone().remove_row(upper - 1);
        true
    }

    /// Element-wise comparison within `tolerance`.
    pub fn are_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| numeric::are_equal_with_tolerance(a, b, tolerance))
    }
}

// Knot vectors compare within the shared tolerance, like all other scalar comparisons
// of the crate.
impl PartialEq for KnotVector {
    fn eq(&self, other: &Self) -> bool {
        self.are_equal(other, numeric::EPSILON)
    }
}

impl std::ops::Index<usize> for KnotVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.knots[i]
    }
}
