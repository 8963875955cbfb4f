//! Removes a knot from one parametric direction, if the geometry allows it.
//!
//! Knot removal inverts [insertion][super::insert], see algorithm A5.8 in
//! \[Piegl1997\]: the affected points of every lattice line along the direction are
//! reconstructed by running the insertion blending backwards from both ends,
//!
//! ```text
//! T_i = (P_i - (1 - α_i) · T_{i-1}) / α_i,    α_i = (u - u_i) / (u_{i+p+1} - u_i)
//! T_j = (P_j - α_j · T_{j+1}) / (1 - α_j)
//! ```
//!
//! and the two reconstructions must meet in the middle. Unlike insertion this can
//! fail: a knot only disappears without changing the spline when the control points
//! actually carry the reduced continuity. The removal is therefore gated by a
//! tolerance on the reconstruction defect and committed only when every line of the
//! lattice passes. Rational splines measure the defect in homogeneous coordinates.

use thiserror::Error;

use crate::index::MultiIndexHandler;
use crate::knots::KnotVector;
use crate::numeric;
use crate::types::{MatD, VecD};

#[derive(Error, Debug, PartialEq)]
pub enum RemoveError {
    #[error("Parameter `u = {u}` lies outside the removable interval `({lower_bound}, {upper_bound})`.")]
    OutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },
}

/// The lattice positions touched by one removal and their blending factors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SingleRemoval {
    /// First reconstructed point position along the direction.
    pub first: usize,
    /// Last reconstructed point position along the direction.
    pub last: usize,
    /// The position dropped from each line once the reconstructions meet.
    pub removed_point: usize,
    /// The factors `α_i` for `i` in `first..=last`.
    pub scalings: Vec<f64>,
}

/// Validates `u` against the natural domain and locates the affected lattice range.
///
/// Returns `Ok(None)` when `u` is not a knot of the vector or its multiplicity rules
/// a removal out structurally.
pub(crate) fn prepare(
    knots: &KnotVector,
    degree: usize,
    u: f64,
) -> Result<Option<SingleRemoval>, RemoveError> {
    let lower_bound = knots.knot(degree);
    let upper_bound = knots.knot(knots.len() - 1 - degree);
    if u <= lower_bound || u >= upper_bound {
        return Err(RemoveError::OutOfBounds { u, lower_bound, upper_bound });
    }
    let multiplicity = knots.multiplicity(u);
    if multiplicity == 0 || multiplicity > degree + 1 {
        return Ok(None);
    }
    // Span of the last copy of `u`, robust against copies stored within tolerance.
    let span = match (0..knots.len()).rev().find(|&i| numeric::are_equal(knots.knot(i), u)) {
        Some(span) => span,
        None => return Ok(None),
    };
    let number_of_points = knots.len() - degree - 1;
    let first = span - degree;
    let last = span - multiplicity;
    if last + 2 > number_of_points {
        return Ok(None);
    }
    let scalings = (first..=last)
        .map(|i| (u - knots.knot(i)) / (knots.knot(i + degree + 1) - knots.knot(i)))
        .collect();
    Ok(Some(SingleRemoval { first, last, removed_point: (first + last) / 2, scalings }))
}

/// Shrinks the lattice by one point along `direction` if every line can be
/// reconstructed within `tolerance`.
///
/// Returns the narrowed lattice with the updated per-direction counts, or `None`
/// when some line fails the tolerance and the removal must not happen.
pub(crate) fn narrow_lattice(
    lattice: &MatD,
    points_per_direction: &[usize],
    direction: usize,
    removal: &SingleRemoval,
    tolerance: f64,
) -> Option<(MatD, Vec<usize>)> {
    let line_length = points_per_direction[direction];
    let mut cross_lengths = points_per_direction.to_vec();
    cross_lengths[direction] = 1;

    let mut source = MultiIndexHandler::new(points_per_direction);
    let mut cross = MultiIndexHandler::new(&cross_lengths);
    let mut lines: Vec<Vec<VecD>> = Vec::with_capacity(cross.linear_length());
    for _ in 0..cross.linear_length() {
        let mut tuple = cross.indices().to_vec();
        let mut line = Vec::with_capacity(line_length);
        for i in 0..line_length {
            tuple[direction] = i;
            source.set_indices(&tuple);
            line.push(lattice.column(source.linear_index()).into_owned());
        }
        lines.push(remove_from_line(&line, removal, tolerance)?);
        cross.advance();
    }

    let mut narrowed_counts = points_per_direction.to_vec();
    narrowed_counts[direction] -= 1;
    let total: usize = narrowed_counts.iter().product();
    let mut narrowed = MatD::zeros(lattice.nrows(), total);
    let mut target = MultiIndexHandler::new(&narrowed_counts);
    cross.set_linear_index(0);
    for line in &lines {
        let mut tuple = cross.indices().to_vec();
        for (i, point) in line.iter().enumerate() {
            tuple[direction] = i;
            target.set_indices(&tuple);
            narrowed.set_column(target.linear_index(), point);
        }
        cross.advance();
    }
    Some((narrowed, narrowed_counts))
}

/// Reconstructs one lattice line without the knot, or `None` beyond `tolerance`.
fn remove_from_line(line: &[VecD], removal: &SingleRemoval, tolerance: f64) -> Option<Vec<VecD>> {
    let first = removal.first;
    let last = removal.last;
    let offset = first - 1;
    let scaling = |i: usize| removal.scalings[i - first];

    let mut temp: Vec<VecD> = vec![VecD::zeros(line[0].len()); last + 3 - first];
    temp[0] = line[offset].clone();
    temp[last + 1 - offset] = line[last + 1].clone();

    let (mut i, mut ii) = (first, 1);
    let (mut j, mut jj) = (last, last - offset);
    while j > i {
        let alpha_i = scaling(i);
        let alpha_j = scaling(j);
        if alpha_i <= 0.0 || alpha_i >= 1.0 || alpha_j <= 0.0 || alpha_j >= 1.0 {
            return None;
        }
        temp[ii] = (&line[i] - (1.0 - alpha_i) * &temp[ii - 1]) / alpha_i;
        temp[jj] = (&line[j] - alpha_j * &temp[jj + 1]) / (1.0 - alpha_j);
        i += 1;
        ii += 1;
        j -= 1;
        jj -= 1;
    }

    let defect = if j < i {
        (&temp[ii - 1] - &temp[jj + 1]).norm()
    } else {
        let alpha_i = scaling(i);
        if alpha_i <= 0.0 || alpha_i >= 1.0 {
            return None;
        }
        (&line[i] - (alpha_i * &temp[ii + 1] + (1.0 - alpha_i) * &temp[ii - 1])).norm()
    };
    if defect > tolerance {
        return None;
    }

    let mut points = line.to_vec();
    let (mut i, mut j) = (first, last);
    while j > i {
        points[i] = temp[i - offset].clone();
        points[j] = temp[j - offset].clone();
        i += 1;
        j -= 1;
    }
    points.remove(removal.removed_point);
    Some(points)
}
