//! Degree elevation and reduction of one parametric direction.
//!
//! Both operations run over the Bézier decomposition of the spline, see chapter 5.5
//! in \[Piegl1997\]: [insertion][super::insert] first raises every interior knot to
//! multiplicity `p`, which splits the lattice lines along the direction into Bézier
//! segments of `p + 1` points with shared boundary points. Elevation rewrites each
//! segment exactly as a segment of degree `p + 1`,
//!
//! ```text
//! Q_i = α_i · P_{i-1} + (1 - α_i) · P_i,    α_i = i / (p + 1)
//! ```
//!
//! while reduction runs this blending backwards from both segment ends and meets in
//! the middle, which is only approximate: the midpoint defect bounds how far the
//! reduced segment strays, and the reduction is committed only when the summed
//! defects of all segments stay within the caller's tolerance. Afterwards the
//! decomposition knots are [removed][super::remove] again, restoring the original
//! continuity at the new degree. Every interior knot must lie strictly inside the
//! natural domain `(u_p, u_{m-1-p})`, so the direction has to be clamped. Rational
//! splines run the whole pipeline on their homogeneous lattice.

use thiserror::Error;

use crate::index::MultiIndexHandler;
use crate::knots::{KnotError, KnotVector};
use crate::types::{MatD, VecD};

use super::insert::{self, InsertError};
use super::remove::{self, RemoveError};

#[derive(Error, Debug, PartialEq)]
pub enum DegreeError {
    #[error("Degree elevation needs a polynomial direction, but the degree is 0.")]
    NotElevatable,

    #[error("Degree reduction needs a degree of at least 2, but the degree is {degree}.")]
    NotReducible { degree: usize },

    #[error(
        "The interior knot `u = {u}` has multiplicity {multiplicity} beyond the degree \
    {degree}, so the spline is disconnected there."
    )]
    Disconnected { u: f64, multiplicity: usize, degree: usize },

    #[error(transparent)]
    Knots(#[from] KnotError),

    #[error(transparent)]
    Insertion(#[from] InsertError),

    #[error(transparent)]
    Removal(#[from] RemoveError),
}

/// New knot vector, degree and lattice of one direction after a degree change.
#[derive(Debug)]
pub(crate) struct DegreeChange {
    pub knots: KnotVector,
    pub degree: usize,
    pub lattice: MatD,
    pub points_per_direction: Vec<usize>,
}

/// Raises the degree of `direction` by one without changing the described geometry.
///
/// Every distinct knot of the direction gains one copy and the lattice grows by one
/// point per non-degenerate span. Elevation is exact, so removing the decomposition
/// knots afterwards only has to absorb rounding; a copy whose removal still fails
/// stays in the knot vector without moving the geometry.
pub(crate) fn elevate(
    knots: &KnotVector,
    degree: usize,
    lattice: &MatD,
    points_per_direction: &[usize],
    direction: usize,
) -> Result<DegreeChange, DegreeError> {
    if degree == 0 {
        return Err(DegreeError::NotElevatable);
    }
    check_connected(knots, degree)?;
    let mut state = DirectionState {
        knots: knots.clone(),
        lattice: lattice.clone(),
        points_per_direction: points_per_direction.to_vec(),
    };
    let interior = state.decompose(degree, direction)?;

    let segments = state.segments();
    let (elevated, counts) =
        elevate_lattice(&state.lattice, &state.points_per_direction, direction, degree, segments);
    state.lattice = elevated;
    state.points_per_direction = counts;
    for u in state.knots.distinct_knots() {
        state.knots.insert(u)?;
    }
    let degree = degree + 1;

    let tolerance = 1.0e-10 * (1.0 + state.lattice.amax());
    state.compose(degree, direction, &interior, tolerance)?;
    Ok(DegreeChange {
        knots: state.knots,
        degree,
        lattice: state.lattice,
        points_per_direction: state.points_per_direction,
    })
}

/// Lowers the degree of `direction` by one if the described geometry stays within
/// `tolerance` of the original.
///
/// Returns `None` when the summed error bounds of the segment reductions exceed
/// `tolerance`. The decomposition knots are removed with the same tolerance; a copy
/// whose removal fails stays in the knot vector.
pub(crate) fn reduce(
    knots: &KnotVector,
    degree: usize,
    lattice: &MatD,
    points_per_direction: &[usize],
    direction: usize,
    tolerance: f64,
) -> Result<Option<DegreeChange>, DegreeError> {
    if degree < 2 {
        return Err(DegreeError::NotReducible { degree });
    }
    check_connected(knots, degree)?;
    let mut state = DirectionState {
        knots: knots.clone(),
        lattice: lattice.clone(),
        points_per_direction: points_per_direction.to_vec(),
    };
    let interior = state.decompose(degree, direction)?;

    let segments = state.segments();
    let reduced = reduce_lattice(
        &state.lattice,
        &state.points_per_direction,
        direction,
        degree,
        segments,
        tolerance,
    );
    let (lattice, counts) = match reduced {
        Some(reduced) => reduced,
        None => return Ok(None),
    };
    state.lattice = lattice;
    state.points_per_direction = counts;
    for u in state.knots.distinct_knots() {
        let removed = state.knots.remove(u);
        debug_assert!(removed);
    }
    let degree = degree - 1;

    state.compose(degree, direction, &interior, tolerance)?;
    Ok(Some(DegreeChange {
        knots: state.knots,
        degree,
        lattice: state.lattice,
        points_per_direction: state.points_per_direction,
    }))
}

/// One interior knot and the number of copies Bézier decomposition added for it.
#[derive(Debug, Clone, PartialEq)]
struct DecompositionKnot {
    u: f64,
    inserted: usize,
}

/// Working copy of one direction while its degree changes.
#[derive(Debug)]
struct DirectionState {
    knots: KnotVector,
    lattice: MatD,
    points_per_direction: Vec<usize>,
}

impl DirectionState {
    /// Number of non-degenerate knot spans, the Bézier segments of the direction.
    fn segments(&self) -> usize {
        self.knots.distinct_knots().len() - 1
    }

    /// Raises every interior knot to multiplicity `degree`, splitting the lattice
    /// lines along `direction` into Bézier segments.
    fn decompose(
        &mut self,
        degree: usize,
        direction: usize,
    ) -> Result<Vec<DecompositionKnot>, DegreeError> {
        let distinct = self.knots.distinct_knots();
        let mut interior = Vec::with_capacity(distinct.len() - 2);
        for &u in &distinct[1..distinct.len() - 1] {
            let inserted = degree - self.knots.multiplicity(u);
            for _ in 0..inserted {
                let insertion = insert::prepare(&self.knots, degree, u)?;
                let (lattice, points_per_direction) = insert::widen_lattice(
                    &self.lattice,
                    &self.points_per_direction,
                    direction,
                    &insertion,
                );
                self.lattice = lattice;
                self.points_per_direction = points_per_direction;
                self.knots.insert(u)?;
            }
            interior.push(DecompositionKnot { u, inserted });
        }
        Ok(interior)
    }

    /// Removes the `inserted` copies of every decomposition knot again at the new
    /// `degree`. A copy whose removal would move the geometry beyond `tolerance`
    /// stays in place; the spline remains consistent either way.
    fn compose(
        &mut self,
        degree: usize,
        direction: usize,
        interior: &[DecompositionKnot],
        tolerance: f64,
    ) -> Result<(), DegreeError> {
        for knot in interior {
            for _ in 0..knot.inserted {
                let removal = match remove::prepare(&self.knots, degree, knot.u)? {
                    Some(removal) => removal,
                    None => break,
                };
                let narrowed = remove::narrow_lattice(
                    &self.lattice,
                    &self.points_per_direction,
                    direction,
                    &removal,
                    tolerance,
                );
                let (lattice, points_per_direction) = match narrowed {
                    Some(narrowed) => narrowed,
                    None => break,
                };
                self.lattice = lattice;
                self.points_per_direction = points_per_direction;
                let removed = self.knots.remove(knot.u);
                debug_assert!(removed);
            }
        }
        Ok(())
    }
}

/// A degree change blends whole lattice lines, so every interior knot must keep the
/// spline connected along the direction.
fn check_connected(knots: &KnotVector, degree: usize) -> Result<(), DegreeError> {
    let distinct = knots.distinct_knots();
    for &u in &distinct[1..distinct.len() - 1] {
        let multiplicity = knots.multiplicity(u);
        if multiplicity > degree {
            return Err(DegreeError::Disconnected { u, multiplicity, degree });
        }
    }
    Ok(())
}

/// Elevates every Bézier segment of the decomposed lattice by one degree.
///
/// Along `direction` segment `s` grows from the points `s·p ..= s·p + p` to the
/// points `s·(p+1) ..= s·(p+1) + p + 1` of the widened lattice, boundary points
/// shared with the neighboring segments.
fn elevate_lattice(
    lattice: &MatD,
    points_per_direction: &[usize],
    direction: usize,
    degree: usize,
    segments: usize,
) -> (MatD, Vec<usize>) {
    let width = degree + 1;
    let mut elevated_counts = points_per_direction.to_vec();
    elevated_counts[direction] = segments * width + 1;
    let total: usize = elevated_counts.iter().product();
    let mut elevated = MatD::zeros(lattice.nrows(), total);
    let mut target = MultiIndexHandler::new(&elevated_counts);
    let mut source = MultiIndexHandler::new(points_per_direction);
    for linear in 0..total {
        target.set_linear_index(linear);
        let mut tuple = target.indices().to_vec();
        let segment = tuple[direction].saturating_sub(1) / width;
        let local = tuple[direction] - segment * width;
        let first = segment * degree;
        if local == 0 || local == width {
            tuple[direction] = first + local.min(degree);
            source.set_indices(&tuple);
            elevated.set_column(linear, &lattice.column(source.linear_index()));
        } else {
            let alpha = local as f64 / width as f64;
            tuple[direction] = first + local - 1;
            source.set_indices(&tuple);
            let previous = source.linear_index();
            tuple[direction] = first + local;
            source.set_indices(&tuple);
            let current = source.linear_index();
            elevated.set_column(
                linear,
                &(alpha * lattice.column(previous) + (1.0 - alpha) * lattice.column(current)),
            );
        }
    }
    (elevated, elevated_counts)
}

/// Reduces every Bézier segment of the decomposed lattice by one degree, or `None`
/// when the summed error bounds of all segments exceed `tolerance`.
fn reduce_lattice(
    lattice: &MatD,
    points_per_direction: &[usize],
    direction: usize,
    degree: usize,
    segments: usize,
    tolerance: f64,
) -> Option<(MatD, Vec<usize>)> {
    let line_length = points_per_direction[direction];
    debug_assert_eq!(line_length, segments * degree + 1);
    let mut cross_lengths = points_per_direction.to_vec();
    cross_lengths[direction] = 1;

    let mut source = MultiIndexHandler::new(points_per_direction);
    let mut cross = MultiIndexHandler::new(&cross_lengths);
    let mut lines: Vec<Vec<VecD>> = Vec::with_capacity(cross.linear_length());
    let mut segment_errors = vec![0.0_f64; segments];
    for _ in 0..cross.linear_length() {
        let mut tuple = cross.indices().to_vec();
        let mut line = Vec::with_capacity(line_length);
        for i in 0..line_length {
            tuple[direction] = i;
            source.set_indices(&tuple);
            line.push(lattice.column(source.linear_index()).into_owned());
        }
        let mut reduced_line = Vec::with_capacity(segments * (degree - 1) + 1);
        for (segment, error_bound) in segment_errors.iter_mut().enumerate() {
            let (points, error) =
                reduce_segment(&line[segment * degree..=(segment + 1) * degree], degree);
            *error_bound = error_bound.max(error);
            // Adjacent segments share their boundary point.
            reduced_line.extend(points.into_iter().skip(usize::from(segment > 0)));
        }
        lines.push(reduced_line);
        cross.advance();
    }
    if segment_errors.iter().sum::<f64>() > tolerance {
        return None;
    }

    let mut reduced_counts = points_per_direction.to_vec();
    reduced_counts[direction] = segments * (degree - 1) + 1;
    let total: usize = reduced_counts.iter().product();
    let mut reduced = MatD::zeros(lattice.nrows(), total);
    let mut target = MultiIndexHandler::new(&reduced_counts);
    cross.set_linear_index(0);
    for line in &lines {
        let mut tuple = cross.indices().to_vec();
        for (i, point) in line.iter().enumerate() {
            tuple[direction] = i;
            target.set_indices(&tuple);
            reduced.set_column(target.linear_index(), point);
        }
        cross.advance();
    }
    Some((reduced, reduced_counts))
}

/// One Bézier segment line reduced from `degree` to `degree - 1`, together with the
/// midpoint defect bounding the error, see eqs. (5.40)-(5.42) in \[Piegl1997\].
///
/// The end points carry over unchanged; the interior points invert the elevation
/// blending from both ends. For even degree the two sweeps meet between two points
/// and the defect is measured against the skipped original, for odd degree they
/// both reach the middle point, which is averaged.
fn reduce_segment(q: &[VecD], degree: usize) -> (Vec<VecD>, f64) {
    let p = degree;
    let alpha = |i: usize| i as f64 / p as f64;
    let mut points = vec![VecD::zeros(q[0].len()); p];
    points[0] = q[0].clone();
    points[p - 1] = q[p].clone();
    let r = (p - 1) / 2;
    if p % 2 == 0 {
        for i in 1..=r {
            points[i] = (&q[i] - alpha(i) * &points[i - 1]) / (1.0 - alpha(i));
        }
        for i in (r + 1..=p - 2).rev() {
            points[i] = (&q[i + 1] - (1.0 - alpha(i + 1)) * &points[i + 1]) / alpha(i + 1);
        }
        let error = (&q[r + 1] - 0.5 * (&points[r] + &points[r + 1])).norm();
        (points, error)
    } else {
        for i in 1..r {
            points[i] = (&q[i] - alpha(i) * &points[i - 1]) / (1.0 - alpha(i));
        }
        for i in (r + 1..=p - 2).rev() {
            points[i] = (&q[i + 1] - (1.0 - alpha(i + 1)) * &points[i + 1]) / alpha(i + 1);
        }
        let left = (&q[r] - alpha(r) * &points[r - 1]) / (1.0 - alpha(r));
        let right = (&q[r + 1] - (1.0 - alpha(r + 1)) * &points[r + 1]) / alpha(r + 1);
        let error = (&left - &right).norm();
        points[r] = 0.5 * (left + right);
        (points, error)
    }
}
