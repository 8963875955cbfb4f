//! B-spline basis functions over a knot vector.
//!
//! The basis functions `N_{s,q}` of degree `q` over a knot vector `U` are defined by
//! the Cox-de-Boor recursion, see eq. (2.5) in \[Piegl1997\]:
//!
//! ```text
//! N_{s,0}(u) = 1 if u_s <= u < u_{s+1}, 0 otherwise
//!
//!              u - u_s                     u_{s+q+1} - u
//! N_{s,q}(u) = --------------- N_{s,q-1} + ------------------- N_{s+1,q-1}
//!              u_{s+q} - u_s               u_{s+q+1} - u_{s+1}
//! ```
//!
//! where any quotient over a zero-length knot difference is taken to be zero. The
//! `order`-th derivative follows the same recursion with the quotients replaced by the
//! inverse knot differences scaled by the degree, see eq. (2.9) in \[Piegl1997\].
//!
//! [`BasisFunctions`] stores the whole triangular family `N_{s,r}` for `r <= q` in one
//! flat arena, grouped by degree. The children of `N_{s,r}` are `N_{s,r-1}` and
//! `N_{s+1,r-1}`, so child positions follow from `(r, s)` arithmetically and the
//! inverse knot differences can be precomputed once per node.
//!
//! Evaluation is right-closed at the upper domain boundary: a basis function whose
//! support ends at the last knot keeps its limit value there instead of dropping to
//! zero.

use crate::knots::KnotVector;
use crate::numeric;

/// The triangular family of basis functions up to a fixed degree, flattened by degree.
#[derive(Debug, Clone)]
pub struct BasisFunctions {
    knots: KnotVector,
    degree: usize,
    nodes: Vec<Node>,
    offsets: Vec<usize>,
}

/// Precomputed constants of a single basis function `N_{s,q}`.
#[derive(Debug, Clone)]
enum Node {
    /// Piecewise constant base case. Evaluates to zero everywhere if the span
    /// `[u_s, u_{s+1})` is degenerate.
    ZeroDegree { value_on_support: f64 },
    /// Recursion step holding the inverse knot differences of both quotients, with
    /// zero standing in for an inverse over a degenerate difference.
    Recursive { left_denominator_inverse: f64, right_denominator_inverse: f64 },
}

impl BasisFunctions {
    /// Precomputes all basis functions of degree `0..=degree` over `knots`.
    ///
    /// # Panics
    /// Panics if the knot vector holds fewer than `degree + 2` knots.
    pub fn new(knots: KnotVector, degree: usize) -> Self {
        let number_of_knots = knots.len();
        assert!(
            number_of_knots > degree + 1,
            "a degree {degree} basis needs more than {} knots",
            degree + 1
        );
        let mut nodes = Vec::new();
        let mut offsets = Vec::with_capacity(degree + 1);
        for q in 0..=degree {
            offsets.push(nodes.len());
            for s in 0..number_of_knots - q - 1 {
                nodes.push(if q == 0 {
                    let degenerate = numeric::are_equal(knots.knot(s), knots.knot(s + 1));
                    Node::ZeroDegree { value_on_support: if degenerate { 0.0 } else { 1.0 } }
                } else {
                    Node::Recursive {
                        left_denominator_inverse: inverse_or_zero(knots.knot(s + q) - knots.knot(s)),
                        right_denominator_inverse: inverse_or_zero(
                            knots.knot(s + q + 1) - knots.knot(s + 1),
                        ),
                    }
                });
            }
        }
        Self { knots, degree, nodes, offsets }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knot_vector(&self) -> &KnotVector {
        &self.knots
    }

    /// Number of basis functions of the full degree.
    pub fn number_of_basis_functions(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    /// Value of `N_{start,degree}` at `u`, zero outside the support.
    ///
    /// # Panics
    /// Panics if `degree` exceeds the degree of the family or `start` indexes past its
    /// basis functions.
    pub fn evaluate(&self, degree: usize, start: usize, u: f64) -> f64 {
        if !self.is_in_support(degree, start, u) {
            return 0.0;
        }
        match *self.node(degree, start) {
            Node::ZeroDegree { value_on_support } => value_on_support,
            Node::Recursive { left_denominator_inverse, right_denominator_inverse } => {
                let left_quotient = (u - self.knots.knot(start)) * left_denominator_inverse;
                let right_quotient =
                    (self.knots.knot(start + degree + 1) - u) * right_denominator_inverse;
                left_quotient * self.evaluate(degree - 1, start, u)
                    + right_quotient * self.evaluate(degree - 1, start + 1, u)
            }
        }
    }

    /// Value of the `order`-th derivative of `N_{start,degree}` at `u`, zero outside
    /// the support. Order zero falls back to [`Self::evaluate`].
    ///
    /// # Panics
    /// Panics if `degree` exceeds the degree of the family or `start` indexes past its
    /// basis functions.
    pub fn evaluate_derivative(&self, degree: usize, start: usize, u: f64, order: usize) -> f64 {
        if order == 0 {
            return self.evaluate(degree, start, u);
        }
        if !self.is_in_support(degree, start, u) {
            return 0.0;
        }
        match *self.node(degree, start) {
            Node::ZeroDegree { .. } => 0.0,
            Node::Recursive { left_denominator_inverse, right_denominator_inverse } => {
                degree as f64
                    * (left_denominator_inverse
                        * self.evaluate_derivative(degree - 1, start, u, order - 1)
                        - right_denominator_inverse
                            * self.evaluate_derivative(degree - 1, start + 1, u, order - 1))
            }
        }
    }

    /// Whether `u` belongs to the support `[u_start, u_{start+degree+1})` of
    /// `N_{start,degree}`, closed at the last knot.
    fn is_in_support(&self, degree: usize, start: usize, u: f64) -> bool {
        if !self.knots.is_in_range(u) {
            return false;
        }
        let span = self.knots.knot_span(u);
        (start <= span && span <= start + degree)
            || (self.knots.is_last_knot(u)
                && numeric::are_equal(self.knots.last_knot(), self.knots.knot(start + degree + 1)))
    }

    fn node(&self, degree: usize, start: usize) -> &Node {
        &self.nodes[self.offsets[degree] + start]
    }
}

fn inverse_or_zero(denominator: f64) -> f64 {
    if denominator.abs() < numeric::EPSILON {
        0.0
    } else {
        1.0 / denominator
    }
}
