//! Shared floating-point tolerance for "equal" and "equal to zero" decisions.
//!
//! Knot comparisons, degenerate-span detection and the zero-denominator guards of the
//! basis-function recursion all go through the same tolerance so that a knot vector is
//! partitioned consistently across construction, evaluation and manipulation.

/// Comparison tolerance, ten times the machine epsilon of `f64`.
pub const EPSILON: f64 = 10.0 * f64::EPSILON;

/// Returns whether `a` and `b` coincide within [`EPSILON`].
pub fn are_equal(a: f64, b: f64) -> bool {
    are_equal_with_tolerance(a, b, EPSILON)
}

/// Returns whether `a` and `b` coincide within `tolerance` (strict comparison).
pub fn are_equal_with_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_within_epsilon() {
        assert!(are_equal(1.0, 1.0));
        assert!(are_equal(0.0, f64::EPSILON));
        assert!(!are_equal(1.0, 1.0 + 1e-14));
    }

    #[test]
    fn equal_within_custom_tolerance() {
        assert!(are_equal_with_tolerance(1.0, 1.1, 0.2));
        assert!(!are_equal_with_tolerance(1.0, 1.1, 0.1));
        assert!(!are_equal_with_tolerance(1.0, 1.1, 0.05));
    }
}
