//! Knot and degree manipulation of existing splines.
//!
//! [Insertion][insert] enriches the knot vector of one parametric direction while the
//! described geometry stays untouched; [removal][remove] is its inverse and only
//! succeeds within a caller-supplied tolerance. [Degree changes][degree] combine both
//! around a Bézier decomposition of one direction: elevation is exact, reduction is
//! gated by a tolerance like removal. All operate on one direction of the control
//! point lattice at a time and blend whole lattice lines.

pub mod degree;
pub mod insert;
pub mod remove;
