//#![warn(missing_docs)]
//! **tensorsplines** is a library for tensor-product B-spline and NURBS functions of arbitrary
//! parametric dimension and their derivatives based on [nalgebra].
//!
//! ## Features
//! - Create splines mapping a `P`-dimensional parameter space (`P = 1, 2, 3,...`) into an
//!   `N`-dimensional physical space: curves, surfaces and solids alike.
//! - Efficient [spline evaluation][spline::Spline] including mixed partial derivatives of any order.
//! - Rational splines ([NURBS][spline::Nurbs]) evaluated through homogeneous coordinates.
//! - Built with [nalgebra](https://crates.io/crates/nalgebra) to store lattice data in contiguous arrays
//! - Methods for
//!   - [basis function evaluation][basis]
//!   - [knot vector generation][knots::methods]
//!   - [spline manipulation][manipulation]
//!     - [knot insertion][manipulation::insert]
//!     - [knot removal][manipulation::remove]
//!     - [degree elevation and reduction][manipulation::degree]
//!
//! ## What are tensor-product splines?
//!
//! Tensor-product splines are parametric functions composed of piecewise polynomials in every
//! parametric direction. Along direction `j` the pieces have a polynomial degree `p_j > 0` and
//! are joined so that the function is `p_j - 1` times continuously differentiable across single
//! interior knots. The domain is a `P`-dimensional box spanned by the knot vector ranges and the
//! co-domain is an `N`-dimensional vector space, so one representation describes curves
//! (`P = 1`), surfaces (`P = 2`) and solids (`P = 3` and beyond).
//!
//! Every control point influences the function only where its tensor-product basis function is
//! nonzero, hence evaluations and spatial manipulations only ever touch local windows of the
//! control point lattice and the associated numerical procedures are stable. Weighting the
//! control points generalizes the representation to rational splines (NURBS), which also
//! reproduce conic sections exactly.

//! ## Literature:
//! |           |                                                                                                                        |
//! |----------:|:-----------------------------------------------------------------------------------------------------------------------|
//! | Piegl1997 | Piegl, L., Tiller, W. The NURBS Book. Monographs in Visual Communication. Springer, Berlin, Heidelberg, 2nd ed., 1997. |
//! | Boehm1980 | Boehm, W. Inserting new knots into B-spline curves. Computer-Aided Design, 12(4) (1980) 199-201.                       |

pub mod basis;
pub mod index;
pub mod knots;
pub mod manipulation;
pub mod numeric;
pub mod parameter_space;
pub mod physical_space;
pub mod points;
pub mod spline;
pub mod types;
