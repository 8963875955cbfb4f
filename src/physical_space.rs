//! Control point lattices in physical space.
//!
//! A [`PhysicalSpace`] stores the control points of a tensor-product spline in one
//! flat lattice, linearized with the first parametric direction varying fastest. The
//! per-direction point counts recover the tensor structure; conversions between
//! multi-indices and linear positions go through
//! [`MultiIndexHandler`](crate::index::MultiIndexHandler).
//!
//! A [`WeightedPhysicalSpace`] extends the lattice by one weight per control point for
//! rational splines. Its homogeneous control points carry each coordinate multiplied
//! by the weight, with the weight appended as the last coordinate, see section 4.2 in
//! \[Piegl1997\].

use thiserror::Error;

use crate::index::MultiIndexHandler;
use crate::numeric;
use crate::points::ControlPoint;
use crate::types::{MatD, VecD, VecDView};

/// A lattice of control points, one per tensor-product basis function.
#[derive(Debug, Clone)]
pub struct PhysicalSpace {
    /// One control point per column.
    points: MatD,
    points_per_direction: Vec<usize>,
}

/// [`PhysicalSpace`] extended by one weight per control point.
#[derive(Debug, Clone)]
pub struct WeightedPhysicalSpace {
    space: PhysicalSpace,
    weights: VecD,
}

#[derive(Error, Debug, PartialEq)]
pub enum PhysicalSpaceError {
    #[error("A physical space needs at least one control point.")]
    Empty,
    #[error("Got {number_of_points} control points for a lattice of {expected} points ({points_per_direction:?} per direction).")]
    WrongNumberOfPoints { number_of_points: usize, expected: usize, points_per_direction: Vec<usize> },
    #[error("All control points must share one dimensionality, but the point at position {position} has {dimensionality} coordinates instead of {expected}.")]
    MixedDimensionality { position: usize, dimensionality: usize, expected: usize },
    #[error("Got {number_of_weights} weights for {number_of_points} control points, but one weight is needed per point.")]
    WrongNumberOfWeights { number_of_points: usize, number_of_weights: usize },
}

impl PhysicalSpace {
    /// Copies `points` into a lattice with the given per-direction counts.
    pub fn new(
        points: &[ControlPoint],
        points_per_direction: Vec<usize>,
    ) -> Result<Self, PhysicalSpaceError> {
        let expected: usize = points_per_direction.iter().product();
        if points.is_empty() || expected == 0 {
            return Err(PhysicalSpaceError::Empty);
        }
        if points.len() != expected {
            return Err(PhysicalSpaceError::WrongNumberOfPoints {
                number_of_points: points.len(),
                expected,
                points_per_direction,
            });
        }
        let dimensionality = points[0].dimensionality();
        for (position, point) in points.iter().enumerate() {
            if point.dimensionality() != dimensionality {
                return Err(PhysicalSpaceError::MixedDimensionality {
                    position,
                    dimensionality: point.dimensionality(),
                    expected: dimensionality,
                });
            }
        }
        let lattice = MatD::from_fn(dimensionality, points.len(), |row, column| {
            points[column].value(row)
        });
        Ok(Self { points: lattice, points_per_direction })
    }

    /// Number of coordinates of each control point.
    pub fn dimensionality(&self) -> usize {
        self.points.nrows()
    }

    pub fn total_number_of_points(&self) -> usize {
        self.points.ncols()
    }

    pub fn points_per_direction(&self) -> &[usize] {
        &self.points_per_direction
    }

    /// Number of control points along `direction`.
    ///
    /// # Panics
    /// Panics if `direction` does not index a parametric direction.
    pub fn number_of_points(&self, direction: usize) -> usize {
        self.points_per_direction[direction]
    }

    /// Largest valid point index of every direction, one below the counts.
    pub fn maximum_point_index_per_direction(&self) -> Vec<usize> {
        self.points_per_direction.iter().map(|&count| count - 1).collect()
    }

    /// Control point at linear position `linear`.
    ///
    /// # Panics
    /// Panics if `linear` is not smaller than [`Self::total_number_of_points`].
    pub fn control_point(&self, linear: usize) -> ControlPoint {
        ControlPoint::new(self.points.column(linear).into_owned())
    }

    /// Control point at the multi-index `indices`.
    ///
    /// # Panics
    /// Panics if `indices` does not have one entry per direction or indexes outside
    /// the lattice.
    pub fn control_point_at(&self, indices: &[usize]) -> ControlPoint {
        self.control_point(self.linear_index(indices))
    }

    /// Coordinate `coordinate` of the control point at linear position `linear`.
    ///
    /// # Panics
    /// Panics if `linear` or `coordinate` is out of range.
    pub fn coordinate(&self, linear: usize, coordinate: usize) -> f64 {
        self.points[(coordinate, linear)]
    }

    /// Replaces the control point at linear position `linear`.
    ///
    /// # Panics
    /// Panics if `linear` is out of range or the dimensionality of `point` differs
    /// from the lattice.
    pub fn set_control_point(&mut self, linear: usize, point: &ControlPoint) {
        assert_eq!(point.dimensionality(), self.dimensionality());
        self.points.set_column(linear, point.coordinates());
    }

    /// Replaces the control point at the multi-index `indices`.
    ///
    /// # Panics
    /// Panics if `indices` does not have one entry per direction, indexes outside the
    /// lattice, or the dimensionality of `point` differs from the lattice.
    pub fn set_control_point_at(&mut self, indices: &[usize], point: &ControlPoint) {
        self.set_control_point(self.linear_index(indices), point);
    }

    /// Appends `number` control points at the origin to the end of the lattice.
    ///
    /// The per-direction counts are not touched; they are realigned by the knot
    /// manipulation routines reshaping the lattice.
    pub fn add_control_points(&mut self, number: usize) {
        let total = self.total_number_of_points() + number;
        self.points = self.points.clone().resize_horizontally(total, 0.0);
    }

    /// Truncates `number` control points from the end of the lattice.
    ///
    /// # Panics
    /// Panics if `number` exceeds [`Self::total_number_of_points`].
    pub fn remove_control_points(&mut self, number: usize) {
        let total = self.total_number_of_points() - number;
        self.points = self.points.clone().resize_horizontally(total, 0.0);
    }

    /// Largest absolute coordinate over all control points.
    pub fn expansion(&self) -> f64 {
        self.points.amax()
    }

    /// Largest Euclidean norm over all control points.
    pub fn maximum_distance_from_origin(&self) -> f64 {
        self.points.column_iter().map(|point| point.norm()).fold(0.0, f64::max)
    }

    /// The sub-lattice of points whose index along `direction` lies in
    /// `[first, first + length)`, with the other directions kept whole.
    ///
    /// # Panics
    /// Panics if `direction` does not index a parametric direction or the range
    /// reaches past the points of that direction.
    pub fn divided_control_points(&self, first: usize, length: usize, direction: usize) -> Self {
        assert!(first + length <= self.points_per_direction[direction]);
        let mut points_per_direction = self.points_per_direction.clone();
        points_per_direction[direction] = length;
        let total: usize = points_per_direction.iter().product();
        let mut lattice = MatD::zeros(self.dimensionality(), total);
        let mut handler = MultiIndexHandler::new(&self.points_per_direction);
        let mut kept = 0;
        for linear in 0..handler.linear_length() {
            handler.set_linear_index(linear);
            let index = handler.indices()[direction];
            if first <= index && index < first + length {
                lattice.set_column(kept, &self.points.column(linear));
                kept += 1;
            }
        }
        Self { points: lattice, points_per_direction }
    }

    /// Whether both lattices have the same layout and coordinates within `tolerance`.
    pub fn are_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.points_per_direction == other.points_per_direction
            && self.dimensionality() == other.dimensionality()
            && self
                .points
                .iter()
                .zip(other.points.iter())
                .all(|(&a, &b)| numeric::are_equal_with_tolerance(a, b, tolerance))
    }

    pub(crate) fn lattice(&self) -> &MatD {
        &self.points
    }

    pub(crate) fn point_view(&self, linear: usize) -> VecDView<'_> {
        self.points.column(linear)
    }

    pub(crate) fn set_lattice(&mut self, points: MatD, points_per_direction: Vec<usize>) {
        debug_assert_eq!(points.ncols(), points_per_direction.iter().product::<usize>());
        self.points = points;
        self.points_per_direction = points_per_direction;
    }

    fn linear_index(&self, indices: &[usize]) -> usize {
        let mut handler = MultiIndexHandler::new(&self.points_per_direction);
        handler.set_indices(indices);
        handler.linear_index()
    }
}

impl PartialEq for PhysicalSpace {
    fn eq(&self, other: &Self) -> bool {
        self.are_equal(other, numeric::EPSILON)
    }
}

impl WeightedPhysicalSpace {
    /// Copies `points` into a lattice and attaches one weight per point.
    pub fn new(
        points: &[ControlPoint],
        weights: VecD,
        points_per_direction: Vec<usize>,
    ) -> Result<Self, PhysicalSpaceError> {
        if points.len() != weights.len() {
            return Err(PhysicalSpaceError::WrongNumberOfWeights {
                number_of_points: points.len(),
                number_of_weights: weights.len(),
            });
        }
        let space = PhysicalSpace::new(points, points_per_direction)?;
        Ok(Self { space, weights })
    }

    /// The unweighted lattice.
    pub fn space(&self) -> &PhysicalSpace {
        &self.space
    }

    pub fn dimensionality(&self) -> usize {
        self.space.dimensionality()
    }

    pub fn total_number_of_points(&self) -> usize {
        self.space.total_number_of_points()
    }

    pub fn points_per_direction(&self) -> &[usize] {
        self.space.points_per_direction()
    }

    /// Control point at linear position `linear`.
    ///
    /// # Panics
    /// Panics if `linear` is not smaller than [`Self::total_number_of_points`].
    pub fn control_point(&self, linear: usize) -> ControlPoint {
        self.space.control_point(linear)
    }

    /// Control point at the multi-index `indices`.
    ///
    /// # Panics
    /// Panics if `indices` does not have one entry per direction or indexes outside
    /// the lattice.
    pub fn control_point_at(&self, indices: &[usize]) -> ControlPoint {
        self.space.control_point_at(indices)
    }

    /// Replaces the control point at linear position `linear`, keeping its weight.
    ///
    /// # Panics
    /// Panics if `linear` is out of range or the dimensionality of `point` differs
    /// from the lattice.
    pub fn set_control_point(&mut self, linear: usize, point: &ControlPoint) {
        self.space.set_control_point(linear, point);
    }

    /// Weight of the control point at linear position `linear`.
    ///
    /// # Panics
    /// Panics if `linear` is not smaller than [`Self::total_number_of_points`].
    pub fn weight(&self, linear: usize) -> f64 {
        self.weights[linear]
    }

    /// Weight of the control point at the multi-index `indices`.
    ///
    /// # Panics
    /// Panics if `indices` does not have one entry per direction or indexes outside
    /// the lattice.
    pub fn weight_at(&self, indices: &[usize]) -> f64 {
        self.weights[self.space.linear_index(indices)]
    }

    /// # Panics
    /// Panics if `linear` is not smaller than [`Self::total_number_of_points`].
    pub fn set_weight(&mut self, linear: usize, weight: f64) {
        self.weights[linear] = weight;
    }

    /// # Panics
    /// Panics if `indices` does not have one entry per direction or indexes outside
    /// the lattice.
    pub fn set_weight_at(&mut self, indices: &[usize], weight: f64) {
        let linear = self.space.linear_index(indices);
        self.weights[linear] = weight;
    }

    pub fn weights(&self) -> &VecD {
        &self.weights
    }

    pub fn minimum_weight(&self) -> f64 {
        self.weights.min()
    }

    /// The control point at linear position `linear` in homogeneous coordinates: each
    /// coordinate multiplied by the weight, with the weight appended last.
    ///
    /// # Panics
    /// Panics if `linear` is not smaller than [`Self::total_number_of_points`].
    pub fn homogeneous_control_point(&self, linear: usize) -> VecD {
        let weight = self.weights[linear];
        let point = self.space.point_view(linear);
        VecD::from_fn(point.len() + 1, |i, _| {
            if i < point.len() {
                point[i] * weight
            } else {
                weight
            }
        })
    }

    /// Appends `number` control points at the origin with weight one.
    ///
    /// The per-direction counts are not touched; they are realigned by the knot
    /// manipulation routines reshaping the lattice.
    pub fn add_control_points(&mut self, number: usize) {
        self.space.add_control_points(number);
        let total = self.weights.len() + number;
        self.weights = self.weights.clone().resize_vertically(total, 1.0);
    }

    /// Truncates `number` control points and their weights from the end.
    ///
    /// # Panics
    /// Panics if `number` exceeds [`Self::total_number_of_points`].
    pub fn remove_control_points(&mut self, number: usize) {
        self.space.remove_control_points(number);
        let total = self.weights.len() - number;
        self.weights = self.weights.clone().resize_vertically(total, 1.0);
    }

    /// The weights of the sub-lattice selected like
    /// [`PhysicalSpace::divided_control_points`].
    ///
    /// # Panics
    /// Panics if `direction` does not index a parametric direction or the range
    /// reaches past the points of that direction.
    pub fn divided_weights(&self, first: usize, length: usize, direction: usize) -> VecD {
        assert!(first + length <= self.points_per_direction()[direction]);
        let mut kept = Vec::new();
        let mut handler = MultiIndexHandler::new(self.points_per_direction());
        for linear in 0..handler.linear_length() {
            handler.set_linear_index(linear);
            let index = handler.indices()[direction];
            if first <= index && index < first + length {
                kept.push(self.weights[linear]);
            }
        }
        VecD::from_vec(kept)
    }

    /// Whether both spaces have the same lattice and weights within `tolerance`.
    pub fn are_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.space.are_equal(&other.space, tolerance)
            && self.weights.len() == other.weights.len()
            && self
                .weights
                .iter()
                .zip(other.weights.iter())
                .all(|(&a, &b)| numeric::are_equal_with_tolerance(a, b, tolerance))
    }

    pub(crate) fn set_lattice(&mut self, points: MatD, weights: VecD, points_per_direction: Vec<usize>) {
        debug_assert_eq!(weights.len(), points.ncols());
        self.space.set_lattice(points, points_per_direction);
        self.weights = weights;
    }
}

impl PartialEq for WeightedPhysicalSpace {
    fn eq(&self, other: &Self) -> bool {
        self.are_equal(other, numeric::EPSILON)
    }
}
