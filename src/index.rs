//! Multi-index arithmetic for tensor-product lattices.
//!
//! A lattice with per-direction sizes `(s_0, ..., s_{P-1})` stores its entries linearly
//! with direction `0` varying fastest, so the tuple `(i_0, ..., i_{P-1})` lives at
//!
//! `linear = Σ_k  i_k · Π_{j<k} s_j`
//!
//! [`MultiIndexHandler`] converts between the two representations and enumerates all
//! tuples in exactly that order. Construction, evaluation and manipulation all walk
//! lattices through this one type so their traversal orders can never diverge.

/// Odometer over the multi-indices of a tensor-product lattice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiIndexHandler {
    lengths: Vec<usize>,
    current: Vec<usize>,
}

impl MultiIndexHandler {
    /// Creates a handler for per-direction sizes `lengths`, positioned at the origin.
    pub fn new(lengths: &[usize]) -> Self {
        Self { lengths: lengths.to_vec(), current: vec![0; lengths.len()] }
    }

    /// Number of directions.
    pub fn dimensions(&self) -> usize {
        self.lengths.len()
    }

    /// Total number of tuples, the product of all per-direction sizes.
    pub fn linear_length(&self) -> usize {
        self.lengths.iter().product()
    }

    /// The current tuple.
    pub fn indices(&self) -> &[usize] {
        &self.current
    }

    /// Positions the handler at `indices`.
    ///
    /// # Panics
    /// Panics if `indices` does not have one entry per direction.
    pub fn set_indices(&mut self, indices: &[usize]) {
        assert_eq!(indices.len(), self.lengths.len());
        self.current.copy_from_slice(indices);
    }

    /// Linear index of the current tuple, direction 0 varying fastest.
    pub fn linear_index(&self) -> usize {
        let mut stride = 1;
        let mut linear = 0;
        for (index, length) in self.current.iter().zip(&self.lengths) {
            linear += index * stride;
            stride *= length;
        }
        linear
    }

    /// Positions the handler at the tuple with linear index `linear`.
    pub fn set_linear_index(&mut self, linear: usize) {
        let mut remainder = linear;
        for (index, length) in self.current.iter_mut().zip(&self.lengths) {
            *index = remainder % length;
            remainder /= length;
        }
    }

    /// Advances to the next tuple, carrying from direction 0 upward and wrapping to the
    /// origin after the last tuple.
    pub fn advance(&mut self) {
        for (index, length) in self.current.iter_mut().zip(&self.lengths) {
            *index += 1;
            if *index < *length {
                return;
            }
            *index = 0;
        }
    }
}
