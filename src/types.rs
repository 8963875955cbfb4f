use nalgebra::{Dyn, MatrixView, MatrixViewMut, OMatrix, OVector, U1};

pub type VecD = OVector<f64, Dyn>;

pub type VecDView<'a> = MatrixView<'a, f64, Dyn, U1, U1, Dyn>;

pub type VecDViewMut<'a> = MatrixViewMut<'a, f64, Dyn, U1, U1, Dyn>;

pub type MatD = OMatrix<f64, Dyn, Dyn>;

pub trait VecHelpers {
    fn head_mut(&mut self, n: usize) -> VecDViewMut;

    fn segment_mut(&mut self, i: usize, n: usize) -> VecDViewMut;

    fn tail_mut(&mut self, n: usize) -> VecDViewMut;
}

impl VecHelpers for VecD {
    fn head_mut(&mut self, n: usize) -> VecDViewMut {
        self.segment_mut(0, n)
    }

    fn segment_mut(&mut self, start: usize, n: usize) -> VecDViewMut {
        self.generic_view_mut((start, 0), (Dyn(n), U1))
    }

    fn tail_mut(&mut self, n: usize) -> VecDViewMut {
        self.segment_mut(self.len() - n, n)
    }
}

#[cfg(test)]
mod vec_helpers {
    use nalgebra::dvector;

    use super::*;

    fn example() -> VecD {
        dvector![0.0, 1.0, 2.0, 3.0]
    }

    #[test]
    fn head_mut() {
        let mut v = example();
        v.head_mut(2).fill(7.0);
        assert_eq!(v.as_slice(), [7.0, 7.0, 2.0, 3.0]);
    }

    #[test]
    fn segment_mut() {
        let mut v = example();
        v.segment_mut(1, 2).fill(7.0);
        assert_eq!(v.as_slice(), [0.0, 7.0, 7.0, 3.0]);
    }

    #[test]
    fn tail_mut() {
        let mut v = example();
        v.tail_mut(2).fill(7.0);
        assert_eq!(v.as_slice(), [0.0, 1.0, 7.0, 7.0]);
    }
}
