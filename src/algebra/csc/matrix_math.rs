#![allow(non_snake_case)]
use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self.src, y, x, a, b);
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_symv(self.src, y, x, a, b);
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);

        for (col, v) in norms.iter_mut().enumerate() {
            let vals = &self.nzval[self.colptr[col]..self.colptr[col + 1]];
            *v = vals.iter().fold(*v, |m, &a| T::max(m, T::abs(a)));
        }
    }

    fn col_norms_sym(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        norms.fill(T::zero());

        // each triu entry contributes to both its row and column
        for col in 0..self.n {
            for k in self.colptr[col]..self.colptr[col + 1] {
                let v = T::abs(self.nzval[k]);
                let row = self.rowval[k];
                norms[col] = T::max(norms[col], v);
                norms[row] = T::max(norms[row], v);
            }
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.fill(T::zero());

        for (&row, &val) in zip(&self.rowval, &self.nzval) {
            norms[row] = T::max(norms[row], T::abs(val));
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);

        for (col, &rc) in r.iter().enumerate() {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let vals = &mut self.nzval[first..last];
            let rows = &self.rowval[first..last];
            for (val, &row) in zip(vals, rows) {
                *val *= l[row] * rc;
            }
        }
    }
}

fn _csc_symv<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(A.n, A.m);
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.n);

    y.scale(b);

    for (col, &xcol) in x.iter().enumerate() {
        let first = A.colptr[col];
        let last = A.colptr[col + 1];

        for (&row, &Aij) in zip(&A.rowval[first..last], &A.nzval[first..last]) {
            y[row] += a * Aij * xcol;
            if row != col {
                //don't double up on the diagonal
                y[col] += a * Aij * x[row];
            }
        }
    }
}

// y = b*y, with the common special cases done without multiplication
fn _scale_output<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == -T::one() {
        y.negate();
    } else if b != T::one() {
        y.scale(b);
    }
}

// sparse matrix-vector multiply, no transpose
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    _scale_output(y, b);
    if a == T::zero() {
        return;
    }

    for (col, &xj) in x.iter().enumerate() {
        let axj = a * xj;
        for k in A.colptr[col]..A.colptr[col + 1] {
            y[A.rowval[k]] += A.nzval[k] * axj;
        }
    }
}

// sparse matrix-vector multiply, transposed
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    _scale_output(y, b);
    if a == T::zero() {
        return;
    }

    for (col, yj) in y.iter_mut().enumerate() {
        let first = A.colptr[col];
        let last = A.colptr[col + 1];
        let acc = zip(&A.rowval[first..last], &A.nzval[first..last])
            .fold(T::zero(), |acc, (&row, &v)| acc + v * x[row]);
        *yj += a * acc;
    }
}

#[test]
fn test_gemv_and_transpose() {
    // A = [1 2 0; 0 3 4]
    let A = CscMatrix::<f64>::from(&[[1., 2., 0.], [0., 3., 4.]]);
    let x = vec![1., 1., 1.];
    let mut y = vec![1., 1.];
    A.gemv(&mut y, &x, 2., -1.);
    assert_eq!(y, vec![5., 13.]);

    let w = vec![1., -1.];
    let mut z = vec![0.; 3];
    A.t().gemv(&mut z, &w, 1., 0.);
    assert_eq!(z, vec![1., -1., -4.]);
}

#[test]
fn test_symv() {
    // P = [4 1; 1 2], stored triu
    let P = CscMatrix::<f64>::from(&[[4., 1.], [0., 2.]]);
    let x = vec![1., 2.];
    let mut y = vec![0.; 2];
    P.sym().symv(&mut y, &x, 1., 0.);
    assert_eq!(y, vec![6., 5.]);
}

#[test]
fn test_norms_and_scaling() {
    let P = CscMatrix::<f64>::from(&[[1., -5.], [0., 2.]]);
    let mut n = vec![0.; 2];
    P.col_norms_sym(&mut n);
    assert_eq!(n, vec![5., 5.]);

    let mut A = CscMatrix::<f64>::from(&[[1., 2.], [-3., 0.], [0., 0.]]);
    let mut r = vec![0.; 3];
    A.row_norms(&mut r);
    assert_eq!(r, vec![2., 3., 0.]);
    n.fill(0.);
    A.col_norms_no_reset(&mut n);
    assert_eq!(n, vec![3., 2.]);

    A.lrscale(&[1., 2., 3.], &[10., 100.]);
    assert_eq!(A, CscMatrix::from(&[[10., 200.], [-60., 0.], [0., 0.]]));
}
