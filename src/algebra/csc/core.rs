#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, MatrixShape, ShapedMatrix, SparseFormatError, Symmetric};
use std::iter::zip;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use splitqp::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.  Row ordering and bounds are not checked here; use
    /// [`check_format`](CscMatrix::check_format) for that.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    ///
    /// To make an m x n matrix of zeros, use
    /// ```no_run
    /// use splitqp::algebra::CscMatrix;
    /// let A : CscMatrix<f64> = CscMatrix::spalloc(3, 4, 0);
    /// ```
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        colptr[n] = nnz;
        CscMatrix::new(m, n, colptr, vec![0; nnz], vec![T::zero(); nnz])
    }

    /// An `m x n` matrix with no structural nonzeros
    pub fn zeros(m: usize, n: usize) -> Self {
        Self::spalloc(m, n, 0)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];
        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len()
            || self.colptr.len() != self.n + 1
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr[0] != 0 || self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        if self.rowval.iter().any(|&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        // strictly increasing rows within each column
        for col in 0..self.n {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            if rows.windows(2).any(|r| r[0] >= r[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }

        Ok(())
    }

    /// Check that `self` and `other` have identical sparsity patterns
    pub fn check_equal_sparsity(&self, other: &Self) -> Result<(), SparseFormatError> {
        if self.size() != other.size() || self.nnz() != other.nnz() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.colptr != other.colptr || self.rowval != other.rowval {
            return Err(SparseFormatError::SparsityMismatch);
        }
        Ok(())
    }

    /// Allocates a new matrix containing only entries from the upper triangular part
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let n = self.n;
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(self.nnz());
        let mut nzval = Vec::with_capacity(self.nnz());

        for col in 0..n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            for (&row, &val) in zip(&self.rowval[rng.clone()], &self.nzval[rng]) {
                if row <= col {
                    rowval.push(row);
                    nzval.push(val);
                }
            }
            colptr[col + 1] = rowval.len();
        }
        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        (0..self.n).all(|col| {
            self.rowval[self.colptr[col]..self.colptr[col + 1]]
                .iter()
                .all(|&row| row <= col)
        })
    }

    /// Build a matrix from a subset of rows.  Row `r` of `self` becomes
    /// row `rowmap[r]` of the output, and is dropped if `rowmap[r]` is
    /// `None`.  The map must be injective on its `Some` values, each of
    /// which is less than `mred`.
    pub fn select_rows(&self, rowmap: &[Option<usize>], mred: usize) -> Self {
        assert_eq!(rowmap.len(), self.m);

        let mut colptr = vec![0; self.n + 1];
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        let mut column: Vec<(usize, T)> = Vec::new();

        for col in 0..self.n {
            column.clear();
            let rng = self.colptr[col]..self.colptr[col + 1];
            for (&row, &val) in zip(&self.rowval[rng.clone()], &self.nzval[rng]) {
                if let Some(newrow) = rowmap[row] {
                    column.push((newrow, val));
                }
            }
            // the map may reorder rows, so restore CSC ordering
            column.sort_unstable_by_key(|&(r, _)| r);
            for &(r, v) in column.iter() {
                rowval.push(r);
                nzval.push(v);
            }
            colptr[col + 1] = rowval.len();
        }

        CscMatrix::new(mred, self.n, colptr, rowval, nzval)
    }

    /// Returns the (row,col) coordinate of the `idx`th structural nonzero
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn index_to_coord(&self, idx: usize) -> (usize, usize) {
        assert!(idx < self.nnz());
        // first column whose end pointer is beyond idx
        let col = self.colptr.partition_point(|&p| p <= idx) - 1;
        (self.rowval[idx], col)
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.m && col < self.n);

        let first = self.colptr[col];
        let rows = &self.rowval[first..self.colptr[col + 1]];
        rows.binary_search(&row)
            .ok()
            .map(|k| self.nzval[first + k])
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}

/// Construct a sparse matrix from a dense, row-major array of arrays,
/// keeping only the nonzero entries.
impl<T, const M: usize, const N: usize> From<&[[T; N]; M]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Self {
        let mut colptr = vec![0; N + 1];
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        for col in 0..N {
            for (r, row) in rows.iter().enumerate() {
                if row[col] != T::zero() {
                    rowval.push(r);
                    nzval.push(row[col]);
                }
            }
            colptr[col + 1] = rowval.len();
        }
        CscMatrix::new(M, N, colptr, rowval, nzval)
    }
}

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]
    let A = CscMatrix::new(
        6,
        5,
        vec![0, 3, 9, 11, 11, 14],
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.],
    );

    assert!(A.check_format().is_ok());
    assert_eq!(A.get_entry((1, 0)), Some(1.));
    assert_eq!(A.get_entry((3, 1)), Some(7.));
    assert_eq!(A.get_entry((4, 4)), Some(14.));
    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((2, 3)).is_none());

    // every nonzero maps back to its own coordinate
    for idx in 0..A.nnz() {
        let (r, c) = A.index_to_coord(idx);
        assert_eq!(A.get_entry((r, c)), Some(A.nzval[idx]));
    }
}

#[test]
fn test_csc_check_format() {
    let good = CscMatrix::<f64>::from(&[[1., 0.], [2., 3.]]);
    assert!(good.check_format().is_ok());

    let mut bad = good.clone();
    bad.rowval.swap(0, 1);
    assert_eq!(bad.check_format(), Err(SparseFormatError::BadRowOrdering));

    let mut bad = good.clone();
    bad.rowval[2] = 7;
    assert_eq!(bad.check_format(), Err(SparseFormatError::BadRowval));

    let mut bad = good;
    bad.colptr[1] = 4;
    assert_eq!(bad.check_format(), Err(SparseFormatError::BadColptr));
}

#[test]
fn test_csc_select_rows_reordered() {
    // A =
    //[1  2]
    //[3  0]
    //[0  4]
    let A = CscMatrix::<f64>::from(&[[1., 2.], [3., 0.], [0., 4.]]);

    // keep rows 2 and 0, in that order
    let map = vec![Some(1), None, Some(0)];
    let B = A.select_rows(&map, 2);
    assert!(B.check_format().is_ok());
    assert_eq!(B, CscMatrix::from(&[[0., 4.], [1., 2.]]));
}

#[test]
fn test_csc_to_triu() {
    let A = CscMatrix::<f64>::from(&[[4., 1.], [1., 2.]]);
    let U = A.to_triu();
    assert!(U.is_triu());
    assert!(!A.is_triu());
    assert_eq!(U, CscMatrix::from(&[[4., 1.], [0., 2.]]));
}
