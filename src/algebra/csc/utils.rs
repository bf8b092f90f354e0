//---------------------------------------------------------
// low-level internal utilities for counting / filling entries
// in block partitioned sparse matrices.
//
// Assembly is done in two passes.  The `colcount_*` functions
// accumulate per-column entry counts into `colptr`, which
// `colcount_to_colptr` then converts to starting offsets.  The
// `fill_*` functions use `colptr[col]` as the next free slot in
// each column, so after all fills `colptr[col]` points at the
// start of column `col+1` and `backshift_colptrs` restores it.
//---------------------------------------------------------

use crate::algebra::{CscMatrix, FloatT, MatrixShape};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // true if the triu matrix M has no entry at (col,col)
    fn missing_diag(M: &CscMatrix<T>, col: usize) -> bool {
        let (first, last) = (M.colptr[col], M.colptr[col + 1]);
        first == last || M.rowval[last - 1] != col
    }

    // increment colptr by the number of nonzeros in M, placed
    // with its top-left corner in column `initcol`.
    pub(crate) fn colcount_block(&mut self, M: &CscMatrix<T>, initcol: usize, shape: MatrixShape) {
        match shape {
            MatrixShape::T => {
                for &row in M.rowval.iter() {
                    self.colptr[initcol + row] += 1;
                }
            }
            MatrixShape::N => {
                for col in 0..M.n {
                    self.colptr[initcol + col] += M.colptr[col + 1] - M.colptr[col];
                }
            }
        }
    }

    // one entry for each diagonal place in a block of size `blockcols`
    pub(crate) fn colcount_diag(&mut self, initcol: usize, blockcols: usize) {
        self.colptr[initcol..(initcol + blockcols)]
            .iter_mut()
            .for_each(|c| *c += 1);
    }

    // one entry for each place where the square triu matrix M
    // is missing a diagonal entry
    pub(crate) fn colcount_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for col in 0..M.n {
            if Self::missing_diag(M, col) {
                self.colptr[initcol + col] += 1;
            }
        }
    }

    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in self.colptr.iter_mut() {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    // copy values from M into the block with corner (initrow,initcol),
    // recording the destination of each entry of M in `MtoKKT`
    pub(crate) fn fill_block(
        &mut self,
        M: &CscMatrix<T>,
        MtoKKT: &mut [usize],
        initrow: usize,
        initcol: usize,
        shape: MatrixShape,
    ) {
        assert_eq!(MtoKKT.len(), M.nnz());

        for Mcol in 0..M.n {
            for k in M.colptr[Mcol]..M.colptr[Mcol + 1] {
                let Mrow = M.rowval[k];
                let (row, col) = match shape {
                    MatrixShape::N => (Mrow + initrow, Mcol + initcol),
                    MatrixShape::T => (Mcol + initrow, Mrow + initcol),
                };
                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = M.nzval[k];
                self.colptr[col] += 1;
                MtoKKT[k] = dest;
            }
        }
    }

    // structural zeros on the diagonal of a block of size `blockdim`
    pub(crate) fn fill_diag(&mut self, diagtoKKT: &mut [usize], offset: usize, blockdim: usize) {
        for (i, col) in (offset..(offset + blockdim)).enumerate() {
            let dest = self.colptr[col];
            self.rowval[dest] = col;
            self.nzval[dest] = T::zero();
            self.colptr[col] += 1;
            diagtoKKT[i] = dest;
        }
    }

    // structural zeros where the square triu matrix M is
    // missing a diagonal entry
    pub(crate) fn fill_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for col in 0..M.n {
            if Self::missing_diag(M, col) {
                let dest = self.colptr[initcol + col];
                self.rowval[dest] = initcol + col;
                self.nzval[dest] = T::zero();
                self.colptr[initcol + col] += 1;
            }
        }
    }

    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}
