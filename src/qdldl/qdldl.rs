#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("Fill reducing ordering failed")]
    OrderingFailure,
}

/// Optional settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings {
    /// scaling applied to the AMD dense row threshold
    #[builder(default = "1.0")]
    amd_dense_scale: f64,
    /// user supplied ordering.  AMD is used if `None`
    #[builder(default = "None", setter(strip_option))]
    perm: Option<Vec<usize>>,
}

impl Default for QDLDLSettings {
    fn default() -> QDLDLSettings {
        QDLDLSettingsBuilder::default().build().unwrap()
    }
}

/// Performs $LDL^T$ factorization of a symmetric quasidefinite matrix
///
/// The symbolic analysis (ordering, elimination tree and column counts
/// of `L`) is done once on construction.  Values of the factored matrix
/// can then be changed with [`update_values`](Self::update_values)
/// followed by [`refactor`](Self::refactor) without repeating it.

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    /// permutation vector
    pub perm: Vec<usize>,
    /// strictly lower triangular factor
    pub L: CscMatrix<T>,
    /// D and is inverse for A = LDL^T
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    workspace: QDLDLWorkspace<T>,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        check_structure(Ain)?;

        let n = Ain.n;
        let opts = opts.unwrap_or_default();

        let (perm, iperm) = match opts.perm {
            Some(perm) => {
                let iperm = _invperm(&perm)?;
                (perm, iperm)
            }
            None => _get_amd_ordering(Ain, opts.amd_dense_scale)?,
        };

        // permuted upper triangle, and where each input entry went
        let (triuA, AtoPAPt) = _permute_symmetric(Ain, &iperm);

        let workspace = QDLDLWorkspace::new(triuA, AtoPAPt);

        let nnzL = workspace.Lnz.iter().sum();

        let mut factors = QDLDLFactorisation {
            perm,
            L: CscMatrix::spalloc(n, n, nnzL),
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            workspace,
        };
        factors.refactor()?;
        Ok(factors)
    }

    /// number of positive pivots in D
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// Solves Ax = b using the LDL factors of A, with x replacing b
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);

        _lsolve(&self.L, tmp);
        tmp.hadamard(&self.Dinv);
        _ltsolve(&self.L, tmp);

        _ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the factored matrix.  `indices` refer to
    /// positions in the `nzval` array of the matrix passed at construction.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        assert_eq!(indices.len(), values.len());
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (&idx, &v) in zip(indices, values) {
            nzval[AtoPAPt[idx]] = v;
        }
    }

    /// Numeric refactorization using the existing symbolic analysis
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        _factor(&mut self.L, &mut self.D, &mut self.Dinv, &mut self.workspace)
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() || A.colptr.len() != A.n + 1 {
        return Err(QDLDLError::IncompatibleDimension);
    }
    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }
    //every column needs at least one entry
    if A.colptr.windows(2).any(|c| c[0] >= c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }
    Ok(())
}

const QDLDL_UNKNOWN: usize = usize::MAX;

#[derive(Debug)]
struct QDLDLWorkspace<T> {
    // elimination tree and column counts of L
    etree: Vec<usize>,
    Lnz: Vec<usize>,

    // scratch space for the numeric phase
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    // the permuted matrix PAPᵀ (triu) being factored, and
    // the map from input entries to its entries
    triuA: CscMatrix<T>,
    AtoPAPt: Vec<usize>,

    positive_inertia: usize,
}

impl<T> QDLDLWorkspace<T>
where
    T: FloatT,
{
    fn new(triuA: CscMatrix<T>, AtoPAPt: Vec<usize>) -> Self {
        let n = triuA.n;
        let mut etree = vec![QDLDL_UNKNOWN; n];
        let mut Lnz = vec![0; n];
        let mut iwork = vec![0; 3 * n];

        _etree(&triuA, &mut iwork[0..n], &mut Lnz, &mut etree);

        Self {
            etree,
            Lnz,
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            triuA,
            AtoPAPt,
            positive_inertia: 0,
        }
    }
}

// Elimination tree of a triu matrix.  Also counts the nonzeros in
// each column of L.
fn _etree<T>(A: &CscMatrix<T>, visited: &mut [usize], Lnz: &mut [usize], etree: &mut [usize]) {
    Lnz.fill(0);
    etree.fill(QDLDL_UNKNOWN);

    for j in 0..A.n {
        visited[j] = j;
        for &row in &A.rowval[A.colptr[j]..A.colptr[j + 1]] {
            let mut i = row;
            while visited[i] != j {
                if etree[i] == QDLDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                visited[i] = j;
                i = etree[i];
            }
        }
    }
}

// Up-looking numeric factorization.  Row k of L is found by a sparse
// triangular solve against the part of column k above the diagonal,
// with the nonzero pattern found by walking the elimination tree.
fn _factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    ws: &mut QDLDLWorkspace<T>,
) -> Result<(), QDLDLError> {
    let QDLDLWorkspace {
        etree,
        Lnz,
        iwork,
        bwork: marked,
        fwork: yvals,
        triuA: A,
        positive_inertia,
        ..
    } = ws;

    let n = A.n;
    let (yidx, iwork) = iwork.split_at_mut(n);
    let (path, next_slot) = iwork.split_at_mut(n);

    // column pointers of L are fixed by the symbolic phase
    L.colptr[0] = 0;
    for k in 0..n {
        L.colptr[k + 1] = L.colptr[k] + Lnz[k];
    }
    next_slot.copy_from_slice(&L.colptr[0..n]);

    marked.fill(false);
    yvals.fill(T::zero());
    D.fill(T::zero());
    *positive_inertia = 0;

    for k in 0..n {
        let mut nnzy = 0;

        // scatter the column into y and collect the reach of its
        // pattern in the elimination tree, in topological order
        for p in A.colptr[k]..A.colptr[k + 1] {
            let i = A.rowval[p];
            if i == k {
                D[k] = A.nzval[p];
                continue;
            }
            yvals[i] = A.nzval[p];

            let mut len = 0;
            let mut j = i;
            while j != QDLDL_UNKNOWN && j < k && !marked[j] {
                marked[j] = true;
                path[len] = j;
                len += 1;
                j = etree[j];
            }
            while len > 0 {
                len -= 1;
                yidx[nnzy] = path[len];
                nnzy += 1;
            }
        }

        // eliminate, deepest tree nodes first
        for &c in yidx[0..nnzy].iter().rev() {
            let yc = yvals[c];
            let slot = next_slot[c];

            for q in L.colptr[c]..slot {
                yvals[L.rowval[q]] -= L.nzval[q] * yc;
            }

            let lkc = yc * Dinv[c];
            L.rowval[slot] = k;
            L.nzval[slot] = lkc;
            D[k] -= yc * lkc;
            next_slot[c] += 1;

            yvals[c] = T::zero();
            marked[c] = false;
        }

        if D[k] == T::zero() || !D[k].is_finite() {
            return Err(QDLDLError::ZeroPivot);
        }
        if D[k] > T::zero() {
            *positive_inertia += 1;
        }
        Dinv[k] = T::recip(D[k]);
    }

    Ok(())
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        for q in L.colptr[i]..L.colptr[i + 1] {
            x[L.rowval[q]] -= L.nzval[q] * xi;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let rng = L.colptr[i]..L.colptr[i + 1];
        let s = zip(&L.rowval[rng.clone()], &L.nzval[rng])
            .fold(T::zero(), |acc, (&r, &v)| acc + v * x[r]);
        x[i] -= s;
    }
}

// Construct an inverse permutation from a permutation
fn _invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let n = p.len();
    let mut b = vec![QDLDL_UNKNOWN; n];
    for (i, &j) in p.iter().enumerate() {
        if j >= n || b[j] != QDLDL_UNKNOWN {
            return Err(QDLDLError::InvalidPermutation);
        }
        b[j] = i;
    }
    Ok(b)
}

// x = b[p]
fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(x, p).for_each(|(x, &p)| *x = b[p]);
}

// x[p] = b
fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(b, p).for_each(|(&b, &p)| x[p] = b);
}

// Symmetric permutation PAPᵀ of a triu matrix, returned as triu.
// Rows within each output column are not sorted.  Also returns the
// position in the output of each entry of the input.
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.n;
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    // count entries landing in each output column
    let mut counts = vec![0usize; n];
    for colA in 0..n {
        for &rowA in &A.rowval[A.colptr[colA]..A.colptr[colA + 1]] {
            counts[max(iperm[rowA], iperm[colA])] += 1;
        }
    }
    P.colptr[0] = 0;
    for k in 0..n {
        P.colptr[k + 1] = P.colptr[k] + counts[k];
    }

    let mut next = P.colptr[0..n].to_vec();
    for colA in 0..n {
        for k in A.colptr[colA]..A.colptr[colA + 1] {
            let (r, c) = (iperm[A.rowval[k]], iperm[colA]);
            let col = max(r, c);
            let dest = next[col];
            P.rowval[dest] = min(r, c);
            P.nzval[dest] = A.nzval[k];
            AtoPAPt[k] = dest;
            next[col] += 1;
        }
    }
    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.n, &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailure)?;
    Ok((perm, iperm))
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;
