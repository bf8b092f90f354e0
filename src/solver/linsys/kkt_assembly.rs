#![allow(non_snake_case)]

use crate::algebra::*;

/// Positions of the data blocks within the nonzeros of the KKT matrix
#[derive(Debug, Clone)]
pub(crate) struct KKTDataMap {
    /// entries of P
    pub P: Vec<usize>,
    /// entries of A (stored transposed in the upper right block)
    pub A: Vec<usize>,
    /// diagonal of the upper left block
    pub diagP: Vec<usize>,
    /// diagonal of the lower right block
    pub rhoinv: Vec<usize>,
}

impl KKTDataMap {
    fn new<T: FloatT>(P: &CscMatrix<T>, A: &CscMatrix<T>) -> Self {
        let (m, n) = A.size();
        Self {
            P: vec![0; P.nnz()],
            A: vec![0; A.nnz()],
            diagP: vec![0; n],
            rhoinv: vec![0; m],
        }
    }
}

/// Upper triangle of the KKT matrix
///
/// ```text
/// [ P   Aᵀ ]
/// [ ⋅   0  ]
/// ```
///
/// with structural entries everywhere on the diagonal.  The values on
/// the diagonal of the lower right block are left as zeros.
pub(crate) fn assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
) -> (CscMatrix<T>, KKTDataMap) {
    let mut map = KKTDataMap::new(P, A);
    let (m, n) = A.size();

    // entries actually on the diagonal of P
    let nnz_diagP = (0..n)
        .filter(|&col| {
            let (first, last) = (P.colptr[col], P.colptr[col + 1]);
            first != last && P.rowval[last - 1] == col
        })
        .count();

    let nnzKKT = P.nnz() +   // Number of elements in P
    n -                      // Number of elements in diagonal top left block
    nnz_diagP +              // remove double count on the diagonal if P has entries
    A.nnz() +                // Number of nonzeros in A
    m; // Number of elements in diagonal below Aᵀ

    let mut K = CscMatrix::<T>::spalloc(m + n, m + n, nnzKKT);

    _kkt_assemble_colcounts(&mut K, P, A);
    _kkt_assemble_fill(&mut K, P, A, &mut map);

    (K, map)
}

fn _kkt_assemble_colcounts<T: FloatT>(K: &mut CscMatrix<T>, P: &CscMatrix<T>, A: &CscMatrix<T>) {
    let (m, n) = A.size();

    // use K.colptr to hold nnz entries in each column
    K.colptr.fill(0);

    K.colcount_block(P, 0, MatrixShape::N);
    K.colcount_missing_diag(P, 0);
    K.colcount_block(A, n, MatrixShape::T);
    K.colcount_diag(n, m);
}

fn _kkt_assemble_fill<T: FloatT>(
    K: &mut CscMatrix<T>,
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    map: &mut KKTDataMap,
) {
    let (m, n) = A.size();

    // cumsum total entries to convert to K.colptr
    K.colcount_to_colptr();

    K.fill_block(P, &mut map.P, 0, 0, MatrixShape::N);
    K.fill_missing_diag(P, 0); // after adding P, since triu form

    // A in the top right, transposed
    K.fill_block(A, &mut map.A, 0, n, MatrixShape::T);
    K.fill_diag(&mut map.rhoinv, n, m);

    // backshift the colptrs to recover K.colptr again
    K.backshift_colptrs();

    // matrix is triu, so diagonal is last in each column
    map.diagP.copy_from_slice(&K.colptr[1..=n]);
    map.diagP.iter_mut().for_each(|x| *x -= 1);
}

#[test]
fn test_kkt_assembly() {
    let P = CscMatrix::from(&[
        [1., 2., 0.], //
        [0., 0., 5.], //
        [0., 0., 6.], //
    ]);
    let A = CscMatrix::from(&[
        [7., 0., 8.], //
        [0., 9., 10.],
    ]);

    let (mut K, map) = assemble_kkt_matrix(&P, &A);

    let K_true = CscMatrix::from(&[
        [1., 2., 0., 7., 0.],  //
        [0., 0., 5., 0., 9.],  //
        [0., 0., 6., 8., 10.], //
        [0., 0., 0., 0., 0.],  //
        [0., 0., 0., 0., 0.],  //
    ]);

    // structural zeros on the whole diagonal
    assert_eq!(K.nnz(), 11);
    assert!(K.is_triu());
    for col in 0..5 {
        assert_eq!(K.rowval[K.colptr[col + 1] - 1], col);
    }
    assert_eq!(map.diagP, vec![0, 2, 4]);
    assert_eq!(map.rhoinv, vec![7, 10]);

    // data maps point at the right places
    for (k, &idx) in map.P.iter().enumerate() {
        assert_eq!(K.nzval[idx], P.nzval[k]);
    }
    for (k, &idx) in map.A.iter().enumerate() {
        assert_eq!(K.nzval[idx], A.nzval[k]);
    }

    // equal to the dense version once explicit zeros are dropped
    let keep: Vec<bool> = K.nzval.iter().map(|&v| v != 0.).collect();
    let mut colptr = vec![0];
    let mut rowval = vec![];
    let mut nzval = vec![];
    for col in 0..5 {
        for k in K.colptr[col]..K.colptr[col + 1] {
            if keep[k] {
                rowval.push(K.rowval[k]);
                nzval.push(K.nzval[k]);
            }
        }
        colptr.push(rowval.len());
    }
    K = CscMatrix::new(5, 5, colptr, rowval, nzval);
    assert_eq!(K, K_true);
}
