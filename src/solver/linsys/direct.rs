#![allow(non_snake_case)]

use super::kkt_assembly::*;
use super::*;
use crate::qdldl::*;
use itertools::izip;

/// LDLᵀ based solver for the full KKT system.
///
/// In polishing mode the solution vector `[x; ν]` is returned as is,
/// rather than being converted to `[x̃; z̃]`.

pub struct DirectLinsys<T: FloatT> {
    // the factors, or None after release
    ldl: Option<QDLDLFactorisation<T>>,

    // unpermuted KKT matrix, holding the current values
    KKT: CscMatrix<T>,
    map: KKTDataMap,

    n: usize,
    m: usize,
    sigma: T,
    rho_inv_vec: Vec<T>,

    // copy of the constraint part of the rhs
    work: Vec<T>,

    polish: bool,
    matrix_updates_enable: bool,
}

impl<T> DirectLinsys<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        sigma: T,
        rho_vec: &[T],
        polish: bool,
        matrix_updates_enable: bool,
    ) -> Result<Self, LinsysError> {
        let (m, n) = A.size();
        assert_eq!(rho_vec.len(), m);

        let (mut KKT, map) = assemble_kkt_matrix(P, A);

        let mut rho_inv_vec = rho_vec.to_vec();
        rho_inv_vec.recip();

        for &idx in map.diagP.iter() {
            KKT.nzval[idx] += sigma;
        }
        for (&idx, &rhoinv) in map.rhoinv.iter().zip(rho_inv_vec.iter()) {
            KKT.nzval[idx] = -rhoinv;
        }

        let opts = QDLDLSettingsBuilder::default()
            .amd_dense_scale(1.5)
            .build()
            .unwrap();

        // quasidefinite with n positive pivots
        let ldl = QDLDLFactorisation::<T>::new(&KKT, Some(opts))?;
        if ldl.positive_inertia() != n {
            return Err(LinsysError::FactorizationFailure);
        }

        Ok(Self {
            ldl: Some(ldl),
            KKT,
            map,
            n,
            m,
            sigma,
            rho_inv_vec,
            work: vec![T::zero(); m],
            polish,
            matrix_updates_enable,
        })
    }

    // push the values at `indices` of the unpermuted KKT into the
    // factorization and factor again
    fn refactor_values(&mut self, indices: &[usize]) -> Result<(), LinsysError> {
        let ldl = self.ldl.as_mut().ok_or(LinsysError::Released)?;

        let values: Vec<T> = indices.iter().map(|&i| self.KKT.nzval[i]).collect();
        ldl.update_values(indices, &values);
        ldl.refactor()?;

        if ldl.positive_inertia() != self.n || !ldl.Dinv.is_finite() {
            return Err(LinsysError::FactorizationFailure);
        }
        Ok(())
    }
}

impl<T> LinearSystemSolverT<T> for DirectLinsys<T>
where
    T: FloatT,
{
    fn solve(&mut self, rhs: &mut [T]) -> Result<(), LinsysError> {
        let ldl = self.ldl.as_mut().ok_or(LinsysError::Released)?;
        assert_eq!(rhs.len(), self.n + self.m);

        if self.polish {
            ldl.solve(rhs);
            return Ok(());
        }

        self.work.copy_from(&rhs[self.n..]);
        ldl.solve(rhs);

        // z̃ = rhs_z + ν ⊙ 1/rho
        let (_, rhs_z) = rhs.split_at_mut(self.n);
        for (z, &w, &rhoinv) in izip!(rhs_z, &self.work, &self.rho_inv_vec) {
            *z = w + rhoinv * (*z);
        }
        Ok(())
    }

    fn update_matrices(&mut self, P: &CscMatrix<T>, A: &CscMatrix<T>) -> Result<(), LinsysError> {
        if !self.matrix_updates_enable {
            return Err(LinsysError::Unsupported);
        }
        if self.ldl.is_none() {
            return Err(LinsysError::Released);
        }
        assert_eq!(P.nnz(), self.map.P.len());
        assert_eq!(A.nnz(), self.map.A.len());

        let map = &self.map;
        let nzval = &mut self.KKT.nzval;

        // diagonal entries not present in P are structural zeros
        map.diagP.iter().for_each(|&idx| nzval[idx] = T::zero());
        for (&idx, &v) in map.P.iter().zip(P.nzval.iter()) {
            nzval[idx] = v;
        }
        map.diagP.iter().for_each(|&idx| nzval[idx] += self.sigma);
        for (&idx, &v) in map.A.iter().zip(A.nzval.iter()) {
            nzval[idx] = v;
        }

        let indices: Vec<usize> = map
            .P
            .iter()
            .chain(map.diagP.iter())
            .chain(map.A.iter())
            .copied()
            .collect();

        self.refactor_values(&indices)
    }

    fn update_rho_vec(&mut self, rho_vec: &[T]) -> Result<(), LinsysError> {
        assert_eq!(rho_vec.len(), self.m);

        self.rho_inv_vec.scalarop_from(T::recip, rho_vec);
        for (&idx, &rhoinv) in self.map.rhoinv.iter().zip(self.rho_inv_vec.iter()) {
            self.KKT.nzval[idx] = -rhoinv;
        }

        let indices = self.map.rhoinv.clone();
        self.refactor_values(&indices)
    }

    fn release(&mut self) {
        self.ldl = None;
    }

    fn name(&self) -> &'static str {
        "qdldl"
    }

    fn is_direct(&self) -> bool {
        true
    }
}

#[test]
fn test_polish_mode_raw_solution() {
    // [2+δ   1] [x]   [3]
    // [ 1   -δ] [ν] = [1]
    let P = CscMatrix::from(&[[2.0]]);
    let A = CscMatrix::from(&[[1.0]]);
    let delta: f64 = 1e-6;

    let mut linsys = DirectLinsys::new(&P, &A, delta, &[1.0 / delta], true, false).unwrap();

    let mut rhs: [f64; 2] = [3.0, 1.0];
    linsys.solve(&mut rhs).unwrap();

    let (x, nu) = (rhs[0], rhs[1]);
    assert!(((2.0 + delta) * x + nu - 3.0).abs() < 1e-10);
    assert!((x - delta * nu - 1.0).abs() < 1e-10);
}

#[test]
fn test_indefinite_P_rejected() {
    // P has a negative eigenvalue, so the KKT inertia is wrong
    let P = CscMatrix::from(&[[1.0, 0.0], [0.0, -1.0]]);
    let A = CscMatrix::from(&[[1.0, 1.0]]);
    assert!(matches!(
        DirectLinsys::new(&P, &A, 1e-6, &[0.1], false, true),
        Err(LinsysError::FactorizationFailure)
    ));
}
