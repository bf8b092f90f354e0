#![allow(non_snake_case)]
use super::ProblemData;
use crate::algebra::*;

// scaling factors are limited to this range, with values
// below the lower limit treated as structurally zero
pub(crate) const MIN_SCALING: f64 = 1e-4;
pub(crate) const MAX_SCALING: f64 = 1e4;

// ---------------
// equilibration data
// ---------------

/// Data from the Ruiz equilibration procedure
///
/// The scaled problem has data `P̄ = c·DPD`, `q̄ = c·Dq`, `Ā = EAD`,
/// `l̄ = El` and `ū = Eu`, with `D` and `E` diagonal.

#[derive(Debug, Clone)]
pub struct Equilibration<T> {
    /// Vector of variable scaling terms
    pub d: Vec<T>,
    /// Vector of inverse variable scaling terms
    pub dinv: Vec<T>,
    /// Vector of constraint scaling terms
    pub e: Vec<T>,
    /// Vector of inverse constraint scaling terms
    pub einv: Vec<T>,
    /// overall scaling for objective function
    pub c: T,
    /// inverse of the objective scaling
    pub cinv: T,
}

impl<T> Equilibration<T>
where
    T: FloatT,
{
    /// creates an identity scaling
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
            cinv: T::one(),
        }
    }

    fn reset(&mut self) {
        self.d.set(T::one());
        self.dinv.set(T::one());
        self.e.set(T::one());
        self.einv.set(T::one());
        self.c = T::one();
        self.cinv = T::one();
    }
}

impl<T> ProblemData<T>
where
    T: FloatT,
{
    /// Ruiz equilibration of unscaled data, for `rounds` iterations.
    /// No scaling is applied when `rounds == 0`.
    pub(crate) fn scale(&mut self, rounds: u32) {
        let data = self;
        let equil = &mut data.equilibration;
        equil.reset();

        if rounds == 0 {
            return;
        }

        // references to scaling matrices
        let (d, e) = (&mut equil.d, &mut equil.e);

        // use the inverse scalings as work vectors
        let dwork = &mut equil.dinv;
        let ework = &mut equil.einv;

        let (P, A, q) = (&mut data.P, &mut data.A, &mut data.q);

        for _ in 0..rounds {
            kkt_col_norms(P, A, dwork, ework);

            dwork.scalarop(limit_scaling);
            ework.scalarop(limit_scaling);

            dwork.rsqrt();
            ework.rsqrt();

            // P = DPD, A = EAD, q = Dq
            P.lrscale(dwork, dwork);
            A.lrscale(ework, dwork);
            q.hadamard(dwork);

            d.hadamard(dwork);
            e.hadamard(ework);

            // cost scaling from the mean column norm of the new P
            P.col_norms_sym(dwork);
            let mean_col_norm_P = dwork.mean();
            let inf_norm_q = limit_scaling(q.norm_inf());

            let scale_cost = limit_scaling(T::max(mean_col_norm_P, inf_norm_q));
            let ctmp = T::recip(scale_cost);

            P.scale(ctmp);
            q.scale(ctmp);
            equil.c *= ctmp;
        }

        data.l.hadamard(e);
        data.u.hadamard(e);

        equil.dinv.scalarop_from(T::recip, d);
        equil.einv.scalarop_from(T::recip, e);
        equil.cinv = T::recip(equil.c);
    }

    /// Restores the unscaled data and resets to an identity scaling
    pub(crate) fn unscale(&mut self) {
        let equil = &mut self.equilibration;

        self.P.lrscale(&equil.dinv, &equil.dinv);
        self.P.scale(equil.cinv);
        self.A.lrscale(&equil.einv, &equil.dinv);
        self.q.hadamard(&equil.dinv).scale(equil.cinv);
        self.l.hadamard(&equil.einv);
        self.u.hadamard(&equil.einv);

        equil.reset();
    }
}

// ---------------
// utilities
// ---------------

fn kkt_col_norms<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    norm_LHS: &mut [T],
    norm_RHS: &mut [T],
) {
    P.col_norms_sym(norm_LHS); // P is triu
    A.col_norms_no_reset(norm_LHS); // incrementally from P norms
    A.row_norms(norm_RHS); // same as column norms of A'
}

fn limit_scaling<T: FloatT>(s: T) -> T {
    let (minval, maxval) = (MIN_SCALING.as_T(), MAX_SCALING.as_T());
    s.clip(minval, maxval, T::one(), maxval)
}

#[cfg(test)]
fn test_data() -> ProblemData<f64> {
    let P = CscMatrix::from(&[[40., 1., 0.], [0., 2e-3, 0.], [0., 0., 0.]]);
    let A = CscMatrix::from(&[[1., 300., 0.], [0., 1., 1e-2], [5., 0., 0.]]);
    let q = [1., -20., 0.5];
    let l = [-1., 0., -1e30];
    let u = [1., 10., 3.];
    ProblemData::new(&P, &q, &A, &l, &u)
}

#[test]
fn test_scaling_round_trip() {
    let mut data = test_data();
    let orig = test_data();

    data.scale(10);

    let equil = &data.equilibration;
    assert!(equil.c != 1.0);
    for (d, dinv) in std::iter::zip(&equil.d, &equil.dinv) {
        assert!((d * dinv - 1.0).abs() < 1e-14);
    }
    for (e, einv) in std::iter::zip(&equil.e, &equil.einv) {
        assert!((e * einv - 1.0).abs() < 1e-14);
    }
    assert!((equil.c * equil.cinv - 1.0).abs() < 1e-14);

    data.unscale();

    let tol = 1e-10;
    assert!(data.P.nzval.norm_inf_diff(&orig.P.nzval) < tol * 40.);
    assert!(data.A.nzval.norm_inf_diff(&orig.A.nzval) < tol * 300.);
    assert!(data.q.norm_inf_diff(&orig.q) < tol * 20.);
    assert!(data.l[0..2].norm_inf_diff(&orig.l[0..2]) < tol);
    assert!(data.u.norm_inf_diff(&orig.u) < tol * 10.);
    assert!(((data.l[2] - orig.l[2]) / orig.l[2]).abs() < tol);
    assert_eq!(data.equilibration.c, 1.0);
    assert_eq!(data.equilibration.d, vec![1.0; 3]);
}

#[test]
fn test_scaling_disabled() {
    let mut data = test_data();
    let orig = test_data();
    data.scale(0);
    assert_eq!(data.P, orig.P);
    assert_eq!(data.A, orig.A);
    assert_eq!(data.q, orig.q);
    assert_eq!(data.equilibration.e, vec![1.0; 3]);
}

#[test]
fn test_scaling_empty_rows_and_columns() {
    // zero column in P and A, zero row in A
    let P = CscMatrix::from(&[[1., 0.], [0., 0.]]);
    let A = CscMatrix::from(&[[2., 0.], [0., 0.]]);
    let mut data = ProblemData::new(&P, &[0., 0.], &A, &[0., 0.], &[1., 1.]);
    data.scale(5);
    assert_eq!(data.equilibration.d[1], 1.0);
    assert_eq!(data.equilibration.e[1], 1.0);
    assert!(data.equilibration.d.is_finite());
}
