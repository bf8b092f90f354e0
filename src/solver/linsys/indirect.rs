#![allow(non_snake_case)]

use super::*;
use itertools::izip;

// work vectors for the conjugate gradient iteration
struct PCGWorkspace<T> {
    // solution, kept between calls for warm starting
    x: Vec<T>,
    b: Vec<T>,
    r: Vec<T>,
    y: Vec<T>,
    p: Vec<T>,
    Kp: Vec<T>,
    // length m
    mwork: Vec<T>,
    // inverse of the Jacobi preconditioner
    precond_inv: Vec<T>,
}

impl<T: FloatT> PCGWorkspace<T> {
    fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            b: vec![T::zero(); n],
            r: vec![T::zero(); n],
            y: vec![T::zero(); n],
            p: vec![T::zero(); n],
            Kp: vec![T::zero(); n],
            mwork: vec![T::zero(); m],
            precond_inv: vec![T::zero(); n],
        }
    }
}

/// Preconditioned conjugate gradient solver for the reduced system
///
/// ```text
/// (P + σI + Aᵀ diag(rho) A) x̃ = rhs_x + Aᵀ (rho ⊙ rhs_z)
/// ```
///
/// with `z̃ = Ax̃`.  Uses a diagonal (Jacobi) preconditioner and starts
/// from the solution of the previous call.

pub struct IndirectLinsys<T: FloatT> {
    P: CscMatrix<T>,
    A: CscMatrix<T>,
    sigma: T,
    rho_vec: Vec<T>,
    max_iter: u32,
    tol: T,
    work: Option<PCGWorkspace<T>>,
}

impl<T> IndirectLinsys<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        sigma: T,
        rho_vec: &[T],
        max_iter: u32,
        tol: T,
    ) -> Self {
        let (m, n) = A.size();
        assert_eq!(rho_vec.len(), m);

        let mut linsys = Self {
            P: P.clone(),
            A: A.clone(),
            sigma,
            rho_vec: rho_vec.to_vec(),
            max_iter,
            tol,
            work: Some(PCGWorkspace::new(n, m)),
        };
        linsys.update_preconditioner();
        linsys
    }

    // diag(P) + σ + Σᵢ rhoᵢ Aᵢⱼ²
    fn update_preconditioner(&mut self) {
        let Some(work) = self.work.as_mut() else {
            return;
        };
        let (P, A) = (&self.P, &self.A);
        let d = &mut work.precond_inv;

        d.set(self.sigma);
        for col in 0..P.n {
            for k in P.colptr[col]..P.colptr[col + 1] {
                if P.rowval[k] == col {
                    d[col] += P.nzval[k];
                }
            }
        }
        for col in 0..A.n {
            for k in A.colptr[col]..A.colptr[col + 1] {
                let v = A.nzval[k];
                d[col] += self.rho_vec[A.rowval[k]] * v * v;
            }
        }
        d.recip();
    }
}

// y = (P + σI + Aᵀ diag(rho) A) x
fn reduced_kkt_mul<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    sigma: T,
    rho_vec: &[T],
    y: &mut [T],
    x: &[T],
    mwork: &mut [T],
) {
    P.sym().symv(y, x, T::one(), T::zero());
    y.axpby(sigma, x, T::one());
    A.gemv(mwork, x, T::one(), T::zero());
    mwork.hadamard(rho_vec);
    A.t().gemv(y, mwork, T::one(), T::one());
}

impl<T> LinearSystemSolverT<T> for IndirectLinsys<T>
where
    T: FloatT,
{
    fn solve(&mut self, rhs: &mut [T]) -> Result<(), LinsysError> {
        let work = self.work.as_mut().ok_or(LinsysError::Released)?;
        let (P, A, sigma, rho_vec) = (&self.P, &self.A, self.sigma, &self.rho_vec);
        let n = P.n;
        assert_eq!(rhs.len(), n + A.m);

        let (rhs_x, rhs_z) = rhs.split_at_mut(n);

        // b = rhs_x + Aᵀ(rho ⊙ rhs_z)
        work.b.copy_from(rhs_x);
        work.mwork.copy_from(rhs_z);
        work.mwork.hadamard(rho_vec);
        A.t().gemv(&mut work.b, &work.mwork, T::one(), T::one());

        let tol = self.tol * T::max(work.b.norm(), T::one());

        // r = b - Kx from the warm start
        reduced_kkt_mul(P, A, sigma, rho_vec, &mut work.r, &work.x, &mut work.mwork);
        work.r.axpby(T::one(), &work.b, -T::one());

        let mut converged = work.r.norm() <= tol;

        if !converged {
            for (y, &r, &d) in izip!(&mut work.y, &work.r, &work.precond_inv) {
                *y = d * r;
            }
            work.p.copy_from(&work.y);
            let mut ry = work.r.dot(&work.y);

            for _ in 0..self.max_iter {
                reduced_kkt_mul(P, A, sigma, rho_vec, &mut work.Kp, &work.p, &mut work.mwork);

                let pKp = work.p.dot(&work.Kp);
                if pKp <= T::zero() {
                    break;
                }
                let alpha = ry / pKp;
                work.x.axpby(alpha, &work.p, T::one());
                work.r.axpby(-alpha, &work.Kp, T::one());

                if work.r.norm() <= tol {
                    converged = true;
                    break;
                }

                for (y, &r, &d) in izip!(&mut work.y, &work.r, &work.precond_inv) {
                    *y = d * r;
                }
                let ry_new = work.r.dot(&work.y);
                let beta = ry_new / ry;
                ry = ry_new;
                work.p.axpby(T::one(), &work.y, beta);
            }
        }

        if !converged {
            return Err(LinsysError::NotConverged);
        }

        rhs_x.copy_from(&work.x);
        A.gemv(rhs_z, &work.x, T::one(), T::zero());
        Ok(())
    }

    fn update_matrices(&mut self, P: &CscMatrix<T>, A: &CscMatrix<T>) -> Result<(), LinsysError> {
        if self.work.is_none() {
            return Err(LinsysError::Released);
        }
        self.P.nzval.copy_from(&P.nzval);
        self.A.nzval.copy_from(&A.nzval);
        self.update_preconditioner();
        Ok(())
    }

    fn update_rho_vec(&mut self, rho_vec: &[T]) -> Result<(), LinsysError> {
        if self.work.is_none() {
            return Err(LinsysError::Released);
        }
        self.rho_vec.copy_from(rho_vec);
        self.update_preconditioner();
        Ok(())
    }

    fn release(&mut self) {
        self.work = None;
    }

    fn name(&self) -> &'static str {
        "pcg"
    }

    fn is_direct(&self) -> bool {
        false
    }
}

#[test]
fn test_pcg_warm_start_and_limit() {
    let P = CscMatrix::from(&[[2.0, 0.5], [0.0, 1.0]]);
    let A = CscMatrix::from(&[[1.0, 1.0]]);

    // a single iteration is not enough from a cold start
    let mut linsys = IndirectLinsys::new(&P, &A, 1e-6, &[1.0], 1, 1e-12);
    let mut rhs: [f64; 3] = [1.0, 2.0, 0.5];
    assert_eq!(linsys.solve(&mut rhs), Err(LinsysError::NotConverged));

    // converges with more iterations, and a repeated solve is
    // already converged at the warm start
    let mut linsys = IndirectLinsys::new(&P, &A, 1e-6, &[1.0], 50, 1e-12);
    let mut rhs1: [f64; 3] = [1.0, 2.0, 0.5];
    linsys.solve(&mut rhs1).unwrap();

    linsys.max_iter = 0;
    let mut rhs2: [f64; 3] = [1.0, 2.0, 0.5];
    linsys.solve(&mut rhs2).unwrap();
    assert_eq!(rhs1, rhs2);
    assert!((rhs1[0] + rhs1[1] - rhs1[2]).abs() < 1e-12);
}
