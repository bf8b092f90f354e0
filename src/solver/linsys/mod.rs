//! Linear system solvers for the ADMM subproblem.
//!
//! Each iteration solves the quasidefinite system
//!
//! ```text
//! [ P + σI      Aᵀ         ] [x̃]   [σx_prev - q         ]
//! [ A      -diag(1/rho)    ] [ν ] = [z_prev - y ⊙ 1/rho  ]
//! ```
//!
//! either by a sparse LDLᵀ factorization ([`DirectLinsys`]) or by
//! preconditioned conjugate gradients on the reduced system
//! ([`IndirectLinsys`]).   On return the right hand side is overwritten
//! with `[x̃; z̃]`, where `z̃ = Ax̃`.

#![allow(non_snake_case)]

use crate::algebra::*;
use crate::qdldl::QDLDLError;
use enum_dispatch::*;
use thiserror::Error;

mod direct;
mod indirect;
mod kkt_assembly;
pub use direct::*;
pub use indirect::*;

/// Error type returned by the linear system solvers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinsysError {
    /// The KKT matrix could not be factored, or had the wrong inertia
    #[error("KKT matrix factorization failed")]
    FactorizationFailure,
    /// The requested operation is not available with this configuration
    #[error("operation not supported by this linear system solver")]
    Unsupported,
    /// Iterative solver did not reach its tolerance
    #[error("iterative linear solver did not converge")]
    NotConverged,
    /// Solver storage was released
    #[error("linear system solver has been released")]
    Released,
    /// Error reported by the LDL factorization
    #[error("LDL factorization error: {0}")]
    Ldl(QDLDLError),
}

impl From<QDLDLError> for LinsysError {
    fn from(e: QDLDLError) -> Self {
        match e {
            QDLDLError::ZeroPivot => LinsysError::FactorizationFailure,
            e => LinsysError::Ldl(e),
        }
    }
}

/// Common interface of the ADMM linear system solvers
#[enum_dispatch]
pub trait LinearSystemSolverT<T: FloatT> {
    /// solve in place.  `rhs` has length n+m.
    fn solve(&mut self, rhs: &mut [T]) -> Result<(), LinsysError>;

    /// new values for P and A, with unchanged sparsity
    fn update_matrices(&mut self, P: &CscMatrix<T>, A: &CscMatrix<T>) -> Result<(), LinsysError>;

    /// new penalty parameters, one per constraint
    fn update_rho_vec(&mut self, rho_vec: &[T]) -> Result<(), LinsysError>;

    /// drop factorization and work storage
    fn release(&mut self);

    fn nthreads(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str;

    fn is_direct(&self) -> bool;
}

/// Linear system solver selected by the `linsys_solver` setting
#[enum_dispatch(LinearSystemSolverT<T>)]
pub enum LinearSystemSolver<T: FloatT> {
    DirectLinsys(DirectLinsys<T>),
    IndirectLinsys(IndirectLinsys<T>),
}

impl<T> LinearSystemSolver<T>
where
    T: FloatT,
{
    /// Solver for the ADMM system of the (scaled) problem data.
    pub fn new(
        name: &str,
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        sigma: T,
        rho_vec: &[T],
        matrix_updates_enable: bool,
        cg_max_iter: u32,
        cg_tol: T,
    ) -> Result<Self, LinsysError> {
        match name {
            "qdldl" => {
                let linsys = DirectLinsys::new(P, A, sigma, rho_vec, false, matrix_updates_enable)?;
                Ok(linsys.into())
            }
            "pcg" => {
                let linsys = IndirectLinsys::new(P, A, sigma, rho_vec, cg_max_iter, cg_tol);
                Ok(linsys.into())
            }
            _ => Err(LinsysError::Unsupported),
        }
    }
}
