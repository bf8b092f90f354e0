//! ADMM solver main module.
//!
//! The [`Solver`] type holds the scaled problem data, the ADMM iterates and
//! the linear system used at every iteration.  Problems are solved in the
//! form
//!
//! ```text
//! minimize    ½xᵀPx + qᵀx
//! subject to  l ≤ Ax ≤ u
//! ```
//!
//! The linear system backend is selected at setup through the
//! `linsys_solver` setting, see [`linsys`].

pub(crate) const _INFINITY_DEFAULT: f64 = 1e30;

// internal module structure
mod data_updating;
mod equilibration;
mod info;
mod info_print;
#[cfg(feature = "serde")]
mod json;
pub mod linsys;
mod polish;
mod problemdata;
mod rho;
mod settings;
mod solution;
#[allow(clippy::module_inception)]
mod solver;
mod status;
mod termination;
pub(crate) mod utils;
mod workspace;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

pub use crate::solver::utils::infbounds::*;

pub use data_updating::*;
pub use equilibration::Equilibration;
pub use info::*;
pub use linsys::{
    DirectLinsys, IndirectLinsys, LinearSystemSolver, LinearSystemSolverT, LinsysError,
};
pub use polish::Polish;
pub use problemdata::ProblemData;
pub use rho::ConstraintType;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use status::*;
pub use workspace::Workspace;
