//! Sparse $LDL^T$ factorization of quasidefinite matrices.
//!
//! Used by the direct linear system solver for factoring the
//! regularized KKT system, and by solution polishing.

#![allow(non_snake_case)]
mod qdldl;
pub use qdldl::*;
