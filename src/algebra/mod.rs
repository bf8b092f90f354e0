//! Sparse linear algebra used by the solver.
//!
//! Vector operations are implemented directly on slices `[T]` via the
//! [`VectorMath`] trait.  Matrices are stored in compressed sparse column
//! format ([`CscMatrix`]), with symmetric matrices holding only their upper
//! triangle.

mod error_types;
mod floats;
mod math_traits;
mod matrix_types;
mod scalarmath;
mod vecmath;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_types::*;

mod csc;
pub use csc::*;
