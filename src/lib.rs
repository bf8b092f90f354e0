//! __splitqp__ is a Rust implementation of an operator splitting (ADMM)
//! solver for convex quadratic programs.  It solves problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
//!  \text{subject to} & l \le Ax \le u
//!  \end{array}
//! $$
//!
//! with decision variable $x \in \mathbb{R}^n$ and data
//! $P=P^\top \succeq 0$ (upper triangle only),
//! $q \in \mathbb{R}^n$,
//! $A \in \mathbb{R}^{m \times n}$ and
//! $l, u \in (\mathbb{R} \cup \\{\pm\infty\\})^m$.
//!
//! ## Features
//!
//! * __Factor once__: the KKT matrix is factored at setup and reused at every
//!   iteration.  Only a numerical refactorization is needed when the penalty
//!   parameter changes.
//!
//! * __Infeasibility detection__: primal and dual infeasibility are detected
//!   from the iterate differences, and returned with a certificate.
//!
//! * __Warm starting and data updates__: vectors, bounds and matrix values can
//!   be changed between solves without repeating the symbolic analysis.
//!
//! * __Solution polishing__: an optional refinement step that recovers a high
//!   accuracy solution from a guess of the active constraints.
//!
//! ## Example
//!
//! ```
//! use splitqp::algebra::*;
//! use splitqp::solver::*;
//!
//! let P = CscMatrix::from(&[[4., 1.], [0., 2.]]);
//! let q = [1., 1.];
//! let A = CscMatrix::from(&[[1., 1.], [1., 0.], [0., 1.]]);
//! let l = [1., 0., 0.];
//! let u = [1., 0.7, 0.7];
//!
//! let settings = DefaultSettingsBuilder::default()
//!     .verbose(false)
//!     .build()
//!     .unwrap();
//!
//! let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
//! solver.solve();
//! assert_eq!(solver.solution.status, SolverStatus::Solved);
//! ```

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod qdldl;
pub mod solver;
pub mod timers;
