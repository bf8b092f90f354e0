#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run, or data changed since).
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Solver terminated with a solution satisfying relaxed tolerances.
    SolvedInaccurate,
    /// Problem is primal infeasible.  A certificate is returned in `prim_inf_cert`.
    PrimalInfeasible,
    /// Problem is primal infeasible (relaxed tolerances).
    PrimalInfeasibleInaccurate,
    /// Problem is dual infeasible.  A certificate is returned in `dual_inf_cert`.
    DualInfeasible,
    /// Problem is dual infeasible (relaxed tolerances).
    DualInfeasibleInaccurate,
    /// Iteration limit reached before solution or infeasibility certificate found.
    MaxIterReached,
    /// Time limit reached before solution or infeasibility certificate found.
    TimeLimitReached,
    /// Solver terminated because a linear system could not be solved.
    Error,
}

impl SolverStatus {
    pub fn is_solved(&self) -> bool {
        matches!(*self, SolverStatus::Solved | SolverStatus::SolvedInaccurate)
    }

    pub fn is_primal_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::PrimalInfeasible | SolverStatus::PrimalInfeasibleInaccurate
        )
    }

    pub fn is_dual_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::DualInfeasible | SolverStatus::DualInfeasibleInaccurate
        )
    }

    pub fn is_infeasible(&self) -> bool {
        self.is_primal_infeasible() || self.is_dual_infeasible()
    }

    pub(crate) fn to_inaccurate(self) -> Self {
        match self {
            SolverStatus::Solved => SolverStatus::SolvedInaccurate,
            SolverStatus::PrimalInfeasible => SolverStatus::PrimalInfeasibleInaccurate,
            SolverStatus::DualInfeasible => SolverStatus::DualInfeasibleInaccurate,
            other => other,
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Default for SolverStatus {
    fn default() -> Self {
        SolverStatus::Unsolved
    }
}

/// Outcome of solution polishing

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PolishStatus {
    /// Polishing was not requested, or the solve did not reach `Solved`
    NotPerformed,
    /// The polished solution was accepted
    Successful,
    /// The polished solution was rejected or could not be computed
    Unsuccessful,
}

impl std::fmt::Display for PolishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Default for PolishStatus {
    fn default() -> Self {
        PolishStatus::NotPerformed
    }
}

#[test]
fn test_status_classification() {
    assert!(SolverStatus::SolvedInaccurate.is_solved());
    assert!(!SolverStatus::MaxIterReached.is_solved());
    assert!(SolverStatus::DualInfeasibleInaccurate.is_infeasible());
    assert!(SolverStatus::PrimalInfeasible.is_primal_infeasible());
    assert_eq!(
        SolverStatus::PrimalInfeasible.to_inaccurate(),
        SolverStatus::PrimalInfeasibleInaccurate
    );
    assert_eq!(SolverStatus::Error.to_inaccurate(), SolverStatus::Error);
    assert_eq!(SolverStatus::default().to_string(), "Unsolved");
    assert_eq!(PolishStatus::default(), PolishStatus::NotPerformed);
}
