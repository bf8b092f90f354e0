use super::*;
use crate::algebra::*;

/// Solution of the most recent solve, in the original (unscaled) space
#[derive(Debug, Clone)]
pub struct Solution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// constraint multipliers
    pub y: Vec<T>,
    /// normalized certificate of primal infeasibility, when detected
    pub prim_inf_cert: Option<Vec<T>>,
    /// normalized certificate of dual infeasibility, when detected
    pub dual_inf_cert: Option<Vec<T>>,
    /// final solver status
    pub status: SolverStatus,
    /// objective value
    pub obj_val: T,
    /// number of iterations
    pub iterations: u32,
    /// primal residual
    pub pri_res: T,
    /// dual residual
    pub dua_res: T,
    /// solve time in seconds
    pub solve_time: f64,
}

impl<T> Solution<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            prim_inf_cert: None,
            dual_inf_cert: None,
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            iterations: 0,
            pri_res: T::nan(),
            dua_res: T::nan(),
            solve_time: 0f64,
        }
    }

    /// Unscale the final iterate into the solution.  For infeasible
    /// or failed solves x and y are NaN, and the objective is +∞ for
    /// primal infeasibility and -∞ for dual infeasibility.
    pub(crate) fn finalize(&mut self, workspace: &Workspace<T>, info: &Info<T>) {
        let equil = &workspace.data.equilibration;

        self.status = info.status;
        self.iterations = info.iterations;
        self.pri_res = info.pri_res;
        self.dua_res = info.dua_res;
        self.solve_time = info.run_time;
        self.prim_inf_cert = None;
        self.dual_inf_cert = None;

        match info.status {
            s if s.is_primal_infeasible() => {
                let mut cert = workspace.delta_y.clone();
                cert.hadamard(&equil.e);
                normalize(&mut cert);
                self.prim_inf_cert = Some(cert);
                self.obj_val = T::infinity();
            }
            s if s.is_dual_infeasible() => {
                let mut cert = workspace.delta_x.clone();
                cert.hadamard(&equil.d);
                normalize(&mut cert);
                self.dual_inf_cert = Some(cert);
                self.obj_val = -T::infinity();
            }
            SolverStatus::Error | SolverStatus::Unsolved => {
                self.obj_val = T::nan();
            }
            _ => {
                self.obj_val = info.obj_val;
            }
        }

        let has_iterate = !info.status.is_infeasible()
            && !matches!(info.status, SolverStatus::Error | SolverStatus::Unsolved);

        if has_iterate {
            self.x.copy_from(&workspace.x);
            self.x.hadamard(&equil.d);
            self.y.copy_from(&workspace.y);
            self.y.hadamard(&equil.e).scale(equil.cinv);
        } else {
            self.x.set(T::nan());
            self.y.set(T::nan());
        }
    }
}

// scale to unit ∞-norm
fn normalize<T: FloatT>(v: &mut [T]) {
    let nrm = v.norm_inf();
    if nrm > T::zero() {
        v.scale(T::recip(nrm));
    }
}
