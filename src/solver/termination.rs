use super::equilibration::MIN_SCALING;
use super::*;
use crate::algebra::*;
use itertools::izip;

// quantities below this are treated as zero when normalizing
const DIVISION_TOL: f64 = 1e-20;

// relaxation of all tolerances for the approximate check at exit
const APPROXIMATE_TOL_FACTOR: f64 = 10.;

fn vec_norm<T: FloatT>(v: &[T], norm: NormType) -> T {
    match norm {
        NormType::Inf => v.norm_inf(),
        NormType::Two => v.norm(),
    }
}

fn vec_norm_scaled<T: FloatT>(v: &[T], s: &[T], norm: NormType) -> T {
    match norm {
        NormType::Inf => v.norm_inf_scaled(s),
        NormType::Two => v.norm_scaled(s),
    }
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Objective value of the unscaled problem
    pub(crate) fn compute_obj_val(&self) -> T {
        let half: T = (0.5).as_T();
        let obj = half * self.x.dot(&self.Px) + self.data.q.dot(&self.x);
        obj * self.data.equilibration.cinv
    }

    /// primal residual ‖Ax - z‖.  Uses z_prev as work.
    pub(crate) fn compute_pri_res(&mut self, settings: &DefaultSettings<T>) -> T {
        let norm = settings.termination_norm;
        self.z_prev.waxpby(T::one(), &self.Ax, -T::one(), &self.z);

        if settings.scaled_termination {
            vec_norm(&self.z_prev, norm)
        } else {
            vec_norm_scaled(&self.z_prev, &self.data.equilibration.einv, norm)
        }
    }

    pub(crate) fn compute_pri_tol(
        &self,
        eps_abs: T,
        eps_rel: T,
        settings: &DefaultSettings<T>,
    ) -> T {
        let norm = settings.termination_norm;

        let (normAx, normz) = if settings.scaled_termination {
            (vec_norm(&self.Ax, norm), vec_norm(&self.z, norm))
        } else {
            let einv = &self.data.equilibration.einv;
            (
                vec_norm_scaled(&self.Ax, einv, norm),
                vec_norm_scaled(&self.z, einv, norm),
            )
        };
        eps_abs + eps_rel * T::max(normAx, normz)
    }

    /// dual residual ‖Px + q + Aᵀy‖.  Uses x_prev as work.
    pub(crate) fn compute_dua_res(&mut self, settings: &DefaultSettings<T>) -> T {
        let norm = settings.termination_norm;
        self.x_prev
            .waxpby(T::one(), &self.Px, T::one(), &self.data.q)
            .axpby(T::one(), &self.Aty, T::one());

        if settings.scaled_termination {
            vec_norm(&self.x_prev, norm)
        } else {
            let equil = &self.data.equilibration;
            equil.cinv * vec_norm_scaled(&self.x_prev, &equil.dinv, norm)
        }
    }

    pub(crate) fn compute_dua_tol(
        &self,
        eps_abs: T,
        eps_rel: T,
        settings: &DefaultSettings<T>,
    ) -> T {
        let norm = settings.termination_norm;
        let q = &self.data.q;

        let maxnorm = if settings.scaled_termination {
            T::max(
                T::max(vec_norm(&self.Px, norm), vec_norm(&self.Aty, norm)),
                vec_norm(q, norm),
            )
        } else {
            let equil = &self.data.equilibration;
            let dinv = &equil.dinv;
            let maxnorm = T::max(
                T::max(
                    vec_norm_scaled(&self.Px, dinv, norm),
                    vec_norm_scaled(&self.Aty, dinv, norm),
                ),
                vec_norm_scaled(q, dinv, norm),
            );
            equil.cinv * maxnorm
        };
        eps_abs + eps_rel * maxnorm
    }

    /// Test of delta_y as a certificate of primal infeasibility.
    ///
    /// delta_y is first projected onto the polar of the recession cone
    /// of [l,u], and is modified in place.
    pub(crate) fn is_primal_infeasible(&mut self, eps: T, settings: &DefaultSettings<T>) -> bool {
        let data = &self.data;
        let equil = &data.equilibration;
        let infbound: T = (get_infinity() * MIN_SCALING).as_T();

        for (dy, &l, &u) in izip!(&mut self.delta_y, &data.l, &data.u) {
            let (l_inf, u_inf) = (l < -infbound, u > infbound);
            if l_inf && u_inf {
                *dy = T::zero();
            } else if u_inf {
                *dy = T::min(*dy, T::zero());
            } else if l_inf {
                *dy = T::max(*dy, T::zero());
            }
        }

        // ∞-norm of the unscaled delta_y, up to the factor c
        let norm_delta_y = if settings.scaled_termination {
            self.delta_y.norm_inf()
        } else {
            self.delta_y.norm_inf_scaled(&equil.e)
        };

        if norm_delta_y <= DIVISION_TOL.as_T() {
            return false;
        }

        // uᵀmax(δy,0) + lᵀmin(δy,0)
        let ineq_lhs = izip!(&self.delta_y, &data.l, &data.u)
            .fold(T::zero(), |acc, (&dy, &l, &u)| {
                acc + u * T::max(dy, T::zero()) + l * T::min(dy, T::zero())
            });

        if ineq_lhs >= -eps * norm_delta_y {
            return false;
        }

        data.A
            .t()
            .gemv(&mut self.Atdelta_y, &self.delta_y, T::one(), T::zero());

        let norm_Atdelta_y = if settings.scaled_termination {
            self.Atdelta_y.norm_inf()
        } else {
            self.Atdelta_y.norm_inf_scaled(&equil.dinv)
        };

        norm_Atdelta_y < eps * norm_delta_y
    }

    /// Test of delta_x as a certificate of dual infeasibility
    pub(crate) fn is_dual_infeasible(&mut self, eps: T, settings: &DefaultSettings<T>) -> bool {
        let data = &self.data;
        let equil = &data.equilibration;
        let infbound: T = (get_infinity() * MIN_SCALING).as_T();

        // ∞-norm of the unscaled delta_x, and the cost scaling
        let (norm_delta_x, cost_scaling) = if settings.scaled_termination {
            (self.delta_x.norm_inf(), T::one())
        } else {
            (self.delta_x.norm_inf_scaled(&equil.d), equil.c)
        };

        if norm_delta_x <= DIVISION_TOL.as_T() {
            return false;
        }

        let tol = cost_scaling * eps * norm_delta_x;

        // qᵀδx < 0
        if data.q.dot(&self.delta_x) >= -tol {
            return false;
        }

        // Pδx ≈ 0
        data.P
            .sym()
            .symv(&mut self.Pdelta_x, &self.delta_x, T::one(), T::zero());

        let norm_Pdelta_x = if settings.scaled_termination {
            self.Pdelta_x.norm_inf()
        } else {
            self.Pdelta_x.norm_inf_scaled(&equil.dinv)
        };
        if norm_Pdelta_x >= tol {
            return false;
        }

        // Aδx in the recession cone of [l,u]
        data.A
            .gemv(&mut self.Adelta_x, &self.delta_x, T::one(), T::zero());
        if !settings.scaled_termination {
            self.Adelta_x.hadamard(&equil.einv);
        }

        let tol = eps * norm_delta_x;
        izip!(&self.Adelta_x, &data.l, &data.u).all(|(&adx, &l, &u)| {
            (u > infbound || adx <= tol) && (l < -infbound || adx >= -tol)
        })
    }

    /// Convergence and infeasibility tests, given the residuals of the
    /// current iterate.  The approximate test relaxes all tolerances.
    pub(crate) fn check_termination(
        &mut self,
        pri_res: T,
        dua_res: T,
        settings: &DefaultSettings<T>,
        approximate: bool,
    ) -> Option<SolverStatus> {
        let factor: T = if approximate {
            APPROXIMATE_TOL_FACTOR.as_T()
        } else {
            T::one()
        };
        let eps_abs = settings.eps_abs * factor;
        let eps_rel = settings.eps_rel * factor;
        let eps_prim_inf = settings.eps_prim_inf * factor;
        let eps_dual_inf = settings.eps_dual_inf * factor;

        // no constraints means no primal residual
        let prim_res_ok =
            self.data.m == 0 || pri_res <= self.compute_pri_tol(eps_abs, eps_rel, settings);
        let dual_res_ok = dua_res <= self.compute_dua_tol(eps_abs, eps_rel, settings);

        if prim_res_ok && dual_res_ok {
            Some(SolverStatus::Solved)
        } else if !prim_res_ok && self.is_primal_infeasible(eps_prim_inf, settings) {
            Some(SolverStatus::PrimalInfeasible)
        } else if !dual_res_ok && self.is_dual_infeasible(eps_dual_inf, settings) {
            Some(SolverStatus::DualInfeasible)
        } else {
            None
        }
    }
}
