use super::equilibration::MIN_SCALING;
use super::*;
use crate::algebra::*;
use itertools::izip;

pub(crate) const RHO_MIN: f64 = 1e-6;
pub(crate) const RHO_MAX: f64 = 1e6;
// rho multiplier for equality constraints
pub(crate) const RHO_EQ_OVER_RHO_INEQ: f64 = 1e3;
// bounds closer than this are treated as an equality
pub(crate) const RHO_TOL: f64 = 1e-4;
// guards the ratios in the rho estimate
const RHO_ESTIMATE_TOL: f64 = 1e-10;

/// Classification of a constraint row by its bounds
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum ConstraintType {
    /// both bounds infinite
    Loose,
    /// `u - l` below tolerance
    Equality,
    Inequality,
}

// classify constraints from the (scaled) bounds.  Returns true
// if any classification changed.
pub(crate) fn classify_constraints<T: FloatT>(
    constr_type: &mut [ConstraintType],
    l: &[T],
    u: &[T],
) -> bool {
    let infbound: T = (get_infinity() * MIN_SCALING).as_T();
    let rho_tol: T = RHO_TOL.as_T();

    let mut changed = false;
    for (ctype, &l, &u) in izip!(constr_type, l, u) {
        let new_type = if l < -infbound && u > infbound {
            ConstraintType::Loose
        } else if u - l < rho_tol {
            ConstraintType::Equality
        } else {
            ConstraintType::Inequality
        };
        changed |= *ctype != new_type;
        *ctype = new_type;
    }
    changed
}

// penalty for each constraint from the scalar rho
pub(crate) fn fill_rho_vec<T: FloatT>(
    rho_vec: &mut [T],
    rho_inv_vec: &mut [T],
    constr_type: &[ConstraintType],
    rho: T,
) {
    let (rho_min, rho_max): (T, T) = (RHO_MIN.as_T(), RHO_MAX.as_T());
    let rho_eq = rho * RHO_EQ_OVER_RHO_INEQ.as_T();

    for (r, ctype) in std::iter::zip(&mut *rho_vec, constr_type) {
        let rho = match ctype {
            ConstraintType::Loose => rho_min,
            ConstraintType::Equality => rho_eq,
            ConstraintType::Inequality => rho,
        };
        *r = rho.clamp_to(rho_min, rho_max);
    }
    rho_inv_vec.scalarop_from(T::recip, rho_vec);
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    pub(crate) fn set_rho_vec(&mut self) {
        fill_rho_vec(
            &mut self.rho_vec,
            &mut self.rho_inv_vec,
            &self.constr_type,
            self.rho,
        );
    }

    /// Reclassify after a change of the bounds, and update the linear
    /// system if any penalty changed.  On failure the previous penalties
    /// are restored.
    pub(crate) fn update_constraint_types(&mut self) -> Result<(), LinsysError> {
        let constr_old = self.constr_type.clone();
        if classify_constraints(&mut self.constr_type, &self.data.l, &self.data.u) {
            self.set_rho_vec();
            if let Err(e) = self.linsys.update_rho_vec(&self.rho_vec) {
                self.restore_penalties(self.rho, constr_old);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Set a new scalar rho and update the linear system.  On failure
    /// the previous rho is restored.
    pub(crate) fn set_rho(&mut self, rho: T) -> Result<(), LinsysError> {
        let rho_old = self.rho;
        self.rho = rho.clamp_to(RHO_MIN.as_T(), RHO_MAX.as_T());
        self.set_rho_vec();
        if let Err(e) = self.linsys.update_rho_vec(&self.rho_vec) {
            let constr_type = self.constr_type.clone();
            self.restore_penalties(rho_old, constr_type);
            return Err(e);
        }
        Ok(())
    }

    // put back penalties that were factored before.  The linear system
    // is released if even those fail, so that no stale factors are used.
    fn restore_penalties(&mut self, rho: T, constr_type: Vec<ConstraintType>) {
        self.rho = rho;
        self.constr_type = constr_type;
        self.set_rho_vec();
        if self.linsys.update_rho_vec(&self.rho_vec).is_err() {
            self.linsys.release();
        }
    }

    /// Estimate of a rho balancing the primal and dual residuals,
    /// computed from scaled quantities.  Uses x_prev and z_prev as work.
    pub(crate) fn compute_rho_estimate(&mut self) -> T {
        let tol: T = RHO_ESTIMATE_TOL.as_T();
        let data = &self.data;

        // primal residual, relative to its scale
        self.z_prev.waxpby(T::one(), &self.Ax, -T::one(), &self.z);
        let pri_res = self.z_prev.norm_inf();
        let pri_res_norm = T::max(self.Ax.norm_inf(), self.z.norm_inf());
        let pri_res = pri_res / (pri_res_norm + tol);

        // dual residual, relative to its scale
        self.x_prev.waxpby(T::one(), &self.Px, T::one(), &data.q);
        self.x_prev.axpby(T::one(), &self.Aty, T::one());
        let dua_res = self.x_prev.norm_inf();
        let dua_res_norm = T::max(
            T::max(self.Px.norm_inf(), self.Aty.norm_inf()),
            data.q.norm_inf(),
        );
        let dua_res = dua_res / (dua_res_norm + tol);

        let rho_estimate = self.rho * T::sqrt(pri_res / (dua_res + tol));
        rho_estimate.clamp_to(RHO_MIN.as_T(), RHO_MAX.as_T())
    }

    /// Adaptive rho step.  Returns the estimate, and whether rho was
    /// changed to it.
    pub(crate) fn adapt_rho(
        &mut self,
        settings: &DefaultSettings<T>,
    ) -> Result<(T, bool), LinsysError> {
        let rho_new = self.compute_rho_estimate();
        let tol = settings.adaptive_rho_tolerance;

        if rho_new > self.rho * tol || rho_new < self.rho / tol {
            self.set_rho(rho_new)?;
            Ok((rho_new, true))
        } else {
            Ok((rho_new, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_workspace() -> Workspace<f64> {
        let P = CscMatrix::from(&[[1., 0.], [0., 1.]]);
        let A = CscMatrix::from(&[[1., 1.], [1., 0.], [0., 1.], [1., -1.]]);
        let q = [0., 0.];
        let l = [1., -f64::INFINITY, 0., -1.];
        let u = [1., f64::INFINITY, 10., 1.];
        let data = ProblemData::new(&P, &q, &A, &l, &u);
        Workspace::new(data, &DefaultSettings::default()).unwrap()
    }

    #[test]
    fn test_constraint_types() {
        let ws = test_workspace();
        assert_eq!(
            ws.constr_type,
            vec![
                ConstraintType::Equality,
                ConstraintType::Loose,
                ConstraintType::Inequality,
                ConstraintType::Inequality
            ]
        );
        assert_eq!(ws.rho_vec[1], RHO_MIN);
        assert_eq!(ws.rho_vec[2], ws.rho);
        assert!((ws.rho_vec[0] - ws.rho * RHO_EQ_OVER_RHO_INEQ).abs() < 1e-12);
        for (r, rinv) in std::iter::zip(&ws.rho_vec, &ws.rho_inv_vec) {
            assert!((r * rinv - 1.).abs() < 1e-14);
        }
    }

    #[test]
    fn test_set_rho_clamped() {
        let mut ws = test_workspace();
        ws.set_rho(1e12).unwrap();
        assert_eq!(ws.rho, RHO_MAX);
        assert!(ws.rho_vec.iter().all(|&r| r > 0. && r <= RHO_MAX));

        ws.set_rho(0.).unwrap();
        assert_eq!(ws.rho, RHO_MIN);
        assert!(ws.rho_vec.iter().all(|&r| r >= RHO_MIN));
    }

    #[test]
    fn test_rho_estimate_balances_residuals() {
        let mut ws = test_workspace();

        // large primal residual, no dual residual
        ws.x.set(0.);
        ws.z.set(5.);
        ws.y.set(0.);
        ws.update_products();
        let est = ws.compute_rho_estimate();
        assert!(est > ws.rho);

        // no primal residual, large dual residual
        ws.x.copy_from(&[1., 2.]);
        let mut z = vec![0.; 4];
        ws.data.A.gemv(&mut z, &ws.x, 1., 0.);
        ws.z.copy_from(&z);
        ws.update_products();
        let est = ws.compute_rho_estimate();
        assert!(est < ws.rho);
    }
}
