#![allow(non_snake_case)]
use super::rho::*;
use super::*;
use crate::algebra::*;
use itertools::izip;

// ---------------
// ADMM workspace
// ---------------

/// Scaled problem data, linear system solver and ADMM iterates.
///
/// All vectors here are in the scaled space of the equilibrated problem.

pub struct Workspace<T: FloatT> {
    pub data: ProblemData<T>,
    pub linsys: LinearSystemSolver<T>,

    // penalty parameters
    pub rho: T,
    pub rho_vec: Vec<T>,
    pub rho_inv_vec: Vec<T>,
    pub constr_type: Vec<ConstraintType>,

    // iterates
    pub x: Vec<T>,
    pub z: Vec<T>,
    pub y: Vec<T>,
    pub xz_tilde: Vec<T>,
    pub x_prev: Vec<T>,
    pub z_prev: Vec<T>,

    // products of the current iterate
    pub Ax: Vec<T>,
    pub Px: Vec<T>,
    pub Aty: Vec<T>,

    // iterate differences, for the infeasibility checks
    pub delta_x: Vec<T>,
    pub delta_y: Vec<T>,
    pub Pdelta_x: Vec<T>,
    pub Adelta_x: Vec<T>,
    pub Atdelta_y: Vec<T>,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Scales the data, sets the penalties and builds the linear system.
    pub fn new(
        mut data: ProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<Self, LinsysError> {
        let (n, m) = (data.n, data.m);

        data.scale(settings.scaling);

        let mut constr_type = vec![ConstraintType::Inequality; m];
        classify_constraints(&mut constr_type, &data.l, &data.u);

        let rho = settings.rho.clamp_to(RHO_MIN.as_T(), RHO_MAX.as_T());
        let mut rho_vec = vec![T::zero(); m];
        let mut rho_inv_vec = vec![T::zero(); m];
        fill_rho_vec(&mut rho_vec, &mut rho_inv_vec, &constr_type, rho);

        let linsys = LinearSystemSolver::new(
            &settings.linsys_solver,
            &data.P,
            &data.A,
            settings.sigma,
            &rho_vec,
            settings.matrix_updates_enable,
            settings.cg_max_iter,
            settings.cg_tol,
        )?;

        Ok(Self {
            data,
            linsys,
            rho,
            rho_vec,
            rho_inv_vec,
            constr_type,
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            y: vec![T::zero(); m],
            xz_tilde: vec![T::zero(); n + m],
            x_prev: vec![T::zero(); n],
            z_prev: vec![T::zero(); m],
            Ax: vec![T::zero(); m],
            Px: vec![T::zero(); n],
            Aty: vec![T::zero(); n],
            delta_x: vec![T::zero(); n],
            delta_y: vec![T::zero(); m],
            Pdelta_x: vec![T::zero(); n],
            Adelta_x: vec![T::zero(); m],
            Atdelta_y: vec![T::zero(); n],
        })
    }

    /// zero all iterates
    pub(crate) fn cold_start(&mut self) {
        self.x.set(T::zero());
        self.z.set(T::zero());
        self.y.set(T::zero());
        self.update_products();
    }

    /// Refactor the linear system with the current matrices and penalties
    pub(crate) fn refactor(&mut self) -> Result<(), LinsysError> {
        self.linsys.update_matrices(&self.data.P, &self.data.A)?;
        self.linsys.update_rho_vec(&self.rho_vec)
    }

    /// Ax, Px and Aᵀy for the current iterate
    pub(crate) fn update_products(&mut self) {
        let data = &self.data;
        data.A.gemv(&mut self.Ax, &self.x, T::one(), T::zero());
        data.P.sym().symv(&mut self.Px, &self.x, T::one(), T::zero());
        data.A.t().gemv(&mut self.Aty, &self.y, T::one(), T::zero());
    }

    /// One ADMM iteration
    pub(crate) fn admm_step(&mut self, settings: &DefaultSettings<T>) -> Result<(), LinsysError> {
        let n = self.data.n;
        let (sigma, alpha) = (settings.sigma, settings.alpha);
        let one_minus_alpha = T::one() - alpha;

        std::mem::swap(&mut self.x, &mut self.x_prev);
        std::mem::swap(&mut self.z, &mut self.z_prev);

        // rhs = [σx_prev - q; z_prev - y/rho]
        {
            let (xt, zt) = self.xz_tilde.split_at_mut(n);
            xt.waxpby(sigma, &self.x_prev, -T::one(), &self.data.q);
            for (zt, &zp, &y, &rhoinv) in izip!(zt, &self.z_prev, &self.y, &self.rho_inv_vec) {
                *zt = zp - rhoinv * y;
            }
        }

        self.linsys.solve(&mut self.xz_tilde)?;

        let (xt, zt) = self.xz_tilde.split_at(n);

        // over-relaxed primal update
        self.x.waxpby(alpha, xt, one_minus_alpha, &self.x_prev);
        self.delta_x.waxpby(T::one(), &self.x, -T::one(), &self.x_prev);

        // projection and dual update
        let data = &self.data;
        for (z, y, dy, &zt, &zp, &rho, &rhoinv, &l, &u) in izip!(
            &mut self.z,
            &mut self.y,
            &mut self.delta_y,
            zt,
            &self.z_prev,
            &self.rho_vec,
            &self.rho_inv_vec,
            &data.l,
            &data.u
        ) {
            let z_relaxed = alpha * zt + one_minus_alpha * zp;
            *z = (z_relaxed + rhoinv * (*y)).clamp_to(l, u);
            *dy = rho * (z_relaxed - *z);
            *y += *dy;
        }

        self.update_products();
        Ok(())
    }

    /// Move the iterates to the unscaled space, e.g. before the
    /// scaling is recomputed
    pub(crate) fn unscale_iterates(&mut self) {
        let equil = &self.data.equilibration;
        self.x.hadamard(&equil.d);
        self.z.hadamard(&equil.einv);
        self.y.hadamard(&equil.e).scale(equil.cinv);
    }

    /// Inverse of [`unscale_iterates`](Self::unscale_iterates)
    pub(crate) fn scale_iterates(&mut self) {
        let equil = &self.data.equilibration;
        self.x.hadamard(&equil.dinv);
        self.z.hadamard(&equil.e);
        self.y.hadamard(&equil.einv).scale(equil.c);
        self.update_products();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_workspace(settings: &DefaultSettings<f64>) -> Workspace<f64> {
        let P = CscMatrix::from(&[[4., 1.], [0., 2.]]);
        let A = CscMatrix::from(&[[1., 1.], [1., 0.], [0., 1.]]);
        let q = [1., 1.];
        let l = [1., 0., 0.];
        let u = [1., 0.7, 0.7];
        let data = ProblemData::new(&P, &q, &A, &l, &u);
        Workspace::new(data, settings).unwrap()
    }

    #[test]
    fn test_admm_step_feasible_z() {
        let settings = DefaultSettings::default();
        let mut ws = test_workspace(&settings);
        ws.cold_start();

        for _ in 0..20 {
            ws.admm_step(&settings).unwrap();
            for (&z, &l, &u) in izip!(&ws.z, &ws.data.l, &ws.data.u) {
                assert!(l <= z && z <= u);
            }
        }

        // products are consistent with the iterate
        let mut Ax = vec![0.; 3];
        ws.data.A.gemv(&mut Ax, &ws.x, 1., 0.);
        assert!(Ax.norm_inf_diff(&ws.Ax) < 1e-14);
    }

    #[test]
    fn test_iterate_scaling_round_trip() {
        let settings = DefaultSettings::default();
        let mut ws = test_workspace(&settings);
        ws.x.copy_from(&[0.3, 0.7]);
        ws.z.copy_from(&[1.0, 0.3, 0.7]);
        ws.y.copy_from(&[-2.9, 0.2, 0.]);
        let (x, z, y) = (ws.x.clone(), ws.z.clone(), ws.y.clone());

        ws.unscale_iterates();
        ws.scale_iterates();
        assert!(ws.x.norm_inf_diff(&x) < 1e-14);
        assert!(ws.z.norm_inf_diff(&z) < 1e-14);
        assert!(ws.y.norm_inf_diff(&y) < 1e-12);
    }
}
