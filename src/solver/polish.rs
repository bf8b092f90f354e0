#![allow(non_snake_case)]
use super::rho::ConstraintType;
use super::*;
use crate::algebra::*;
use itertools::izip;

/// Reduced problem and refined solution from solution polishing.
///
/// `Ared` holds the rows of A active at their lower bound followed by
/// the rows active at their upper bound.  Vectors are in scaled space.

#[derive(Debug)]
pub struct Polish<T> {
    pub Ared: CscMatrix<T>,
    pub A_to_Alow: Vec<Option<usize>>,
    pub A_to_Aupp: Vec<Option<usize>>,
    pub Alow_to_A: Vec<usize>,
    pub Aupp_to_A: Vec<usize>,
    pub x: Vec<T>,
    pub z: Vec<T>,
    pub y: Vec<T>,
    pub obj_val: T,
    pub pri_res: T,
    pub dua_res: T,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    // active set guess from the ADMM iterate
    fn form_reduced_system(&self) -> Polish<T> {
        let data = &self.data;
        let (n, m) = (data.n, data.m);

        let mut A_to_Alow = vec![None; m];
        let mut A_to_Aupp = vec![None; m];
        let mut Alow_to_A = Vec::new();
        let mut Aupp_to_A = Vec::new();

        for (i, (ctype, &z, &y, &l, &u)) in
            izip!(&self.constr_type, &self.z, &self.y, &data.l, &data.u).enumerate()
        {
            match ctype {
                ConstraintType::Loose => {}
                ConstraintType::Equality => {
                    A_to_Alow[i] = Some(Alow_to_A.len());
                    Alow_to_A.push(i);
                }
                ConstraintType::Inequality => {
                    if z - l < -y {
                        A_to_Alow[i] = Some(Alow_to_A.len());
                        Alow_to_A.push(i);
                    } else if u - z < y {
                        A_to_Aupp[i] = Some(Aupp_to_A.len());
                        Aupp_to_A.push(i);
                    }
                }
            }
        }

        // lower active rows first, then the upper ones
        let nlow = Alow_to_A.len();
        let mred = nlow + Aupp_to_A.len();
        let rowmap: Vec<Option<usize>> = std::iter::zip(&A_to_Alow, &A_to_Aupp)
            .map(|(low, upp)| low.or(upp.map(|k| k + nlow)))
            .collect();

        let Ared = data.A.select_rows(&rowmap, mred);

        Polish {
            Ared,
            A_to_Alow,
            A_to_Aupp,
            Alow_to_A,
            Aupp_to_A,
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            y: vec![T::zero(); m],
            obj_val: T::zero(),
            pri_res: T::zero(),
            dua_res: T::zero(),
        }
    }

    // solve the reduced KKT system, returning [x; y_red]
    fn solve_reduced_system(
        &self,
        pol: &Polish<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<Vec<T>, LinsysError> {
        let data = &self.data;
        let n = data.n;
        let Ared = &pol.Ared;
        let mred = Ared.m;
        let delta = settings.delta;

        let rho_vec = vec![T::recip(delta); mred];
        let mut linsys = DirectLinsys::new(&data.P, Ared, delta, &rho_vec, true, false)?;

        // rhs = [-q; l_low; u_upp]
        let mut rhs = vec![T::zero(); n + mred];
        {
            let (rhs_x, rhs_y) = rhs.split_at_mut(n);
            rhs_x.scalarop_from(|q| -q, &data.q);
            let (rhs_low, rhs_upp) = rhs_y.split_at_mut(pol.Alow_to_A.len());
            for (r, &i) in std::iter::zip(rhs_low, &pol.Alow_to_A) {
                *r = data.l[i];
            }
            for (r, &i) in std::iter::zip(rhs_upp, &pol.Aupp_to_A) {
                *r = data.u[i];
            }
        }

        let mut sol = rhs.clone();
        linsys.solve(&mut sol)?;

        // iterative refinement against the unregularized system
        let mut resid = vec![T::zero(); n + mred];
        for _ in 0..settings.polish_refine_iter {
            {
                let (sol_x, sol_y) = sol.split_at(n);
                let (res_x, res_y) = resid.split_at_mut(n);
                data.P.sym().symv(res_x, sol_x, T::one(), T::zero());
                Ared.t().gemv(res_x, sol_y, T::one(), T::one());
                Ared.gemv(res_y, sol_x, T::one(), T::zero());
            }
            // resid = rhs - K*sol
            resid.axpby(T::one(), &rhs, -T::one());
            linsys.solve(&mut resid)?;
            sol.axpby(T::one(), &resid, T::one());
        }

        if !sol.is_finite() {
            return Err(LinsysError::FactorizationFailure);
        }
        Ok(sol)
    }

    /// Attempts to refine the current iterate by solving an equality
    /// constrained QP on a guess of the active set.
    ///
    /// The refined iterate is kept, and returned, if neither its residuals
    /// nor its objective are worse than those given.  Otherwise the
    /// iterate is left as it was.
    pub(crate) fn polish(
        &mut self,
        settings: &DefaultSettings<T>,
        obj_val: T,
        pri_res: T,
        dua_res: T,
    ) -> Option<Polish<T>> {
        let mut pol = self.form_reduced_system();

        let sol = self.solve_reduced_system(&pol, settings).ok()?;
        let n = self.data.n;
        let (sol_x, y_red) = sol.split_at(n);
        let nlow = pol.Alow_to_A.len();

        // polished iterate
        pol.x.copy_from(sol_x);

        let data = &self.data;
        data.A.gemv(&mut pol.z, &pol.x, T::one(), T::zero());
        pol.z.project_box(&data.l, &data.u);

        for (k, &i) in pol.Alow_to_A.iter().enumerate() {
            pol.y[i] = y_red[k];
        }
        for (k, &i) in pol.Aupp_to_A.iter().enumerate() {
            pol.y[i] = y_red[nlow + k];
        }

        // evaluate it in place of the ADMM iterate
        self.swap_iterates(&mut pol);
        pol.obj_val = self.compute_obj_val();
        pol.pri_res = self.compute_pri_res(settings);
        pol.dua_res = self.compute_dua_res(settings);

        let accept = pol.pri_res <= pri_res && pol.dua_res <= dua_res && pol.obj_val <= obj_val;

        if accept {
            pol.x.copy_from(&self.x);
            pol.z.copy_from(&self.z);
            pol.y.copy_from(&self.y);
            Some(pol)
        } else {
            self.swap_iterates(&mut pol);
            None
        }
    }

    fn swap_iterates(&mut self, pol: &mut Polish<T>) {
        std::mem::swap(&mut self.x, &mut pol.x);
        std::mem::swap(&mut self.z, &mut pol.z);
        std::mem::swap(&mut self.y, &mut pol.y);
        self.update_products();
    }
}
