#![allow(non_snake_case)]
use super::problemdata::{check_bounds, clamp_bounds};
use super::rho::classify_constraints;
use super::*;
use crate::algebra::*;
use core::iter::Zip;
use core::slice::Iter;
use thiserror::Error;

/// Error type returned by the data update and warm start utilities
#[derive(Error, Debug)]
pub enum DataUpdateError {
    #[error("Data formatting error")]
    BadFormat(#[from] SparseFormatError),
    #[error("Lower bound exceeds upper bound")]
    InvalidBounds,
    #[error("Update contains NaN or infinite values")]
    NonFiniteData,
    #[error("Linear system update failed")]
    Linsys(#[from] LinsysError),
    #[error("Bad solver settings")]
    Settings(#[from] SettingsError),
}

// Trait for updating P and A matrices from various data types
pub trait MatrixProblemDataUpdate<T: FloatT> {
    fn update_matrix(
        &self,
        M: &mut CscMatrix<T>,
        lscale: &[T],
        rscale: &[T],
    ) -> Result<(), SparseFormatError>;
}

// Trait for updating q, l and u vectors from various data types
pub trait VectorProblemDataUpdate<T: FloatT> {
    fn update_vector(&self, v: &mut [T], scale: &[T]) -> Result<(), SparseFormatError>;
}

impl<T> Solver<T>
where
    T: FloatT,
{
    /// Overwrites the problem data in an existing solver.  See `update_P`,
    /// `update_q`, `update_A` and `update_bounds` for allowable inputs.
    pub fn update_data<
        DataP: MatrixProblemDataUpdate<T> + ?Sized,
        Dataq: VectorProblemDataUpdate<T> + ?Sized,
        DataA: MatrixProblemDataUpdate<T> + ?Sized,
        Datal: VectorProblemDataUpdate<T> + ?Sized,
        Datau: VectorProblemDataUpdate<T> + ?Sized,
    >(
        &mut self,
        P: &DataP,
        q: &Dataq,
        A: &DataA,
        l: &Datal,
        u: &Datau,
    ) -> Result<(), DataUpdateError> {
        self.update_P_A(P, A)?;
        self.update_q(q)?;
        self.update_bounds(l, u)?;
        Ok(())
    }

    /// Overwrites the `P` matrix data in an existing solver object.   The input `P` can be
    ///
    /// - a nonempty Vector, in which case the nonzero values of the original `P` are overwritten, preserving the sparsity pattern, or
    ///
    /// - a CscMatrix, in which case the input must match the sparsity pattern of the upper triangular part of the original `P`.
    ///
    /// - an iterator zip(&index,&values), specifying a selective update of values.
    ///
    /// - an empty vector, in which case no action is taken.
    ///
    /// The problem is rescaled and the linear system refactored.  Requires
    /// `matrix_updates_enable`.
    pub fn update_P<Data: MatrixProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), DataUpdateError> {
        let empty: [T; 0] = [];
        self.update_P_A(data, &empty)
    }

    /// Overwrites the `A` matrix data in an existing solver object.  Accepts
    /// the same inputs as [`update_P`](Self::update_P).
    pub fn update_A<Data: MatrixProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), DataUpdateError> {
        let empty: [T; 0] = [];
        self.update_P_A(&empty, data)
    }

    /// Overwrites both matrices, with a single rescaling and refactorization
    pub fn update_P_A<DataP, DataA>(
        &mut self,
        P: &DataP,
        A: &DataA,
    ) -> Result<(), DataUpdateError>
    where
        DataP: MatrixProblemDataUpdate<T> + ?Sized,
        DataA: MatrixProblemDataUpdate<T> + ?Sized,
    {
        if !self.settings.matrix_updates_enable {
            return Err(LinsysError::Unsupported.into());
        }

        self.with_timers("update", |solver| {
            let scaling = solver.settings.scaling;
            let ws = &mut solver.workspace;

            // kept until the new data has been factored
            let data_old = ws.data.clone();
            let constr_old = ws.constr_type.clone();
            let iterates_old = (ws.x.clone(), ws.z.clone(), ws.y.clone());

            // apply the update to the unscaled data, then equilibrate again
            ws.unscale_iterates();
            ws.data.unscale();

            if let Err(e) = install_matrices(ws, P, A, scaling) {
                ws.data = data_old;
                ws.constr_type = constr_old;
                (ws.x, ws.z, ws.y) = iterates_old;
                ws.set_rho_vec();
                ws.update_products();

                // the factors may hold the rejected values
                if matches!(e, DataUpdateError::Linsys(_)) && ws.refactor().is_err() {
                    ws.linsys.release();
                }
                return Err(e);
            }
            ws.scale_iterates();

            solver.invalidate_solution();
            Ok(())
        })
    }

    /// Overwrites the `q` vector data in an existing solver object.  No action is taken if the input is empty.
    pub fn update_q<Data: VectorProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), DataUpdateError> {
        self.with_timers("update", |solver| {
            let ws = &mut solver.workspace;
            let equil = &ws.data.equilibration;

            let mut scale = equil.d.clone();
            scale.scale(equil.c);

            let mut q = ws.data.q.clone();
            data.update_vector(&mut q, &scale)?;
            if !q.is_finite() {
                return Err(DataUpdateError::NonFiniteData);
            }
            ws.data.q = q;

            solver.invalidate_solution();
            Ok(())
        })
    }

    /// Overwrites the constraint bounds.  Inputs are as for
    /// [`update_q`](Self::update_q).  Fails without modifying the
    /// solver if any `l > u`.
    pub fn update_bounds<Datal, Datau>(
        &mut self,
        l: &Datal,
        u: &Datau,
    ) -> Result<(), DataUpdateError>
    where
        Datal: VectorProblemDataUpdate<T> + ?Sized,
        Datau: VectorProblemDataUpdate<T> + ?Sized,
    {
        self.with_timers("update", |solver| {
            let ws = &mut solver.workspace;
            let equil = &ws.data.equilibration;
            let ones = vec![T::one(); ws.data.m];

            // work on unscaled copies
            let mut lnew = ws.data.l.clone();
            let mut unew = ws.data.u.clone();
            lnew.hadamard(&equil.einv);
            unew.hadamard(&equil.einv);

            l.update_vector(&mut lnew, &ones)?;
            u.update_vector(&mut unew, &ones)?;

            if lnew.iter().chain(unew.iter()).any(|v| v.is_nan()) {
                return Err(DataUpdateError::NonFiniteData);
            }
            clamp_bounds(&mut lnew, &mut unew);
            check_bounds(&lnew, &unew).map_err(|_| DataUpdateError::InvalidBounds)?;

            lnew.hadamard(&equil.e);
            unew.hadamard(&equil.e);
            let lold = std::mem::replace(&mut ws.data.l, lnew);
            let uold = std::mem::replace(&mut ws.data.u, unew);

            if let Err(e) = ws.update_constraint_types() {
                ws.data.l = lold;
                ws.data.u = uold;
                return Err(e.into());
            }

            solver.invalidate_solution();
            Ok(())
        })
    }

    /// Overwrites the lower bound only
    pub fn update_lower_bound<Data: VectorProblemDataUpdate<T> + ?Sized>(
        &mut self,
        l: &Data,
    ) -> Result<(), DataUpdateError> {
        let empty: [T; 0] = [];
        self.update_bounds(l, &empty)
    }

    /// Overwrites the upper bound only
    pub fn update_upper_bound<Data: VectorProblemDataUpdate<T> + ?Sized>(
        &mut self,
        u: &Data,
    ) -> Result<(), DataUpdateError> {
        let empty: [T; 0] = [];
        self.update_bounds(&empty, u)
    }

    /// Sets a new penalty `rho` and updates the linear system.  Values
    /// outside `[1e-6, 1e6]` are clamped.
    pub fn update_rho(&mut self, rho: T) -> Result<(), DataUpdateError> {
        if rho.is_nan() || rho <= T::zero() {
            return Err(SettingsError::BadFieldValue("rho").into());
        }
        self.with_timers("update", |solver| {
            solver.workspace.set_rho(rho)?;
            solver.settings.rho = rho;
            Ok(())
        })
    }

    /// Set the starting iterate for the next solve from a primal and
    /// dual guess.  z is set to Ax.
    ///
    /// This turns on the `warm_start` setting, so that the guess is not
    /// discarded by the next solve.
    pub fn warm_start(&mut self, x: &[T], y: &[T]) -> Result<(), DataUpdateError> {
        self.warm_start_x(x)?;
        self.warm_start_y(y)
    }

    /// Set the primal part of the starting iterate.  z is set to Ax.
    /// Turns on `warm_start`.
    pub fn warm_start_x(&mut self, x: &[T]) -> Result<(), DataUpdateError> {
        let ws = &mut self.workspace;
        if x.len() != ws.data.n {
            return Err(SparseFormatError::IncompatibleDimension.into());
        }
        if !x.is_finite() {
            return Err(DataUpdateError::NonFiniteData);
        }
        ws.x.copy_from(x);
        ws.x.hadamard(&ws.data.equilibration.dinv);
        ws.data.A.gemv(&mut ws.z, &ws.x, T::one(), T::zero());
        ws.update_products();
        self.settings.warm_start = true;
        Ok(())
    }

    /// Set the dual part of the starting iterate.  Turns on `warm_start`.
    pub fn warm_start_y(&mut self, y: &[T]) -> Result<(), DataUpdateError> {
        let ws = &mut self.workspace;
        if y.len() != ws.data.m {
            return Err(SparseFormatError::IncompatibleDimension.into());
        }
        if !y.is_finite() {
            return Err(DataUpdateError::NonFiniteData);
        }
        let equil = &ws.data.equilibration;
        ws.y.copy_from(y);
        ws.y.hadamard(&equil.einv).scale(equil.c);
        ws.update_products();
        self.settings.warm_start = true;
        Ok(())
    }

    /// Reset the stored iterate to zero
    pub fn cold_start(&mut self) {
        self.workspace.cold_start();
    }

    fn invalidate_solution(&mut self) {
        self.info.status = SolverStatus::Unsolved;
        self.info.status_polish = PolishStatus::NotPerformed;
        self.solution.status = SolverStatus::Unsolved;
    }
}

// new matrices into unscaled data, then equilibrate and refactor
fn install_matrices<T, DataP, DataA>(
    ws: &mut Workspace<T>,
    P: &DataP,
    A: &DataA,
    scaling: u32,
) -> Result<(), DataUpdateError>
where
    T: FloatT,
    DataP: MatrixProblemDataUpdate<T> + ?Sized,
    DataA: MatrixProblemDataUpdate<T> + ?Sized,
{
    apply_matrix_updates(&mut ws.data, P, A)?;
    ws.data.scale(scaling);
    classify_constraints(&mut ws.constr_type, &ws.data.l, &ws.data.u);
    ws.set_rho_vec();
    ws.refactor()?;
    Ok(())
}

// overwrite the unscaled matrices, leaving them untouched on failure
fn apply_matrix_updates<T, DataP, DataA>(
    data: &mut ProblemData<T>,
    P: &DataP,
    A: &DataA,
) -> Result<(), DataUpdateError>
where
    T: FloatT,
    DataP: MatrixProblemDataUpdate<T> + ?Sized,
    DataA: MatrixProblemDataUpdate<T> + ?Sized,
{
    let ones_n = vec![T::one(); data.n];
    let ones_m = vec![T::one(); data.m];

    let mut Pnew = data.P.clone();
    let mut Anew = data.A.clone();
    P.update_matrix(&mut Pnew, &ones_n, &ones_n)?;
    A.update_matrix(&mut Anew, &ones_m, &ones_n)?;

    if !Pnew.nzval.is_finite() || !Anew.nzval.is_finite() {
        return Err(DataUpdateError::NonFiniteData);
    }
    data.P = Pnew;
    data.A = Anew;
    Ok(())
}

impl<T> MatrixProblemDataUpdate<T> for CscMatrix<T>
where
    T: FloatT,
{
    fn update_matrix(
        &self,
        M: &mut CscMatrix<T>,
        lscale: &[T],
        rscale: &[T],
    ) -> Result<(), SparseFormatError> {
        self.check_equal_sparsity(M)?;
        let v = &self.nzval;
        v.update_matrix(M, lscale, rscale)
    }
}

impl<T> MatrixProblemDataUpdate<T> for [T]
where
    T: FloatT,
{
    fn update_matrix(
        &self,
        M: &mut CscMatrix<T>,
        lscale: &[T],
        rscale: &[T],
    ) -> Result<(), SparseFormatError> {
        let data = self;
        if data.is_empty() {
            return Ok(());
        }

        if data.len() != M.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        M.nzval.copy_from_slice(data);
        M.lrscale(lscale, rscale);

        Ok(())
    }
}

impl<T: FloatT> MatrixProblemDataUpdate<T> for Vec<T> {
    fn update_matrix(
        &self,
        M: &mut CscMatrix<T>,
        lscale: &[T],
        rscale: &[T],
    ) -> Result<(), SparseFormatError> {
        self.as_slice().update_matrix(M, lscale, rscale)
    }
}

impl<T: FloatT> MatrixProblemDataUpdate<T> for [T; 0] {
    fn update_matrix(
        &self,
        _M: &mut CscMatrix<T>,
        _lscale: &[T],
        _rscale: &[T],
    ) -> Result<(), SparseFormatError> {
        Ok(())
    }
}

// Can't write a single impl for [T], Vec<T> and [T;0] above because
// bounding by AsRef<[T]> is not specific enough to distinguish it from
// the zip iterator for partial updates implemented next.

impl<'a, T> MatrixProblemDataUpdate<T> for Zip<Iter<'a, usize>, Iter<'a, T>>
where
    T: FloatT,
{
    fn update_matrix(
        &self,
        M: &mut CscMatrix<T>,
        lscale: &[T],
        rscale: &[T],
    ) -> Result<(), SparseFormatError> {
        for (&idx, &value) in self.clone() {
            if idx >= M.nzval.len() {
                return Err(SparseFormatError::IncompatibleDimension);
            }
            let (row, col) = M.index_to_coord(idx);
            M.nzval[idx] = lscale[row] * rscale[col] * value;
        }
        Ok(())
    }
}

impl<T> VectorProblemDataUpdate<T> for [T]
where
    T: FloatT,
{
    fn update_vector(&self, v: &mut [T], scale: &[T]) -> Result<(), SparseFormatError> {
        let data = self;
        if data.is_empty() {
            return Ok(());
        }

        if data.len() != v.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        v.copy_from_slice(data);
        v.hadamard(scale);

        Ok(())
    }
}

impl<T: FloatT> VectorProblemDataUpdate<T> for Vec<T> {
    fn update_vector(&self, v: &mut [T], scale: &[T]) -> Result<(), SparseFormatError> {
        self.as_slice().update_vector(v, scale)
    }
}

impl<T: FloatT> VectorProblemDataUpdate<T> for [T; 0] {
    fn update_vector(&self, _v: &mut [T], _scale: &[T]) -> Result<(), SparseFormatError> {
        Ok(())
    }
}

impl<'a, T> VectorProblemDataUpdate<T> for Zip<Iter<'a, usize>, Iter<'a, T>>
where
    T: FloatT,
{
    fn update_vector(&self, v: &mut [T], scale: &[T]) -> Result<(), SparseFormatError> {
        for (&idx, &value) in self.clone() {
            if idx >= v.len() {
                return Err(SparseFormatError::IncompatibleDimension);
            }
            v[idx] = value * scale[idx];
        }
        Ok(())
    }
}
