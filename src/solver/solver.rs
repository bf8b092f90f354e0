#![allow(non_snake_case)]
use super::problemdata::check_problem_data;
use super::*;
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::timers::*;
use std::io::Write;
use thiserror::Error;

/// Error type returned by [`Solver::new`]
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem data dimensions are incompatible")]
    BadDimensions,
    #[error("Lower bound exceeds upper bound")]
    InvalidBounds,
    #[error("Problem data contains NaN or infinite values")]
    NonFiniteData,
    #[error("P must be upper triangular")]
    NotUpperTriangular,
    #[error("Bad sparse matrix format")]
    Format(#[from] SparseFormatError),
    #[error("Bad solver settings")]
    Settings(#[from] SettingsError),
    #[error("Linear system setup failed")]
    Linsys(#[from] LinsysError),
}

// print a status line every this many iterations
const PRINT_INTERVAL: u32 = 200;

/// ADMM solver for problems of the form
///
/// ```text
/// minimize    ½xᵀPx + qᵀx
/// subject to  l ≤ Ax ≤ u
/// ```
///
/// Results of the most recent [`solve`](Solver::solve) are in
/// `solution` and `info`.

pub struct Solver<T: FloatT = f64> {
    pub workspace: Workspace<T>,
    pub settings: DefaultSettings<T>,
    pub info: Info<T>,
    pub solution: Solution<T>,
    pub(crate) timers: Option<Timers>,
}

impl<T> Solver<T>
where
    T: FloatT,
{
    /// Checks and copies the problem data, scales it and factors the
    /// linear system.  `P` must be upper triangular.
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        l: &[T],
        u: &[T],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        check_problem_data(P, q, A, l, u)?;
        settings.validate()?;

        let mut timers = if settings.profiling {
            Timers::default()
        } else {
            Timers::disabled()
        };

        let workspace;
        timeit! {timers => "setup"; {
            let data = ProblemData::<T>::new(P, q, A, l, u);
            workspace = Workspace::<T>::new(data, &settings);
        }}
        let workspace = workspace?;

        let mut info = Info::<T>::new();
        info.setup_time = timers.elapsed(&["setup"]).as_secs_f64();
        info.rho_estimate = workspace.rho;

        let solution = Solution::<T>::new(workspace.data.n, workspace.data.m);

        Ok(Self {
            workspace,
            settings,
            info,
            solution,
            timers: Some(timers),
        })
    }

    /// Run the ADMM iteration from the stored iterate (or from zero when
    /// `warm_start` is off), then polish and unscale the result.
    pub fn solve(&mut self) {
        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap_or_else(Timers::disabled);

        let settings = &self.settings;
        let ws = &mut self.workspace;
        let info = &mut self.info;

        info.reset(ws.rho, &mut timers);

        notimeit! {timers; {
            let _ = info.print_banner(settings);
            let _ = info.print_configuration(settings, ws);
            let _ = info.print_status_header(settings);
        }}

        let mut status = SolverStatus::Unsolved;
        let mut iter = 0u32;
        let mut printed_last = false;
        let start = Instant::now();

        timeit! {timers => "solve"; {

        if settings.warm_start {
            ws.update_products();
        } else {
            ws.cold_start();
        }

        // ----------
        // main loop
        // ----------

        for k in 1..=settings.max_iter {
            iter = k;

            if ws.admm_step(settings).is_err() {
                status = SolverStatus::Error;
                break;
            }

            let check_now = settings.check_termination > 0 && k % settings.check_termination == 0;
            let print_now = settings.verbose && (k == 1 || k % PRINT_INTERVAL == 0);
            printed_last = print_now;

            if check_now || print_now {
                let pri_res = ws.compute_pri_res(settings);
                let dua_res = ws.compute_dua_res(settings);
                info.update(k, ws.compute_obj_val(), pri_res, dua_res);

                if print_now {
                    notimeit! {timers; {
                        let _ = info.print_status(settings, ws.rho, start.elapsed());
                    }}
                }

                if check_now {
                    if let Some(s) = ws.check_termination(pri_res, dua_res, settings, false) {
                        status = s;
                        break;
                    }
                }
            }

            if settings.adaptive_rho && k % settings.adaptive_rho_interval == 0 {
                match ws.adapt_rho(settings) {
                    Ok((estimate, changed)) => {
                        info.rho_estimate = estimate;
                        if changed {
                            info.rho_updates += 1;
                        }
                    }
                    Err(_) => {
                        status = SolverStatus::Error;
                        break;
                    }
                }
            }

            if start.elapsed().as_secs_f64() > settings.time_limit {
                status = SolverStatus::TimeLimitReached;
                break;
            }
        }

        // out of budget: one exact check of the final iterate,
        // then a check at relaxed tolerances
        if matches!(status, SolverStatus::Unsolved | SolverStatus::TimeLimitReached) {
            let pri_res = ws.compute_pri_res(settings);
            let dua_res = ws.compute_dua_res(settings);
            info.update(iter, ws.compute_obj_val(), pri_res, dua_res);

            let fallback = match status {
                SolverStatus::Unsolved => SolverStatus::MaxIterReached,
                s => s,
            };
            status = ws
                .check_termination(pri_res, dua_res, settings, false)
                .or_else(|| {
                    ws.check_termination(pri_res, dua_res, settings, true)
                        .map(SolverStatus::to_inaccurate)
                })
                .unwrap_or(fallback);
        }

        info.status = status;
        info.iterations = iter;

        }} // end "solve" timer

        if !printed_last && status != SolverStatus::Error {
            let _ = info.print_status(settings, ws.rho, start.elapsed());
        }

        if settings.polish && status == SolverStatus::Solved {
            timeit! {timers => "polish"; {
                match ws.polish(settings, info.obj_val, info.pri_res, info.dua_res) {
                    Some(polished) => {
                        info.status_polish = PolishStatus::Successful;
                        info.obj_val = polished.obj_val;
                        info.pri_res = polished.pri_res;
                        info.dua_res = polished.dua_res;
                    }
                    None => {
                        info.status_polish = PolishStatus::Unsuccessful;
                    }
                }
            }}
            info.polish_time = timers.elapsed(&["polish"]).as_secs_f64();
            let _ = info.print_polish(settings);
        }

        //store final solution, timing etc
        info.finalize_timing(&mut timers);
        self.solution.finalize(ws, info);

        let _ = info.print_footer(settings);

        //stow the timers back into Option in the solver struct
        self.timers.replace(timers);
    }

    /// Replace the solver settings.  Settings fixed at setup
    /// (see [`DefaultSettings::validate_as_update`]) can not change.
    /// A change of `rho` resets the penalty.
    pub fn update_settings(&mut self, settings: DefaultSettings<T>) -> Result<(), SolverError> {
        settings.validate_as_update(&self.settings)?;
        let rho_changed = settings.rho != self.settings.rho;
        self.settings = settings;
        if rho_changed {
            self.workspace.set_rho(self.settings.rho)?;
        }
        Ok(())
    }

    /// Print the profiling timers, if enabled
    pub fn print_timers(&mut self) {
        if let Some(timers) = self.timers.as_ref() {
            if timers.is_enabled() {
                timers.print();
            }
        }
    }

    /// Drop the factorization or solver work storage.  Solving or
    /// updating after this ends with a linear system error.
    pub fn release(&mut self) {
        self.workspace.linsys.release();
    }

    pub(crate) fn with_timers<F>(&mut self, key: &'static str, f: F) -> Result<(), DataUpdateError>
    where
        F: FnOnce(&mut Self) -> Result<(), DataUpdateError>,
    {
        let mut timers = self.timers.take().unwrap_or_else(Timers::disabled);
        timers.start_as_current(key);
        let result = f(self);
        timers.stop_current();
        self.timers.replace(timers);
        result
    }
}

impl<T> ConfigurablePrintTarget for Solver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.info.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}
