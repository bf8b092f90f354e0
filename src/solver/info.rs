use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::timers::*;

/// Solver progress and timing information from the most recent solve.
///
/// Times are in seconds and are zero when `profiling` is disabled.
/// `run_time` covers setup (first solve only) or data updates, plus
/// the solve and polishing time.

#[derive(Default, Debug)]
pub struct Info<T> {
    pub status: SolverStatus,
    pub status_polish: PolishStatus,
    pub iterations: u32,
    pub obj_val: T,
    pub pri_res: T,
    pub dua_res: T,
    /// most recent rho estimate from the adaptive rho step
    pub rho_estimate: T,
    /// number of accepted rho changes
    pub rho_updates: u32,

    pub setup_time: f64,
    pub solve_time: f64,
    pub update_time: f64,
    pub polish_time: f64,
    pub run_time: f64,

    pub(crate) stream: PrintTarget,
}

impl<T> Info<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            status_polish: PolishStatus::NotPerformed,
            obj_val: T::nan(),
            pri_res: T::nan(),
            dua_res: T::nan(),
            ..Self::default()
        }
    }

    pub(crate) fn reset(&mut self, rho: T, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.status_polish = PolishStatus::NotPerformed;
        self.iterations = 0;
        self.rho_estimate = rho;
        self.rho_updates = 0;
        self.obj_val = T::nan();
        self.pri_res = T::nan();
        self.dua_res = T::nan();
        self.solve_time = 0f64;
        self.polish_time = 0f64;

        timers.reset_timer("solve");
        timers.reset_timer("polish");
    }

    pub(crate) fn update(&mut self, iter: u32, obj_val: T, pri_res: T, dua_res: T) {
        self.iterations = iter;
        self.obj_val = obj_val;
        self.pri_res = pri_res;
        self.dua_res = dua_res;
    }

    /// Collect times at the end of a solve.  The setup and update
    /// timers are cleared so that the next solve only reports the
    /// time spent since this one.
    pub(crate) fn finalize_timing(&mut self, timers: &mut Timers) {
        self.update_time = timers.elapsed(&["update"]).as_secs_f64();
        self.solve_time = timers.elapsed(&["solve"]).as_secs_f64();
        self.polish_time = timers.elapsed(&["polish"]).as_secs_f64();
        self.run_time = timers.total_time().as_secs_f64();

        timers.reset_timer("setup");
        timers.reset_timer("update");
    }
}
