#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn basic_qp_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    // P = [4. 1;1 2], upper triangle only
    let P = CscMatrix::new(
        2,                // m
        2,                // n
        vec![0, 1, 3],    // colptr
        vec![0, 0, 1],    // rowval
        vec![4., 1., 2.], // nzval
    );

    // A = [1. 1;1 0; 0 1]
    let A = CscMatrix::new(
        3,                    // m
        2,                    // n
        vec![0, 2, 4],        //colptr
        vec![0, 1, 0, 2],     //rowval
        vec![1., 1., 1., 1.], //nzval
    );

    let q = vec![1., 1.];
    let l = vec![1., 0., 0.];
    let u = vec![1., 0.7, 0.7];

    (P, q, A, l, u)
}

fn accurate_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .max_iter(10000)
        .verbose(false)
        .build()
        .unwrap()
}

#[test]
fn test_qp_feasible() {
    let (P, q, A, l, u) = basic_qp_data();

    let mut solver = Solver::new(&P, &q, &A, &l, &u, accurate_settings()).unwrap();
    solver.solve();

    let sol = &solver.solution;
    assert_eq!(sol.status, SolverStatus::Solved);
    assert!(sol.x.dist(&[0.3, 0.7]) <= 1e-5);
    assert!(sol.y.dist(&[-2.9, 0.0, 0.2]) <= 1e-5);
    assert!(f64::abs(sol.obj_val - 1.88) <= 1e-5);
    assert!(sol.prim_inf_cert.is_none() && sol.dual_inf_cert.is_none());
    assert_eq!(sol.iterations, solver.info.iterations);
}

#[test]
fn test_qp_default_settings() {
    let (P, q, A, l, u) = basic_qp_data();
    let settings = DefaultSettings {
        verbose: false,
        ..DefaultSettings::default()
    };

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[0.3, 0.7]) <= 1e-2);
}

#[test]
fn test_qp_unconstrained() {
    let P = CscMatrix::identity(2);
    let A = CscMatrix::zeros(0, 2);
    let q = [0., 0.];

    let mut solver = Solver::new(&P, &q, &A, &[], &[], accurate_settings()).unwrap();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.norm_inf() <= 1e-8);

    // with a linear term the minimizer is -q
    let q = [1., -2.];
    let mut solver = Solver::new(&P, &q, &A, &[], &[], accurate_settings()).unwrap();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[-1., 2.]) <= 1e-5);
    assert!(solver.solution.y.is_empty());
}

#[test]
fn test_qp_box() {
    // min ½‖x‖² - 2(x₁ + x₂)  s.t.  0 ≤ x ≤ 1
    let P = CscMatrix::identity(2);
    let A = CscMatrix::identity(2);
    let q = [-2., -2.];
    let l = [0., 0.];
    let u = [1., 1.];

    let mut solver = Solver::new(&P, &q, &A, &l, &u, accurate_settings()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[1., 1.]) <= 1e-5);
    assert!(solver.solution.y.dist(&[1., 1.]) <= 1e-5);
}

#[test]
fn test_qp_equality_constrained() {
    // min ½‖x‖²  s.t.  x₁ + x₂ = 1
    let P = CscMatrix::identity(2);
    let A = CscMatrix::from(&[[1., 1.]]);
    let q = [0., 0.];

    let mut solver = Solver::new(&P, &q, &A, &[1.], &[1.], accurate_settings()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[0.5, 0.5]) <= 1e-5);
    assert!(f64::abs(solver.solution.y[0] + 0.5) <= 1e-5);
}

#[test]
fn test_lp_feasible() {
    // min -x₁ - x₂  s.t.  x ≥ 0, x₁ + 2x₂ ≤ 4, 3x₁ + x₂ ≤ 6
    let P = CscMatrix::<f64>::zeros(2, 2);
    let A = CscMatrix::from(&[[1., 0.], [0., 1.], [1., 2.], [3., 1.]]);
    let q = [-1., -1.];
    let inf = f64::INFINITY;
    let l = [0., 0., -inf, -inf];
    let u = [inf, inf, 4., 6.];

    let settings = DefaultSettings {
        polish: true,
        ..accurate_settings()
    };
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[1.6, 1.2]) <= 1e-4);
    assert!(f64::abs(solver.solution.obj_val + 2.8) <= 1e-4);
}

#[test]
fn test_qp_max_iter() {
    let (P, q, A, l, u) = basic_qp_data();
    let settings = DefaultSettings {
        max_iter: 2,
        eps_abs: 1e-12,
        eps_rel: 1e-12,
        eps_prim_inf: 1e-12,
        eps_dual_inf: 1e-12,
        ..accurate_settings()
    };

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    // the last iterate is returned
    assert_eq!(solver.solution.status, SolverStatus::MaxIterReached);
    assert_eq!(solver.solution.iterations, 2);
    assert!(solver.solution.x.is_finite());
    assert!(solver.solution.obj_val.is_finite());
}

#[test]
fn test_qp_time_limit() {
    let (P, q, A, l, u) = basic_qp_data();
    let settings = DefaultSettings {
        time_limit: 0.0,
        eps_abs: 1e-12,
        eps_rel: 1e-12,
        eps_prim_inf: 1e-12,
        eps_dual_inf: 1e-12,
        ..accurate_settings()
    };

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::TimeLimitReached);
    assert_eq!(solver.solution.iterations, 1);
}

#[test]
fn test_qp_approximate_solution() {
    let (P, q, A, l, u) = basic_qp_data();

    // iterations needed for a loose tolerance
    let settings = DefaultSettings {
        eps_abs: 1e-3,
        eps_rel: 1e-3,
        warm_start: false,
        ..accurate_settings()
    };
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    let loose_iters = solver.info.iterations;

    // the same iterate only meets a 10x tighter tolerance approximately
    let settings = DefaultSettings {
        eps_abs: 1e-4,
        eps_rel: 1e-4,
        max_iter: loose_iters,
        check_termination: 0,
        ..accurate_settings()
    };
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    assert!(matches!(
        solver.solution.status,
        SolverStatus::Solved | SolverStatus::SolvedInaccurate
    ));
}

#[test]
fn test_qp_f32() {
    let P = CscMatrix::<f32>::identity(2);
    let A = CscMatrix::<f32>::identity(2);
    let q = [-2f32, -2.];
    let l = [0f32, 0.];
    let u = [1f32, 1.];

    let settings = DefaultSettingsBuilder::<f32>::default()
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[1., 1.]) <= 1e-2);
}

#[test]
fn test_qp_release() {
    let (P, q, A, l, u) = basic_qp_data();
    let mut solver = Solver::new(&P, &q, &A, &l, &u, accurate_settings()).unwrap();
    solver.release();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Error);
    assert!(solver.solution.x.iter().all(|v| v.is_nan()));
}
