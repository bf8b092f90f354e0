#![allow(non_snake_case)]

use std::iter::zip;

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn updating_test_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<f64>,
    DefaultSettings<f64>,
) {
    // huge values to ensure equilibration
    // scaling term is small and carries
    // through update
    let P = CscMatrix::from(&[
        [40000., 1.], //
        [0., 20000.], //
    ]);
    let q = vec![10000.; 2];

    // -1 ≤ x ≤ 1
    let A = CscMatrix::identity(2);
    let l = vec![-1.; 2];
    let u = vec![1.; 2];

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .max_iter(20000)
        .polish(true)
        .verbose(false)
        .build()
        .unwrap();

    (P, q, A, l, u, settings)
}

fn assert_same_solution(solver1: &Solver<f64>, solver2: &Solver<f64>) {
    assert!(solver1.solution.status.is_solved());
    assert!(solver2.solution.status.is_solved());
    assert!(solver1.solution.x.dist(&solver2.solution.x) <= 1e-5);
}

#[test]
fn test_update_P_matrix_form() {
    // original problem
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    // change P and re-solve
    let mut P2 = P.clone();
    P2.nzval[0] = 100.;

    // revised original solver
    assert!(solver1.update_P(&P2).is_ok());
    assert_eq!(solver1.solution.status, SolverStatus::Unsolved);
    solver1.solve();

    //new solver
    let mut solver2 = Solver::new(&P2, &q, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_P_vector_form() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let mut P2 = P.clone();
    P2.nzval[0] = 100.;

    assert!(solver1.update_P(&P2.nzval).is_ok());
    solver1.solve();

    let mut solver2 = Solver::new(&P2, &q, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_P_tuple() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    // revised original solver
    let values = [3., 5.];
    let index = [1, 2];
    let Pdata = zip(&index, &values);
    assert!(solver1.update_P(&Pdata).is_ok());
    solver1.solve();

    // new solver
    let P2 = CscMatrix::from(&[
        [40000., 3.], //
        [0., 5.],     //
    ]);
    let mut solver2 = Solver::new(&P2, &q, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_A_matrix_form() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let mut A2 = A.clone();
    A2.nzval[1] = 0.5;

    assert!(solver1.update_A(&A2).is_ok());
    solver1.solve();

    let mut solver2 = Solver::new(&P, &q, &A2, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_P_A() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let mut P2 = P.clone();
    P2.nzval[2] = 10.;
    let mut A2 = A.clone();
    A2.nzval[0] = 2.;

    assert!(solver1.update_P_A(&P2.nzval, &A2.nzval).is_ok());
    solver1.solve();

    let mut solver2 = Solver::new(&P2, &q, &A2, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_q() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let q2 = vec![-10., 0.];
    assert!(solver1.update_q(&q2).is_ok());
    solver1.solve();

    let mut solver2 = Solver::new(&P, &q2, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_q_tuple() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let values = [-10.];
    let index = [1];
    assert!(solver1.update_q(&zip(&index, &values)).is_ok());
    solver1.solve();

    let q2 = vec![10000., -10.];
    let mut solver2 = Solver::new(&P, &q2, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_bounds() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let l2 = vec![-0.1, -0.2];
    let u2 = vec![0.3, f64::INFINITY];
    assert!(solver1.update_bounds(&l2, &u2).is_ok());
    solver1.solve();

    let mut solver2 = Solver::new(&P, &q, &A, &l2, &u2, settings.clone()).unwrap();
    solver2.solve();
    assert_same_solution(&solver1, &solver2);

    // one side at a time
    let l3 = vec![-0.5, -0.5];
    assert!(solver1.update_lower_bound(&l3).is_ok());
    let u3 = vec![0.5, 0.5];
    assert!(solver1.update_upper_bound(&u3).is_ok());
    solver1.solve();

    let mut solver3 = Solver::new(&P, &q, &A, &l3, &u3, settings).unwrap();
    solver3.solve();
    assert_same_solution(&solver1, &solver3);
}

#[test]
fn test_update_bounds_to_equality() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    // the first row becomes an equality constraint
    let l2 = vec![0.25, -1.];
    let u2 = vec![0.25, 1.];
    assert!(solver1.update_bounds(&l2, &u2).is_ok());
    solver1.solve();
    assert!(f64::abs(solver1.solution.x[0] - 0.25) <= 1e-6);

    let mut solver2 = Solver::new(&P, &q, &A, &l2, &u2, settings).unwrap();
    solver2.solve();
    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_data() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let mut P2 = P.clone();
    P2.nzval[0] = 4.;
    let q2 = vec![1., -1.];
    let mut A2 = A.clone();
    A2.nzval[1] = 3.;
    let l2 = vec![-2., -2.];
    let u2 = vec![2., 0.5];

    assert!(solver1.update_data(&P2, &q2, &A2, &l2, &u2).is_ok());
    solver1.solve();

    let mut solver2 = Solver::new(&P2, &q2, &A2, &l2, &u2, settings).unwrap();
    solver2.solve();

    assert_same_solution(&solver1, &solver2);
}

#[test]
fn test_update_noops() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    let x = solver.solution.x.clone();

    // empty updates change nothing
    let empty: Vec<f64> = vec![];
    assert!(solver.update_q(&empty).is_ok());
    assert!(solver.update_bounds(&empty, &empty).is_ok());
    assert!(solver.update_P(&empty).is_ok());
    assert!(solver.update_A(&empty).is_ok());

    solver.solve();
    assert!(solver.solution.x.dist(&x) <= 1e-6);
}

#[test]
fn test_update_errors() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver.solve();
    let x = solver.solution.x.clone();

    // bad dimensions
    assert!(matches!(
        solver.update_q(&vec![1.; 3]),
        Err(DataUpdateError::BadFormat(_))
    ));
    assert!(matches!(
        solver.update_P(&vec![1.; 2]),
        Err(DataUpdateError::BadFormat(_))
    ));
    let index = [7];
    let values = [1.];
    assert!(matches!(
        solver.update_A(&zip(&index, &values)),
        Err(DataUpdateError::BadFormat(_))
    ));

    // mismatched sparsity
    let A2 = CscMatrix::from(&[[1., 1.], [0., 1.]]);
    assert!(matches!(
        solver.update_A(&A2),
        Err(DataUpdateError::BadFormat(_))
    ));

    // l > u
    assert!(matches!(
        solver.update_lower_bound(&vec![2., 0.]),
        Err(DataUpdateError::InvalidBounds)
    ));

    // NaN values
    assert!(matches!(
        solver.update_q(&vec![f64::NAN, 0.]),
        Err(DataUpdateError::NonFiniteData)
    ));
    assert!(matches!(
        solver.update_P(&vec![f64::INFINITY, 1., 1.]),
        Err(DataUpdateError::NonFiniteData)
    ));

    // none of the failed updates changed the problem
    solver.solve();
    assert!(solver.solution.x.dist(&x) <= 1e-6);
}

#[test]
fn test_matrix_updates_disabled() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let settings = DefaultSettings {
        matrix_updates_enable: false,
        ..settings
    };
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();

    assert!(matches!(
        solver.update_P(&P),
        Err(DataUpdateError::Linsys(LinsysError::Unsupported))
    ));

    // vector updates are still allowed
    assert!(solver.update_q(&vec![1., 1.]).is_ok());
    assert!(solver.update_bounds(&vec![0., 0.], &vec![1., 1.]).is_ok());
    solver.solve();
    assert!(solver.solution.status.is_solved());
    assert!(solver.solution.x.dist(&[0., 0.]) <= 1e-6);
}

#[test]
fn test_failed_factorization_restores_problem() {
    // min ½‖x‖²  s.t.  1 ≤ x ≤ 2
    let P = CscMatrix::identity(2);
    let q = vec![0.; 2];
    let A = CscMatrix::identity(2);
    let l = vec![1.; 2];
    let u = vec![2.; 2];
    let settings = DefaultSettingsBuilder::default()
        .scaling(0)
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();

    // a nonconvex objective can't be factored
    assert!(matches!(
        solver.update_P(&vec![-1e3, -1e3]),
        Err(DataUpdateError::Linsys(LinsysError::FactorizationFailure))
    ));
    assert_eq!(solver.workspace.data.P.nzval, vec![1., 1.]);

    // the original problem is solved
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&[1., 1.]) <= 1e-4);
}

#[test]
fn test_failed_linsys_update_leaves_data() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    solver.release();

    let lold = solver.workspace.data.l.clone();
    let uold = solver.workspace.data.u.clone();
    let Pold = solver.workspace.data.P.clone();
    let rho_vec = solver.workspace.rho_vec.clone();

    // turning a row into an equality changes its penalty
    assert!(matches!(
        solver.update_bounds(&vec![0.25, -1.], &vec![0.25, 1.]),
        Err(DataUpdateError::Linsys(LinsysError::Released))
    ));
    assert_eq!(solver.workspace.data.l, lold);
    assert_eq!(solver.workspace.data.u, uold);
    assert!(solver
        .workspace
        .constr_type
        .iter()
        .all(|&c| c == ConstraintType::Inequality));
    assert_eq!(solver.workspace.rho_vec, rho_vec);

    let mut P2 = P.clone();
    P2.nzval[0] = 100.;
    assert!(matches!(
        solver.update_P(&P2),
        Err(DataUpdateError::Linsys(LinsysError::Released))
    ));
    assert_eq!(solver.workspace.data.P, Pold);

    let rho = solver.workspace.rho;
    assert!(matches!(
        solver.update_rho(rho * 10.),
        Err(DataUpdateError::Linsys(LinsysError::Released))
    ));
    assert_eq!(solver.workspace.rho, rho);
    assert_eq!(solver.workspace.rho_vec, rho_vec);
}
