#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn adaptive_rho_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    // P = [4. 1;1 2]
    let P = CscMatrix::from(&[[4., 1.], [0., 2.]]);
    let A = CscMatrix::from(&[
        [1., 1.], //
        [1., 0.], //
        [0., 1.], //
    ]);
    let q = vec![1., 1.];
    let l = vec![1., 0., 0.];
    let u = vec![1., 0.7, 0.7];
    (P, q, A, l, u)
}

#[test]
fn test_adaptive_rho_recovers_from_bad_rho() {
    let (P, q, A, l, u) = adaptive_rho_data();

    // an initial penalty far too small for the active constraints
    let settings = DefaultSettingsBuilder::default()
        .rho(1e-6)
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.info.rho_updates > 0);
    assert!(solver.workspace.rho > 1e-6);
    assert!(solver.info.rho_estimate > 0.);
    assert!(solver.solution.x.dist(&[0.3, 0.7]) <= 1e-4);

    // penalties stay positive and consistent with their inverses
    let ws = &solver.workspace;
    assert!(ws.rho_vec.iter().all(|&r| r > 0.));
    for (r, rinv) in std::iter::zip(&ws.rho_vec, &ws.rho_inv_vec) {
        assert!((r * rinv - 1.).abs() < 1e-12);
    }
}

#[test]
fn test_adaptive_rho_disabled() {
    let (P, q, A, l, u) = adaptive_rho_data();
    let settings = DefaultSettingsBuilder::default()
        .adaptive_rho(false)
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert!(solver.solution.status.is_solved());
    assert_eq!(solver.info.rho_updates, 0);
    assert_eq!(solver.workspace.rho, solver.settings.rho);
}

#[test]
fn test_equality_rows_have_larger_penalty() {
    let (P, q, A, l, u) = adaptive_rho_data();
    let settings = DefaultSettings {
        verbose: false,
        ..DefaultSettings::default()
    };
    let solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();

    let ws = &solver.workspace;
    assert_eq!(ws.constr_type[0], ConstraintType::Equality);
    assert_eq!(ws.constr_type[1], ConstraintType::Inequality);
    assert!(ws.rho_vec[0] > ws.rho_vec[1]);
    assert_eq!(ws.rho_vec[1], ws.rho);
}

#[test]
fn test_update_rho() {
    let (P, q, A, l, u) = adaptive_rho_data();
    let settings = DefaultSettings {
        verbose: false,
        ..DefaultSettings::default()
    };
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();

    assert!(solver.update_rho(2.0).is_ok());
    assert_eq!(solver.workspace.rho, 2.0);
    assert_eq!(solver.settings.rho, 2.0);
    assert_eq!(solver.workspace.rho_vec[1], 2.0);

    // out of range values are clamped
    assert!(solver.update_rho(1e9).is_ok());
    assert_eq!(solver.workspace.rho, 1e6);

    // non-positive values are rejected
    assert!(matches!(
        solver.update_rho(0.),
        Err(DataUpdateError::Settings(_))
    ));
    assert!(matches!(
        solver.update_rho(f64::NAN),
        Err(DataUpdateError::Settings(_))
    ));
    assert_eq!(solver.workspace.rho, 1e6);

    // still solves after the change
    solver.solve();
    assert!(solver.solution.status.is_solved());
    assert!(solver.solution.x.dist(&[0.3, 0.7]) <= 1e-2);
}

#[test]
fn test_rho_change_through_settings() {
    let (P, q, A, l, u) = adaptive_rho_data();
    let settings = DefaultSettings {
        verbose: false,
        ..DefaultSettings::default()
    };
    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();

    let newsettings = DefaultSettings { rho: 3.0, ..settings };
    assert!(solver.update_settings(newsettings).is_ok());
    assert_eq!(solver.workspace.rho, 3.0);
}
