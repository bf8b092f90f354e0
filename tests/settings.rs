#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

fn settings_test_solver() -> Solver<f64> {
    let P = CscMatrix::identity(2);
    let A = CscMatrix::identity(2);
    let q = [-2., -2.];
    let l = [0., 0.];
    let u = [1., 1.];
    let settings = DefaultSettings {
        verbose: false,
        ..DefaultSettings::default()
    };
    Solver::new(&P, &q, &A, &l, &u, settings).unwrap()
}

#[test]
fn test_update_settings_allowed() {
    let mut solver = settings_test_solver();

    let settings = DefaultSettings {
        max_iter: 50,
        eps_abs: 1e-8,
        eps_rel: 1e-8,
        alpha: 1.2,
        polish: true,
        time_limit: 10.,
        ..solver.settings.clone()
    };
    assert!(solver.update_settings(settings).is_ok());
    assert_eq!(solver.settings.max_iter, 50);

    solver.solve();
    assert!(solver.solution.status.is_solved());
    assert!(solver.solution.x.dist(&[1., 1.]) <= 1e-6);
}

#[test]
fn test_update_settings_immutable() {
    let mut solver = settings_test_solver();
    let prev = solver.settings.clone();

    let settings = DefaultSettings {
        scaling: 3,
        ..prev.clone()
    };
    assert!(matches!(
        solver.update_settings(settings),
        Err(SolverError::Settings(SettingsError::ImmutableSetting(
            "scaling"
        )))
    ));

    let settings = DefaultSettings {
        linsys_solver: "pcg".to_string(),
        ..prev.clone()
    };
    assert!(matches!(
        solver.update_settings(settings),
        Err(SolverError::Settings(SettingsError::ImmutableSetting(
            "linsys_solver"
        )))
    ));

    // invalid values are rejected before anything else
    let settings = DefaultSettings {
        max_iter: 0,
        ..prev.clone()
    };
    assert!(matches!(
        solver.update_settings(settings),
        Err(SolverError::Settings(SettingsError::BadFieldValue(
            "max_iter"
        )))
    ));

    // failed updates leave the settings alone
    assert_eq!(solver.settings, prev);
}

#[test]
fn test_builder_validation() {
    assert!(DefaultSettingsBuilder::<f64>::default()
        .time_limit(-1.)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .eps_prim_inf(0.)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .sigma(f64::NAN)
        .build()
        .is_err());

    let settings = DefaultSettingsBuilder::<f64>::default()
        .termination_norm(NormType::Two)
        .check_termination(0)
        .build()
        .unwrap();
    assert_eq!(settings.termination_norm, NormType::Two);
    assert_eq!(settings.check_termination, 0);
}

#[test]
fn test_two_norm_termination() {
    let mut solver = settings_test_solver();
    let settings = DefaultSettings {
        termination_norm: NormType::Two,
        ..solver.settings.clone()
    };
    solver.update_settings(settings).unwrap();
    solver.solve();
    assert!(solver.solution.status.is_solved());
    assert!(solver.solution.x.dist(&[1., 1.]) <= 1e-2);
}

#[test]
fn test_profiling_disabled() {
    let P = CscMatrix::identity(1);
    let A = CscMatrix::identity(1);
    let settings = DefaultSettings {
        profiling: false,
        verbose: false,
        ..DefaultSettings::default()
    };
    let mut solver = Solver::new(&P, &[1.], &A, &[0.], &[1.], settings).unwrap();
    solver.solve();

    assert!(solver.solution.status.is_solved());
    assert_eq!(solver.info.setup_time, 0.);
    assert_eq!(solver.info.solve_time, 0.);
    assert_eq!(solver.info.run_time, 0.);
}
