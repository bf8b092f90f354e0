#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn linsys_test_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::from(&[
        [4., 1., 0.], //
        [0., 2., 0.], //
        [0., 0., 1.], //
    ]);
    let A = CscMatrix::from(&[
        [1., 1., 1.],  //
        [1., 0., 0.],  //
        [0., 1., 0.],  //
        [0., 0., 1.],  //
        [1., -1., 0.], //
    ]);
    let q = vec![1., 1., -1.];
    let l = vec![1., 0., 0., 0., -f64::INFINITY];
    let u = vec![1., 0.7, 0.7, 0.7, 0.1];
    (P, q, A, l, u)
}

fn settings(linsys_solver: &str) -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .linsys_solver(linsys_solver)
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .max_iter(10000)
        .verbose(false)
        .build()
        .unwrap()
}

#[test]
fn test_linsys_pcg_matches_qdldl() {
    let (P, q, A, l, u) = linsys_test_data();

    let mut direct = Solver::new(&P, &q, &A, &l, &u, settings("qdldl")).unwrap();
    direct.solve();
    assert_eq!(direct.workspace.linsys.name(), "qdldl");
    assert!(direct.workspace.linsys.is_direct());

    let mut indirect = Solver::new(&P, &q, &A, &l, &u, settings("pcg")).unwrap();
    indirect.solve();
    assert_eq!(indirect.workspace.linsys.name(), "pcg");
    assert!(!indirect.workspace.linsys.is_direct());

    assert_eq!(direct.solution.status, SolverStatus::Solved);
    assert_eq!(indirect.solution.status, SolverStatus::Solved);
    assert!(direct.solution.x.dist(&indirect.solution.x) <= 1e-5);
    assert!(direct.solution.y.dist(&indirect.solution.y) <= 1e-4);
    assert!(f64::abs(direct.solution.obj_val - indirect.solution.obj_val) <= 1e-5);
}

#[test]
fn test_linsys_pcg_matrix_update() {
    let (P, q, A, l, u) = linsys_test_data();

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings("pcg")).unwrap();
    solver.solve();

    let mut P2 = P.clone();
    P2.nzval[0] = 10.;
    solver.update_P(&P2).unwrap();
    solver.solve();

    let mut reference = Solver::new(&P2, &q, &A, &l, &u, settings("qdldl")).unwrap();
    reference.solve();

    assert!(solver.solution.status.is_solved());
    assert!(solver.solution.x.dist(&reference.solution.x) <= 1e-5);
}

#[test]
fn test_linsys_pcg_polish() {
    // polishing always factors its reduced system directly
    let (P, q, A, l, u) = linsys_test_data();
    let settings = DefaultSettings {
        polish: true,
        ..settings("pcg")
    };

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    assert!(solver.solution.status.is_solved());
    assert_ne!(solver.info.status_polish, PolishStatus::NotPerformed);
}

#[test]
fn test_linsys_unknown_solver() {
    let (P, q, A, l, u) = linsys_test_data();
    let settings = DefaultSettings::<f64> {
        linsys_solver: "mkl".to_string(),
        ..DefaultSettings::default()
    };

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings),
        Err(SolverError::Settings(SettingsError::BadFieldValue(
            "linsys_solver"
        )))
    ));
}

#[test]
fn test_linsys_release() {
    let (P, q, A, l, u) = linsys_test_data();

    for name in ["qdldl", "pcg"] {
        let mut solver = Solver::new(&P, &q, &A, &l, &u, settings(name)).unwrap();
        solver.release();

        assert!(matches!(
            solver.update_rho(1.0),
            Err(DataUpdateError::Linsys(LinsysError::Released))
        ));
        solver.solve();
        assert_eq!(solver.solution.status, SolverStatus::Error);
    }
}
