#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
use splitqp::{algebra::*, solver::*};

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

fn api_dim_check_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::<f64>::spalloc(4, 4, 0);
    let q = vec![0.; 4];
    let A = CscMatrix::<f64>::spalloc(6, 4, 0);
    let l = vec![-1.; 6];
    let u = vec![1.; 6];
    (P, q, A, l, u)
}

fn settings() -> DefaultSettings<f64> {
    DefaultSettings {
        verbose: false,
        ..DefaultSettings::default()
    }
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks

    let (P, q, A, l, u) = api_dim_check_data();
    assert!(Solver::new(&P, &q, &A, &l, &u, settings()).is_ok());
}

#[test]
fn api_dim_check_bad_P() {
    let (_P, q, A, l, u) = api_dim_check_data();
    let P = CscMatrix::<f64>::spalloc(3, 3, 0);

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_dim_check_bad_A_rows() {
    let (P, q, _A, l, u) = api_dim_check_data();
    let A = CscMatrix::<f64>::spalloc(5, 4, 0);

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_dim_check_bad_A_cols() {
    let (P, q, _A, l, u) = api_dim_check_data();
    let A = CscMatrix::<f64>::spalloc(6, 3, 0);

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_dim_check_P_not_square() {
    let (_P, q, A, l, u) = api_dim_check_data();
    let P = CscMatrix::<f64>::spalloc(4, 3, 0);

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_dim_check_bad_q() {
    let (P, _q, A, l, u) = api_dim_check_data();
    let q = vec![0.; 5];

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_dim_check_bad_bounds() {
    let (P, q, A, l, u) = api_dim_check_data();

    assert!(matches!(
        Solver::new(&P, &q, &A, &l[0..5], &u, settings()),
        Err(SolverError::BadDimensions)
    ));
    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u[0..5], settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_dim_check_no_variables() {
    let P = CscMatrix::<f64>::spalloc(0, 0, 0);
    let A = CscMatrix::<f64>::spalloc(0, 0, 0);

    assert!(matches!(
        Solver::new(&P, &[], &A, &[], &[], settings()),
        Err(SolverError::BadDimensions)
    ));
}

#[test]
fn api_check_bad_format() {
    let (P, q, _A, l, u) = api_dim_check_data();

    // colptr has the wrong length
    let A = CscMatrix::<f64> {
        m: 6,
        n: 4,
        colptr: vec![0, 0, 0],
        rowval: vec![],
        nzval: vec![],
    };

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::Format(_))
    ));
}

#[test]
fn api_check_lower_triangle() {
    let (_P, q, A, l, u) = api_dim_check_data();
    let mut P = CscMatrix::<f64>::identity(4);
    P.rowval[0] = 1;

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::NotUpperTriangular)
    ));
}

#[test]
fn api_check_bad_bounds() {
    let (P, q, A, mut l, u) = api_dim_check_data();
    l[3] = 2.;

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::InvalidBounds)
    ));
}

#[test]
fn api_check_nonfinite_data() {
    let (P, mut q, A, l, mut u) = api_dim_check_data();

    // infinite bounds are fine
    u[0] = f64::INFINITY;
    assert!(Solver::new(&P, &q, &A, &l, &u, settings()).is_ok());

    u[0] = f64::NAN;
    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::NonFiniteData)
    ));

    u[0] = 1.;
    q[0] = f64::INFINITY;
    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings()),
        Err(SolverError::NonFiniteData)
    ));
}

#[test]
fn api_check_bad_settings() {
    let (P, q, A, l, u) = api_dim_check_data();
    let settings = DefaultSettings {
        alpha: 2.5,
        ..settings()
    };

    assert!(matches!(
        Solver::new(&P, &q, &A, &l, &u, settings),
        Err(SolverError::Settings(SettingsError::BadFieldValue("alpha")))
    ));
}
