#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

fn settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap()
}

#[test]
fn test_primal_infeasible() {
    // x ≥ 1 and x ≤ 0
    let P = CscMatrix::identity(1);
    let A = CscMatrix::from(&[[1.], [1.]]);
    let q = [0.];
    let inf = f64::INFINITY;
    let l = [1., -inf];
    let u = [inf, 0.];

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings()).unwrap();
    solver.solve();

    let sol = &solver.solution;
    assert_eq!(sol.status, SolverStatus::PrimalInfeasible);
    assert!(sol.dual_inf_cert.is_none());
    assert!(sol.x.iter().all(|v| v.is_nan()));
    assert_eq!(sol.obj_val, f64::INFINITY);

    // Aᵀδy ≈ 0 and uᵀδy⁺ + lᵀδy⁻ < 0, with δy normalized
    let cert = sol.prim_inf_cert.as_ref().unwrap();
    assert!((cert.norm_inf() - 1.).abs() < 1e-12);

    let mut Atdy = vec![0.];
    A.t().gemv(&mut Atdy, cert, 1., 0.);
    assert!(Atdy.norm_inf() <= 1e-3);

    // finite bounds only: a one sided row has no component
    // towards its infinite bound
    assert!(cert[0] <= 0. && cert[1] >= 0.);
    let support = l[0] * cert[0] + u[1] * cert[1];
    assert!(support < 0.);
}

#[test]
fn test_primal_infeasible_equality() {
    // x₁ + x₂ = 1 and x₁ + x₂ = 2
    let P = CscMatrix::<f64>::zeros(2, 2);
    let A = CscMatrix::from(&[[1., 1.], [1., 1.]]);
    let q = [1., 1.];
    let l = [1., 2.];
    let u = [1., 2.];

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings()).unwrap();
    solver.solve();

    assert!(solver.solution.status.is_primal_infeasible());
    let cert = solver.solution.prim_inf_cert.as_ref().unwrap();
    assert!(f64::abs(cert[0] + cert[1]) <= 1e-3);
    // δy ∝ (1, -1): u₁δy₁⁺ + l₂δy₂⁻ = 1 - 2 < 0
    assert!(cert[0] * cert[1] < 0.);
}

#[test]
fn test_dual_infeasible() {
    // P = [1 1;1 1], q = [1, -1],  Ax ≤ [1, 1] with A = [1 1;1 0]
    let P = CscMatrix::from(&[[1., 1.], [0., 1.]]);
    let A = CscMatrix::from(&[[1., 1.], [1., 0.]]);
    let q = [1., -1.];
    let inf = f64::INFINITY;
    let l = [-inf, -inf];
    let u = [1., 1.];

    let mut solver = Solver::new(&P, &q, &A, &l, &u, settings()).unwrap();
    solver.solve();

    let sol = &solver.solution;
    assert_eq!(sol.status, SolverStatus::DualInfeasible);
    assert!(sol.prim_inf_cert.is_none());
    assert_eq!(sol.obj_val, -f64::INFINITY);

    // Pδx ≈ 0, Aδx ≤ 0, qᵀδx < 0
    let cert = sol.dual_inf_cert.as_ref().unwrap();
    let mut Pdx = vec![0.; 2];
    P.sym().symv(&mut Pdx, cert, 1., 0.);
    assert!(Pdx.norm_inf() <= 1e-3);

    let mut Adx = vec![0.; 2];
    A.gemv(&mut Adx, cert, 1., 0.);
    assert!(Adx.iter().all(|&v| v <= 1e-3));
    assert!(q.dot(cert) < 0.);
}

#[test]
fn test_dual_infeasible_lp() {
    // min -x  s.t.  x ≥ 0
    let P = CscMatrix::<f64>::zeros(1, 1);
    let A = CscMatrix::identity(1);

    let mut solver = Solver::new(&P, &[-1.], &A, &[0.], &[f64::INFINITY], settings()).unwrap();
    solver.solve();

    assert!(solver.solution.status.is_dual_infeasible());
    let cert = solver.solution.dual_inf_cert.as_ref().unwrap();
    assert!((cert[0] - 1.).abs() < 1e-12);
}

#[test]
fn test_infeasible_no_polish() {
    let P = CscMatrix::identity(1);
    let A = CscMatrix::from(&[[1.], [1.]]);
    let inf = f64::INFINITY;

    let settings = DefaultSettings {
        polish: true,
        ..settings()
    };
    let mut solver = Solver::new(&P, &[0.], &A, &[1., -inf], &[inf, 0.], settings).unwrap();
    solver.solve();

    assert!(solver.solution.status.is_primal_infeasible());
    assert_eq!(solver.info.status_polish, PolishStatus::NotPerformed);
}
