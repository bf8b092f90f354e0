#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;

// ---------------
// Data type for the problem  min ½x'Px + q'x  s.t. l ≤ Ax ≤ u
// ---------------

/// Problem data held by the solver, in scaled form after setup.
///
/// `P` is upper triangular.  Bounds are clamped to ±[`get_infinity`].

#[derive(Debug, Clone)]
pub struct ProblemData<T> {
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub l: Vec<T>,
    pub u: Vec<T>,
    pub n: usize,
    pub m: usize,
    pub equilibration: Equilibration<T>,
}

impl<T> ProblemData<T>
where
    T: FloatT,
{
    /// Copies the problem data.  Call [`check_problem_data`] first.
    pub fn new(P: &CscMatrix<T>, q: &[T], A: &CscMatrix<T>, l: &[T], u: &[T]) -> Self {
        let (m, n) = A.size();

        let mut l = l.to_vec();
        let mut u = u.to_vec();
        clamp_bounds(&mut l, &mut u);

        let equilibration = Equilibration::<T>::new(n, m);

        Self {
            P: P.clone(),
            q: q.to_vec(),
            A: A.clone(),
            l,
            u,
            n,
            m,
            equilibration,
        }
    }
}

// clamp bounds into [-INFINITY, INFINITY]
pub(crate) fn clamp_bounds<T: FloatT>(l: &mut [T], u: &mut [T]) {
    let infbound: T = get_infinity().as_T();
    l.scalarop(|x| T::max(x, -infbound));
    u.scalarop(|x| T::min(x, infbound));
}

/// Checks user problem data for consistency before setup.
pub(crate) fn check_problem_data<T: FloatT>(
    P: &CscMatrix<T>,
    q: &[T],
    A: &CscMatrix<T>,
    l: &[T],
    u: &[T],
) -> Result<(), SolverError> {
    P.check_format()?;
    A.check_format()?;

    let (m, n) = A.size();

    if n == 0
        || P.nrows() != n
        || P.ncols() != n
        || q.len() != n
        || l.len() != m
        || u.len() != m
    {
        return Err(SolverError::BadDimensions);
    }

    if !P.is_triu() {
        return Err(SolverError::NotUpperTriangular);
    }

    // infinite bounds are allowed, NaN is not
    if !P.nzval.is_finite()
        || !A.nzval.is_finite()
        || !q.is_finite()
        || l.iter().chain(u.iter()).any(|v| v.is_nan())
    {
        return Err(SolverError::NonFiniteData);
    }

    check_bounds(l, u)?;

    Ok(())
}

pub(crate) fn check_bounds<T: FloatT>(l: &[T], u: &[T]) -> Result<(), SolverError> {
    if std::iter::zip(l, u).any(|(l, u)| l > u) {
        Err(SolverError::InvalidBounds)
    } else {
        Ok(())
    }
}

#[test]
fn test_check_problem_data() {
    let P = CscMatrix::<f64>::from(&[[4., 1.], [0., 2.]]);
    let A = CscMatrix::<f64>::from(&[[1., 1.], [1., 0.], [0., 1.]]);
    let q = [1., 1.];
    let l = [1., 0., 0.];
    let u = [1., 0.7, 0.7];

    assert!(check_problem_data(&P, &q, &A, &l, &u).is_ok());

    assert!(matches!(
        check_problem_data(&P, &q[0..1], &A, &l, &u),
        Err(SolverError::BadDimensions)
    ));

    let Pfull = CscMatrix::<f64>::from(&[[4., 1.], [1., 2.]]);
    assert!(matches!(
        check_problem_data(&Pfull, &q, &A, &l, &u),
        Err(SolverError::NotUpperTriangular)
    ));

    assert!(matches!(
        check_problem_data(&P, &[1., f64::NAN], &A, &l, &u),
        Err(SolverError::NonFiniteData)
    ));

    assert!(matches!(
        check_problem_data(&P, &q, &A, &[2., 0., 0.], &u),
        Err(SolverError::InvalidBounds)
    ));

    // one sided and free rows are fine
    let l = [f64::NEG_INFINITY, 0., f64::NEG_INFINITY];
    let u = [1., f64::INFINITY, f64::INFINITY];
    assert!(check_problem_data(&P, &q, &A, &l, &u).is_ok());

    let data = ProblemData::new(&P, &q, &A, &l, &u);
    assert_eq!(data.l[0], -get_infinity());
    assert_eq!(data.u[2], get_infinity());
}
