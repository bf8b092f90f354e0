use super::{FloatT, ScalarMath, VectorMath};
use itertools::izip;
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        for x in &mut *self {
            *x = op(*x);
        }
        self
    }

    fn scalarop_from(&mut self, op: impl Fn(T) -> T, v: &[T]) -> &mut Self {
        for (x, v) in zip(&mut *self, v) {
            *x = op(*v);
        }
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.scalarop(|x| x * c)
    }

    fn recip(&mut self) -> &mut Self {
        self.scalarop(T::recip)
    }

    fn rsqrt(&mut self) -> &mut Self {
        self.scalarop(|x| T::recip(T::sqrt(x)))
    }

    fn negate(&mut self) -> &mut Self {
        self.scalarop(|x| -x)
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        zip(&mut *self, y).for_each(|(x, y)| *x *= *y);
        self
    }

    fn clip(&mut self, min_thresh: T, max_thresh: T, min_new: T, max_new: T) -> &mut Self {
        self.scalarop(|x| x.clip(min_thresh, max_thresh, min_new, max_new))
    }

    fn project_box(&mut self, lo: &[T], hi: &[T]) -> &mut Self {
        assert_eq!(self.len(), lo.len());
        assert_eq!(self.len(), hi.len());
        for (x, &l, &u) in izip!(&mut *self, lo, hi) {
            *x = x.clamp_to(l, u);
        }
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        pairwise_sum(self.len(), &|i| self[i] * y[i])
    }

    fn dist(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        let d2 = pairwise_sum(self.len(), &|i| {
            let d = self[i] - y[i];
            d * d
        });
        T::sqrt(d2)
    }

    fn sum(&self) -> T {
        pairwise_sum(self.len(), &|i| self[i])
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn norm(&self) -> T {
        T::sqrt(self.sumsq())
    }

    fn norm_scaled(&self, v: &[T]) -> T {
        assert_eq!(self.len(), v.len());
        let total = pairwise_sum(self.len(), &|i| {
            let p = self[i] * v[i];
            p * p
        });
        T::sqrt(total)
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = T::max(out, v);
        }
        out
    }

    fn norm_inf_scaled(&self, v: &[T]) -> T {
        assert_eq!(self.len(), v.len());
        zip(self, v).fold(T::zero(), |acc, (&x, &y)| T::max(acc, T::abs(x * y)))
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        assert_eq!(self.len(), b.len());
        zip(self, b).fold(T::zero(), |acc, (&x, &y)| T::max(acc, T::abs(x - y)))
    }

    fn mean(&self) -> T {
        if self.is_empty() {
            T::zero()
        } else {
            let len = T::from_usize(self.len()).unwrap_or_else(T::one);
            self.sum() / len
        }
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|&x| T::is_finite(x))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        zip(&mut *self, x).for_each(|(y, &x)| *y = a * x + b * (*y));
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (w, &x, &y) in izip!(&mut *self, x, y) {
            *w = a * x + b * y;
        }
        self
    }
}

// ---------------------------------------------------------------------
// pairwise (cascade) summation of f(0) + ... + f(n-1).  Error growth is
// O(log n) rather than O(n) for a naive left fold.

const PAIRWISE_BLOCK: usize = 32;

fn pairwise_sum<T, F>(n: usize, f: &F) -> T
where
    T: FloatT,
    F: Fn(usize) -> T,
{
    fn inner<T: FloatT, F: Fn(usize) -> T>(lo: usize, hi: usize, f: &F) -> T {
        if hi - lo <= PAIRWISE_BLOCK {
            (lo..hi).fold(T::zero(), |acc, i| acc + f(i))
        } else {
            let mid = lo + (hi - lo) / 2;
            inner(lo, mid, f) + inner(mid, hi, f)
        }
    }
    inner(0, n, f)
}

#[test]
fn test_dot_and_norms() {
    let x = vec![1., -2., 3., 4.];
    let y = vec![4., 5., 6., 7.];
    assert_eq!(x.dot(&y), 40.);
    assert_eq!(x.norm_inf(), 4.);
    assert_eq!(x.norm_inf_scaled(&y), 28.);
    assert_eq!(x.norm_inf_diff(&y), 7.);
    assert_eq!(x.sumsq(), 30.);
}

#[test]
fn test_mean_pairwise() {
    let x = vec![1., 2., 3., 4., 5.];
    assert_eq!(x.mean(), 3.);
    assert_eq!(x[0..0].mean(), 0.);

    // naive f32 summation of this many values drifts badly,
    // but the cascade sum should be exact here
    let n = 10_000_000usize;
    let x = vec![1.5f32; n];
    assert_eq!(x.mean(), 1.5f32);
}

#[test]
fn test_sum_awkward_lengths() {
    let x: Vec<f64> = (1..=(PAIRWISE_BLOCK * 7 + 3)).map(|x| x as f64).collect();
    for i in 0..=x.len() {
        let z = &x[0..i];
        let naive = z.iter().fold(0.0, |acc, &z| acc + z);
        assert_eq!(naive, z.sum());
    }
}

#[test]
fn test_project_box() {
    let mut x = vec![-5., 0.5, 7.];
    let l = vec![-1., -1., -f64::INFINITY];
    let u = vec![1., 1., 2.];
    x.project_box(&l, &u);
    assert_eq!(x, vec![-1., 0.5, 2.]);
}
