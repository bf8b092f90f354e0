use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;
    fn clip(&self, min_thresh: T, max_thresh: T, min_new: T, max_new: T) -> T {
        if *self < min_thresh {
            min_new
        } else if *self > max_thresh {
            max_new
        } else {
            *self
        }
    }

    fn clamp_to(&self, lo: T, hi: T) -> T {
        T::min(T::max(*self, lo), hi)
    }
}

#[test]
fn test_scalar_clip() {
    assert_eq!(1e-6_f64.clip(1e-4, 1e4, 1.0, 1e4), 1.0);
    assert_eq!(1e6_f64.clip(1e-4, 1e4, 1.0, 1e4), 1e4);
    assert_eq!(3.0_f64.clip(1e-4, 1e4, 1.0, 1e4), 3.0);
    assert_eq!(3.0_f64.clamp_to(-1.0, 2.0), 2.0);
    assert_eq!((-3.0_f64).clamp_to(-1.0, 2.0), -1.0);
}
