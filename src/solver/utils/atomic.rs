use std::sync::atomic::AtomicU64;
pub(crate) use std::sync::atomic::Ordering;

// f64 with atomic load / store, held as its bit pattern
#[derive(Debug)]
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub(crate) fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    pub(crate) fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    pub(crate) fn store(&self, v: f64, order: Ordering) {
        self.0.store(v.to_bits(), order)
    }
}

#[test]
fn test_atomic_f64() {
    let a = AtomicF64::new(1.5);
    assert_eq!(a.load(Ordering::Relaxed), 1.5);
    a.store(-2e30, Ordering::Relaxed);
    assert_eq!(a.load(Ordering::Relaxed), -2e30);
}
