use std::sync::atomic::{AtomicU32, Ordering};

/// Shared count of accepted swaps. Kernel invocations only ever add to it.
#[derive(Debug, Default)]
pub struct AcceptCounter {
    value: AtomicU32,
}

impl AcceptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Only meaningful once the pass that increments it has completed.
    pub fn read(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn parallel_increments_sum_up() {
        let counter = AcceptCounter::new();
        (0..10_000).into_par_iter().for_each(|_| counter.increment());
        assert_eq!(counter.read(), 10_000);

        counter.reset();
        assert_eq!(counter.read(), 0);
    }
}
