//! Work partitioner: distribution key → owning worker.

use hdastar_kernel::transport::Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    worker_count: usize,
}

impl Partitioner {
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    /// `key % worker_count`.
    #[must_use]
    pub fn owner(&self, key: u32) -> Rank {
        key as usize % self.worker_count
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_key_modulo_workers() {
        let p = Partitioner::new(3);
        assert_eq!(p.owner(0), 0);
        assert_eq!(p.owner(4), 1);
        assert_eq!(p.owner(u32::MAX), (u32::MAX % 3) as usize);
    }

    #[test]
    fn single_worker_owns_everything() {
        let p = Partitioner::new(1);
        assert!((0..100).all(|k| p.owner(k) == 0));
    }

    #[test]
    fn zero_workers_is_treated_as_one() {
        assert_eq!(Partitioner::new(0).worker_count(), 1);
    }
}
