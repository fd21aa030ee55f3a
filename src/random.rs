use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Uniform index selection, injected wherever the assistant picks "at random"
/// (trend updates, fallback replies, simulated place names).
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick_index(&self, len: usize) -> usize;
}

pub fn pick<'a, T>(rng: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    // Clamp in case a stub hands back something out of range
    items.get(rng.pick_index(items.len()) % items.len())
}

// Backed by the thread-local generator
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

// Reproducible picks for VENDORAI_SEED
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}

// Always the same index, wrapped to the slice length
pub struct FixedIndex(pub usize);

impl RandomSource for FixedIndex {
    fn pick_index(&self, len: usize) -> usize {
        self.0 % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_on_empty_slice_is_none() {
        let items: [u8; 0] = [];
        assert_eq!(pick(&FixedIndex(3), &items), None);
    }

    #[test]
    fn fixed_index_wraps_to_length() {
        let items = ["a", "b", "c"];
        assert_eq!(pick(&FixedIndex(4), &items), Some(&"b"));
    }

    #[test]
    fn seeded_random_repeats_for_same_seed() {
        let first = SeededRandom::new(42);
        let second = SeededRandom::new(42);
        let a: Vec<usize> = (0..16).map(|_| first.pick_index(6)).collect();
        let b: Vec<usize> = (0..16).map(|_| second.pick_index(6)).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|i| *i < 6));
    }
}
