// ============================================================
// Batch Scheduler
// ============================================================
// Shuffles the full window list into a random permutation and
// partitions it into consecutive batches of `batch_size`, the
// last batch possibly shorter. Called once per epoch: the RNG
// state advances between calls, so every epoch sees a different
// permutation, while a seeded scheduler replays the same run
// batch-for-batch.
//
// Uses Fisher-Yates via rand::seq::SliceRandom, the standard
// unbiased shuffle.
//
// Reference: rand crate documentation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::Window;

pub struct BatchScheduler {
    batch_size: usize,
    rng: StdRng,
}

impl BatchScheduler {
    /// Scheduler with an entropy-seeded RNG.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            rng: StdRng::from_entropy(),
        }
    }

    /// Scheduler with a fixed seed, for reproducible runs and tests.
    pub fn seeded(batch_size: usize, seed: u64) -> Self {
        Self {
            batch_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Shuffle `windows` and partition into batches for one epoch.
    /// Consumes the window list; the caller re-windows the corpus at the
    /// next epoch boundary.
    pub fn epoch_batches(&mut self, mut windows: Vec<Window>) -> Vec<Vec<Window>> {
        windows.shuffle(&mut self.rng);
        windows
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn toy_windows(n: usize) -> Vec<Window> {
        (0..n as u32).map(|i| vec![i, i + 1]).collect()
    }

    #[test]
    fn test_batch_count_and_sizes() {
        // 10 windows, batch size 4 → ⌈10/4⌉ = 3 batches: 4, 4, 2.
        let batches = BatchScheduler::seeded(4, 1).epoch_batches(toy_windows(10));

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 4);
        assert_eq!(batches[1].len(), 4);
        assert_eq!(batches[2].len(), 2);
    }

    #[test]
    fn test_exact_division_has_no_short_batch() {
        let batches = BatchScheduler::seeded(5, 1).epoch_batches(toy_windows(10));
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 5));
    }

    #[test]
    fn test_no_windows_lost_or_duplicated() {
        let mut scheduler = BatchScheduler::seeded(3, 42);
        let mut seen: Vec<Window> = scheduler
            .epoch_batches(toy_windows(11))
            .into_iter()
            .flatten()
            .collect();
        seen.sort();

        let mut expected = toy_windows(11);
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_successive_epochs_reshuffle() {
        // Same scheduler, same windows: the RNG advances, so two epochs
        // produce different orderings (32 windows → collision odds ~1/32!).
        let mut scheduler = BatchScheduler::seeded(4, 7);
        let first: Vec<Window> = scheduler
            .epoch_batches(toy_windows(32))
            .into_iter()
            .flatten()
            .collect();
        let second: Vec<Window> = scheduler
            .epoch_batches(toy_windows(32))
            .into_iter()
            .flatten()
            .collect();

        assert_ne!(first, second);
    }

    #[test]
    fn test_same_seed_replays_same_permutation() {
        let first = BatchScheduler::seeded(4, 99).epoch_batches(toy_windows(16));
        let second = BatchScheduler::seeded(4, 99).epoch_batches(toy_windows(16));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_window_list_yields_no_batches() {
        let batches = BatchScheduler::seeded(4, 1).epoch_batches(Vec::new());
        assert!(batches.is_empty());
    }
}
