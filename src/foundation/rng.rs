use std::sync::atomic::{AtomicU64, Ordering};

const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 generator with an atomic state word.
///
/// Every draw is a single `fetch_add`, so one generator can be shared by reference between the
/// render thread and the maintenance thread without a lock.
#[derive(Debug)]
pub struct Rng64 {
    state: AtomicU64,
}

impl Rng64 {
    /// Create a generator from an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }

    /// Create a generator seeded from the wall clock and process id.
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos ^ (u64::from(std::process::id()) << 32))
    }

    /// Create a generator from `seed` when present, otherwise from entropy.
    pub fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None => Self::from_entropy(),
        }
    }

    /// Derive an independent child generator.
    pub fn fork(&self) -> Self {
        Self::new(self.next_u64())
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&self) -> u64 {
        let mut z = self
            .state
            .fetch_add(GAMMA, Ordering::Relaxed)
            .wrapping_add(GAMMA);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, n)`.
    ///
    /// Panics when `n == 0`.
    pub fn random(&self, n: usize) -> usize {
        assert!(n > 0, "random(n) requires n > 0");
        // Lemire's multiply-shift reduction.
        ((u128::from(self.next_u64()) * n as u128) >> 64) as usize
    }

    /// Uniform value in `[0, n) \ {x}`.
    ///
    /// Panics when `n < 2`.
    pub fn random_excluding(&self, n: usize, x: usize) -> usize {
        assert!(n >= 2, "random_excluding(n, x) requires n >= 2");
        let r = self.random(n - 1);
        if r >= x { r + 1 } else { r }
    }

    /// `true` with probability `1/k`. `k == 0` never fires.
    pub fn random_chance(&self, k: usize) -> bool {
        k != 0 && self.random(k) == 0
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.random(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
