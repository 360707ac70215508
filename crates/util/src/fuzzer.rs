use rand::{rngs::OsRng, Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// A seeded random source for generating edit scripts in tests.
///
/// Uses the xoshiro256** PRNG so a failing run can be replayed from the seed
/// printed in the assertion message.
///
/// # Examples
///
/// ```
/// use delta_engine_util::fuzzer::Fuzzer;
///
/// let mut fuzzer = Fuzzer::new(Some(7));
/// let n = fuzzer.int(1, 10);
/// assert!((1..=10).contains(&n));
///
/// let choices = ["a", "b", "c"];
/// assert!(choices.contains(fuzzer.pick(&choices)));
/// ```
pub struct Fuzzer {
    seed: u64,
    rng: Xoshiro256StarStar,
}

impl Fuzzer {
    /// Create a fuzzer, drawing a seed from `OsRng` when none is given.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| OsRng.next_u64());
        Self {
            seed,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// The seed this fuzzer was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random integer in `[min, max]`.
    pub fn int(&mut self, min: usize, max: usize) -> usize {
        self.rng.gen_range(min..=max)
    }

    /// Random index into a collection of `len` elements. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// `true` with the given probability.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }

    /// Pick a random element from a non-empty slice.
    pub fn pick<'a, T>(&mut self, elements: &'a [T]) -> &'a T {
        let idx = self.index(elements.len());
        &elements[idx]
    }

    /// Random string of `len` chars drawn from `alphabet`.
    pub fn string(&mut self, len: usize, alphabet: &str) -> String {
        let chars: Vec<char> = alphabet.chars().collect();
        (0..len)
            .map(|_| chars[self.rng.gen_range(0..chars.len())])
            .collect()
    }

    /// Repeat a callback `times` times and collect the results.
    pub fn repeat<T, F>(&mut self, times: usize, mut callback: F) -> Vec<T>
    where
        F: FnMut(&mut Self) -> T,
    {
        (0..times).map(|_| callback(self)).collect()
    }
}
