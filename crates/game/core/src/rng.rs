//! Deterministic randomness for crit rolls, effect hit rolls and procs.
//!
//! Every random decision in a battle goes through [`RandomSource`]. A battle
//! driven by a [`PcgRng`] with the same seed replays identically; tests use
//! [`ScriptedRng`] to force specific outcomes.

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Bernoulli roll with probability `p`.
    ///
    /// Certain outcomes (`p <= 0` or `p >= 1`) consume no value, so adding a
    /// guaranteed effect never shifts later rolls.
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f64() < p
    }

    /// Uniform index in `0..len`; `0` when `len <= 1` (no value consumed).
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let index = (self.next_f64() * len as f64) as usize;
        index.min(len - 1)
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: compute_seed(seed, 0),
        }
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = Self::step(self.state);
        Self::output(self.state)
    }
}

impl RandomSource for PcgRng {
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }
}

/// Mixes a battle seed with a stream number (SplitMix64-style avalanche).
pub fn compute_seed(seed: u64, stream: u64) -> u64 {
    let mut hash = seed ^ stream.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Every roll succeeds (`0.0` is below any positive chance).
    pub fn always() -> Self {
        Self::new([0.0])
    }

    /// Every roll fails.
    pub fn never() -> Self {
        Self::new([0.999_999])
    }

    /// Number of values consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
