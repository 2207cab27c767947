//! Deterministic RNG helpers.
//!
//! This is intentionally small and dependency-free. It is **not** cryptographic.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::AgentId;

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform float in `[0, 1)` built from the top 24 bits (one f32 mantissa).
    fn next_f32_unit(&mut self) -> f32 {
        let x = self.next_u32() >> 8;
        (x as f32) / ((1u32 << 24) as f32)
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// SplitMix64: good seeding RNG and small deterministic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        mix64(self.state)
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.step()
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Derives a per-entity constant from the global seed without touching any stream.
pub fn derive_seed(global_seed: u64, agent_id: u64, stream: u64) -> u64 {
    let x = global_seed ^ mix64(agent_id.wrapping_add(0x9E3779B97F4A7C15)) ^ mix64(stream);
    mix64(x)
}

/// Maps a derived seed onto `[0, 1)` the same way [`DeterministicRng::next_f32_unit`] does.
pub fn unit_from_seed(seed: u64) -> f32 {
    let x = ((seed >> 32) as u32) >> 8;
    (x as f32) / ((1u32 << 24) as f32)
}

/// A per-agent constant in `[0, 1)` for `stream`. Does not consume any stream.
pub fn agent_phase<A: AgentId>(global_seed: u64, agent: A, stream: u64) -> f32 {
    unit_from_seed(derive_seed(global_seed, agent.stable_id(), stream))
}

/// Persistable position of a [`SimRng`] stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RngState {
    pub seed: u64,
    pub state: u64,
    pub draws: u64,
}

/// The single simulation-wide random stream.
///
/// Every subsystem receives it as `&mut SimRng` from whoever owns the tick; there is no global
/// instance. Draw order is part of the determinism contract, so callers must not draw
/// speculatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    seed: u64,
    inner: SplitMix64,
    draws: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: SplitMix64::new(seed),
            draws: 0,
        }
    }

    pub fn from_state(state: RngState) -> Self {
        Self {
            seed: state.seed,
            inner: SplitMix64::new(state.state),
            draws: state.draws,
        }
    }

    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            state: self.inner.state(),
            draws: self.draws,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn since seeding. Useful when diffing replays.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_float(&mut self) -> f32 {
        self.next_f32_unit()
    }

    /// Uniform float in `[lo, hi]`; a reversed range is treated as `[hi, lo]`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        let (lo, hi) = if hi < lo { (hi, lo) } else { (lo, hi) };
        let u = self.next_float();
        (lo + (hi - lo) * u).min(hi)
    }

    /// `true` with probability `p` (clamped to `[0, 1]`). Always consumes one draw.
    pub fn chance(&mut self, p: f32) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.next_float() < p
    }

    /// Unbiased index in `0..len`. Returns 0 without drawing when `len <= 1`.
    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let span = len.min(u32::MAX as usize) as u32;
        let threshold = u32::MAX - (u32::MAX % span);
        loop {
            let x = self.next_u32();
            if x < threshold {
                return (x % span) as usize;
            }
        }
    }
}

impl DeterministicRng for SimRng {
    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.wrapping_add(1);
        self.inner.next_u64()
    }
}
