//! Target velocity history and intercept lead.

use wolfpack_core::Vec2;

use crate::config::PredictionConfig;

pub const VELOCITY_SAMPLES: usize = 8;

/// Fixed-size ring of the most recent target velocities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityHistory {
    samples: [Vec2; VELOCITY_SAMPLES],
    head: usize,
    len: usize,
}

impl Default for VelocityHistory {
    fn default() -> Self {
        Self {
            samples: [Vec2::ZERO; VELOCITY_SAMPLES],
            head: 0,
            len: 0,
        }
    }
}

impl VelocityHistory {
    pub fn push(&mut self, velocity: Vec2) {
        self.samples[self.head] = velocity.finite_or(Vec2::ZERO);
        self.head = (self.head + 1) % VELOCITY_SAMPLES;
        self.len = (self.len + 1).min(VELOCITY_SAMPLES);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Oldest-to-newest iteration; the summation order is fixed so averages are reproducible.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        let start = (self.head + VELOCITY_SAMPLES - self.len) % VELOCITY_SAMPLES;
        (0..self.len).map(move |i| self.samples[(start + i) % VELOCITY_SAMPLES])
    }

    pub fn average(&self) -> Vec2 {
        if self.len == 0 {
            return Vec2::ZERO;
        }
        let mut sum = Vec2::ZERO;
        for v in self.iter() {
            sum += v;
        }
        sum / self.len as f32
    }
}

/// Seconds of lead for an agent of the given intelligence, or `None` below the threshold.
pub fn lead_time(intelligence: f32, config: &PredictionConfig) -> Option<f32> {
    if intelligence <= config.min_intelligence {
        return None;
    }
    let t = (intelligence - config.min_intelligence)
        / (config.full_intelligence - config.min_intelligence);
    Some(config.lead.lerp(t))
}

/// Where the target is expected to be after the agent's lead time.
pub fn predict(
    target: Vec2,
    history: &VelocityHistory,
    intelligence: f32,
    config: &PredictionConfig,
) -> Vec2 {
    match lead_time(intelligence, config) {
        Some(lead) => (target + history.average() * lead).clamp_components(0.0, 1.0),
        None => target,
    }
}
