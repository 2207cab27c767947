//! Adaptive difficulty: estimate the player's skill and drift the pack's tuning toward it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::math::{approach, clamp_finite};

use crate::attack::AttackOutcome;
use crate::config::DifficultyConfig;

/// Tuning currently applied to every agent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DifficultyTuning {
    pub speed: f32,
    pub aggression: f32,
    /// Seconds between normal state-machine decisions.
    pub reaction_delay: f32,
}

impl DifficultyTuning {
    /// The neutral point of `config`: mid speed, mid aggression, mid delay.
    pub fn neutral(config: &DifficultyConfig) -> Self {
        Self {
            speed: config.speed.lerp(0.5),
            aggression: config.aggression.lerp(0.5),
            reaction_delay: config.reaction_delay.lerp(0.5),
        }
    }

    /// Tuning a player of `skill ∈ [0, 1]` should face.
    pub fn for_skill(skill: f32, config: &DifficultyConfig) -> Self {
        let skill = clamp_finite(skill, 0.0, 1.0);
        Self {
            speed: config.speed.lerp(skill),
            aggression: config.aggression.lerp(skill),
            // Better players get faster reactions.
            reaction_delay: config.reaction_delay.lerp(1.0 - skill),
        }
    }

    /// `agent_aggression` shifted by how far tuning sits from its midpoint.
    pub fn effective_aggression(&self, agent_aggression: f32, config: &DifficultyConfig) -> f32 {
        let shift = self.aggression - config.aggression.lerp(0.5);
        config.aggression.clamp(agent_aggression + shift)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdaptiveDifficulty {
    pub tuning: DifficultyTuning,
    pub dodge_rate: f32,
    pub block_rate: f32,
    /// Share of exchanged damage dealt by the player.
    pub exchange: f32,
    damage_to_player: f32,
    damage_to_pack: f32,
    until_adjust: f32,
    pub adjustments: u32,
}

impl AdaptiveDifficulty {
    pub fn new(config: &DifficultyConfig) -> Self {
        Self {
            tuning: DifficultyTuning::neutral(config),
            dodge_rate: 0.0,
            block_rate: 0.0,
            exchange: 0.5,
            damage_to_player: 0.0,
            damage_to_pack: 0.0,
            until_adjust: config.interval,
            adjustments: 0,
        }
    }

    /// Folds the outcome of one pack swing into the dodge/block EMAs.
    pub fn observe_swing(&mut self, outcome: AttackOutcome, config: &DifficultyConfig) {
        let w = config.sample_weight;
        let (dodged, blocked) = match outcome {
            AttackOutcome::Dodged => (1.0, 0.0),
            AttackOutcome::Blocked => (0.0, 1.0),
            AttackOutcome::Hit | AttackOutcome::Missed => (0.0, 0.0),
            AttackOutcome::Feinted => return,
        };
        self.dodge_rate = approach(self.dodge_rate, dodged, w);
        self.block_rate = approach(self.block_rate, blocked, w);
    }

    pub fn observe_damage_to_player(&mut self, amount: f32) {
        self.damage_to_player += clamp_finite(amount, 0.0, f32::MAX);
    }

    pub fn observe_damage_to_pack(&mut self, amount: f32) {
        self.damage_to_pack += clamp_finite(amount, 0.0, f32::MAX);
    }

    pub fn skill(&self) -> f32 {
        (0.35 * self.dodge_rate + 0.25 * self.block_rate + 0.4 * self.exchange).clamp(0.0, 1.0)
    }

    /// Advances the adjustment clock. Returns the new skill estimate when an adjustment ran.
    pub fn tick(&mut self, dt: f32, config: &DifficultyConfig) -> Option<f32> {
        if !config.enabled {
            return None;
        }
        self.until_adjust -= dt;
        if self.until_adjust > 0.0 {
            return None;
        }
        self.until_adjust += config.interval;

        let total = self.damage_to_player + self.damage_to_pack;
        if total > 0.0 {
            let sample = self.damage_to_pack / total;
            self.exchange = approach(self.exchange, sample, config.sample_weight);
        }
        self.damage_to_player = 0.0;
        self.damage_to_pack = 0.0;

        let skill = self.skill();
        let goal = DifficultyTuning::for_skill(skill, config);
        let step = config.step;
        self.tuning = DifficultyTuning {
            speed: config.speed.clamp(approach(self.tuning.speed, goal.speed, step)),
            aggression: config
                .aggression
                .clamp(approach(self.tuning.aggression, goal.aggression, step)),
            reaction_delay: config
                .reaction_delay
                .clamp(approach(self.tuning.reaction_delay, goal.reaction_delay, step)),
        };
        self.adjustments = self.adjustments.saturating_add(1);
        Some(skill)
    }
}
