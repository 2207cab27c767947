//! Emotional state and its coupling to health.
//!
//! Four continuous drives decay toward neutral every tick; the discrete [`Emotion`] is derived
//! from them by priority. Health thresholds add a limp, a fear floor, forced desperation and a
//! higher NeedHelp rate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::math::{approach, clamp_finite};

use crate::config::EmotionTuning;
use crate::AgentState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Emotion {
    #[default]
    Calm = 0,
    Aggressive = 1,
    Fearful = 2,
    Desperate = 3,
    Confident = 4,
    Frustrated = 5,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Calm,
        Emotion::Aggressive,
        Emotion::Fearful,
        Emotion::Desperate,
        Emotion::Confident,
        Emotion::Frustrated,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Calm => "calm",
            Emotion::Aggressive => "aggressive",
            Emotion::Fearful => "fearful",
            Emotion::Desperate => "desperate",
            Emotion::Confident => "confident",
            Emotion::Frustrated => "frustrated",
        }
    }

    /// Scales the nominal duration of `state`.
    pub fn duration_multiplier(self, state: AgentState) -> f32 {
        match (self, state) {
            (Emotion::Confident, AgentState::Recover) => 0.8,
            (Emotion::Fearful, AgentState::Strafe) => 1.3,
            (Emotion::Desperate, AgentState::Attack) => 0.9,
            _ => 1.0,
        }
    }

    /// Shift applied to an agent's aggression before difficulty tuning.
    pub fn aggression_bias(self) -> f32 {
        match self {
            Emotion::Calm | Emotion::Confident => 0.0,
            Emotion::Aggressive => 0.1,
            Emotion::Fearful => -0.15,
            Emotion::Desperate => 0.2,
            Emotion::Frustrated => 0.05,
        }
    }
}

const NEUTRAL_CONFIDENCE: f32 = 0.5;
const DRIVE_THRESHOLD: f32 = 0.6;
const CONFIDENT_THRESHOLD: f32 = 0.7;
const RALLY_CONFIDENCE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmotionState {
    pub current: Emotion,
    pub fear: f32,
    pub frustration: f32,
    pub desperation: f32,
    pub confidence: f32,
    /// Remaining seconds of the post-hit aggressive window.
    pub provoked: f32,
}

impl Default for EmotionState {
    fn default() -> Self {
        Self {
            current: Emotion::Calm,
            fear: 0.0,
            frustration: 0.0,
            desperation: 0.0,
            confidence: NEUTRAL_CONFIDENCE,
            provoked: 0.0,
        }
    }
}

impl EmotionState {
    /// `amount` is the health fraction just lost.
    pub fn on_damage_taken(&mut self, amount: f32, tuning: &EmotionTuning) {
        let amount = clamp_finite(amount, 0.0, 1.0);
        self.fear = (self.fear + amount * 1.5).min(1.0);
        self.desperation = (self.desperation + amount).min(1.0);
        self.confidence = (self.confidence - amount).max(0.0);
        self.provoked = tuning.aggressive_window;
    }

    pub fn on_attack_landed(&mut self) {
        self.confidence = (self.confidence + 0.15).min(1.0);
        self.frustration = (self.frustration - 0.2).max(0.0);
    }

    /// Blocked, dodged or whiffed.
    pub fn on_attack_failed(&mut self) {
        self.frustration = (self.frustration + 0.2).min(1.0);
        self.confidence = (self.confidence - 0.05).max(0.0);
    }

    pub fn on_packmate_lost(&mut self) {
        self.fear = (self.fear + 0.25).min(1.0);
        self.confidence = (self.confidence - 0.1).max(0.0);
    }

    /// A leader's rally: a calm or fearful agent turns confident.
    pub fn on_rally(&mut self) {
        if matches!(self.current, Emotion::Calm | Emotion::Fearful) {
            self.fear = self.fear.min(DRIVE_THRESHOLD * 0.5);
            self.confidence = self.confidence.max(RALLY_CONFIDENCE);
            self.current = Emotion::Confident;
        }
    }

    /// Holds the aggressive window open for at least `seconds`.
    pub fn provoke(&mut self, seconds: f32) {
        self.provoked = self.provoked.max(seconds);
        if self.current != Emotion::Desperate {
            self.current = Emotion::Aggressive;
        }
    }

    /// Decays the drives, applies health coupling and re-derives the discrete emotion.
    pub fn update(&mut self, dt: f32, health: f32, tuning: &EmotionTuning) -> HealthCoupling {
        let rate = tuning.decay_rate * dt;
        self.fear = approach(self.fear, 0.0, rate);
        self.frustration = approach(self.frustration, 0.0, rate);
        self.desperation = approach(self.desperation, 0.0, rate);
        self.confidence = approach(self.confidence, NEUTRAL_CONFIDENCE, rate);
        self.provoked = (self.provoked - dt).max(0.0);

        let coupling = HealthCoupling::for_health(health, tuning);
        if health <= tuning.fear_health {
            self.fear = self.fear.max(tuning.fear_floor);
        }
        if coupling.desperate {
            self.desperation = 1.0;
        }

        self.clamp();
        self.current = self.derive(coupling.desperate);
        coupling
    }

    fn derive(&self, desperate: bool) -> Emotion {
        if desperate {
            Emotion::Desperate
        } else if self.fear >= DRIVE_THRESHOLD {
            Emotion::Fearful
        } else if self.frustration >= DRIVE_THRESHOLD {
            Emotion::Frustrated
        } else if self.provoked > 0.0 {
            Emotion::Aggressive
        } else if self.confidence >= CONFIDENT_THRESHOLD {
            Emotion::Confident
        } else {
            Emotion::Calm
        }
    }

    pub fn clamp(&mut self) {
        self.fear = clamp_finite(self.fear, 0.0, 1.0);
        self.frustration = clamp_finite(self.frustration, 0.0, 1.0);
        self.desperation = clamp_finite(self.desperation, 0.0, 1.0);
        self.confidence = clamp_finite(self.confidence, 0.0, 1.0);
        self.provoked = clamp_finite(self.provoked, 0.0, f32::MAX);
    }
}

/// Health-driven modifiers for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthCoupling {
    /// Scales acceleration and turn rate.
    pub limp: f32,
    /// Scales how often a drawn feint is kept.
    pub feint_keep: f32,
    /// NeedHelp sends per second.
    pub need_help_rate: f32,
    pub desperate: bool,
}

impl HealthCoupling {
    pub fn for_health(health: f32, tuning: &EmotionTuning) -> Self {
        let limp = if health <= tuning.limp_health {
            tuning.limp_multiplier
        } else {
            1.0
        };
        let feint_keep = if health <= tuning.fear_health { 0.5 } else { 1.0 };
        let desperate = health <= tuning.desperate_health;
        let need_help_rate = if desperate {
            tuning.desperate_need_help_rate
        } else if health < tuning.need_help_health {
            tuning.need_help_rate
        } else {
            0.0
        };
        Self {
            limp,
            feint_keep,
            need_help_rate,
            desperate,
        }
    }
}
