//! Attack kinds and their phase timings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::ShuffleBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum AttackKind {
    #[default]
    Standard = 0,
    QuickJab = 1,
    PowerLunge = 2,
    Feint = 3,
}

impl AttackKind {
    pub const ALL: [AttackKind; 4] = [
        AttackKind::Standard,
        AttackKind::QuickJab,
        AttackKind::PowerLunge,
        AttackKind::Feint,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            AttackKind::Standard => "standard",
            AttackKind::QuickJab => "quick_jab",
            AttackKind::PowerLunge => "power_lunge",
            AttackKind::Feint => "feint",
        }
    }

    pub fn timing(self) -> AttackTiming {
        match self {
            AttackKind::Standard => AttackTiming::new(0.3, 0.2, 0.3, 1.0),
            AttackKind::QuickJab => AttackTiming::new(0.15, 0.15, 0.2, 0.7),
            AttackKind::PowerLunge => AttackTiming::new(0.5, 0.3, 0.4, 1.5),
            AttackKind::Feint => AttackTiming::new(0.2, 0.3, 0.3, 1.0),
        }
    }

    /// Feints bait a reaction and never request damage.
    pub fn deals_damage(self) -> bool {
        !matches!(self, AttackKind::Feint)
    }
}

/// The attack bag every agent spawns with: standard lunges are the most common swing.
pub fn attack_bag() -> ShuffleBag<AttackKind> {
    ShuffleBag::weighted([
        (AttackKind::Standard, 3),
        (AttackKind::QuickJab, 2),
        (AttackKind::PowerLunge, 2),
        (AttackKind::Feint, 1),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackTiming {
    pub anticipation: f32,
    pub execute: f32,
    pub recovery: f32,
    pub damage_multiplier: f32,
}

impl AttackTiming {
    const fn new(anticipation: f32, execute: f32, recovery: f32, damage_multiplier: f32) -> Self {
        Self {
            anticipation,
            execute,
            recovery,
            damage_multiplier,
        }
    }

    pub fn total(&self) -> f32 {
        self.anticipation + self.execute + self.recovery
    }

    pub fn phase_at(&self, elapsed: f32) -> AttackPhase {
        if elapsed < self.anticipation {
            AttackPhase::Anticipation
        } else if elapsed < self.anticipation + self.execute {
            AttackPhase::Execute
        } else {
            AttackPhase::Recovery
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    Anticipation,
    Execute,
    Recovery,
}

/// How a finished swing went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttackOutcome {
    Hit,
    Blocked,
    Dodged,
    Missed,
    Feinted,
}

impl AttackOutcome {
    pub fn id(self) -> u8 {
        match self {
            AttackOutcome::Hit => 0,
            AttackOutcome::Blocked => 1,
            AttackOutcome::Dodged => 2,
            AttackOutcome::Missed => 3,
            AttackOutcome::Feinted => 4,
        }
    }
}

/// Per-swing bookkeeping carried by an attacking agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackRuntime {
    pub bag: ShuffleBag<AttackKind>,
    pub kind: AttackKind,
    pub contact: Option<AttackOutcome>,
    /// The attack chain ended this tick; the fairness phase turns this into an engage cooldown.
    pub cooldown_pending: bool,
}

impl Default for AttackRuntime {
    fn default() -> Self {
        Self {
            bag: attack_bag(),
            kind: AttackKind::Standard,
            contact: None,
            cooldown_pending: false,
        }
    }
}

impl AttackRuntime {
    /// Starts a new swing of `kind`.
    pub fn begin(&mut self, kind: AttackKind) {
        self.kind = kind;
        self.contact = None;
    }

    /// Closes the current swing; a swing that never connected counts as a miss.
    pub fn finish(&mut self) -> AttackOutcome {
        match self.contact.take() {
            Some(outcome) => outcome,
            None if !self.kind.deals_damage() => AttackOutcome::Feinted,
            None => AttackOutcome::Missed,
        }
    }
}
