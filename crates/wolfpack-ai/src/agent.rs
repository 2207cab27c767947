#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::math::clamp_finite;
use wolfpack_core::rng::agent_phase;
use wolfpack_core::{AgentKey, BodyHandle, PackKey, SimRng, Vec2};

use crate::attack::AttackRuntime;
use crate::comms::Inbox;
use crate::config::{AgentTuning, HuntConfig, LeaderTuning};
use crate::emotion::EmotionState;
use crate::fairness::{Directive, Pressure};
use crate::pack::Role;
use crate::prediction::VelocityHistory;
use crate::terrain::{TerrainCache, TERRAIN_STREAM};
use crate::AgentState;

/// Stream tag for the per-agent duration jitter.
pub const TEMPO_STREAM: u64 = 0x7465_6d70;

/// Largest relative jitter applied to state durations.
pub const TEMPO_JITTER: f32 = 0.02;

/// Breed of a pack member, fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum WolfKind {
    #[default]
    Normal = 0,
    Alpha = 1,
    Scout = 2,
    Hunter = 3,
    Omega = 4,
}

impl WolfKind {
    pub const ALL: [WolfKind; 5] = [
        WolfKind::Normal,
        WolfKind::Alpha,
        WolfKind::Scout,
        WolfKind::Hunter,
        WolfKind::Omega,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            WolfKind::Normal => "normal",
            WolfKind::Alpha => "alpha",
            WolfKind::Scout => "scout",
            WolfKind::Hunter => "hunter",
            WolfKind::Omega => "omega",
        }
    }

    pub fn modifiers(self) -> KindModifiers {
        match self {
            WolfKind::Normal | WolfKind::Omega => KindModifiers::NONE,
            WolfKind::Alpha => KindModifiers {
                toughness: 1.5,
                damage: 1.3,
                aggression: 0.2,
                ..KindModifiers::NONE
            },
            WolfKind::Scout => KindModifiers {
                speed: 1.2,
                detection: 1.3,
                intelligence: 0.1,
                ..KindModifiers::NONE
            },
            WolfKind::Hunter => KindModifiers {
                damage: 1.2,
                coordination: 0.15,
                ..KindModifiers::NONE
            },
        }
    }
}

/// What a [`WolfKind`] changes relative to a normal wolf.
///
/// Health stays a fraction of full health, so extra health is expressed as `toughness`: incoming
/// damage is divided by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindModifiers {
    pub toughness: f32,
    pub damage: f32,
    pub speed: f32,
    pub detection: f32,
    /// Added to the drawn temperament, then clamped to `[0, 1]`.
    pub aggression: f32,
    pub intelligence: f32,
    pub coordination: f32,
}

impl KindModifiers {
    pub const NONE: Self = Self {
        toughness: 1.0,
        damage: 1.0,
        speed: 1.0,
        detection: 1.0,
        aggression: 0.0,
        intelligence: 0.0,
        coordination: 0.0,
    };
}

/// What an agent remembers about the target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetMemory {
    pub velocities: VelocityHistory,
    pub last_known_position: Vec2,
    pub last_seen: f32,
    /// Direction from the target toward this agent when its last hit landed.
    pub last_hit_angle: Option<Vec2>,
    pub last_block: Option<f32>,
    pub last_roll: Option<f32>,
}

/// Orders handed down by the pack plan for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engagement {
    /// State entered when the agent commits to the hunt from Alert.
    pub preferred: AgentState,
    /// `-1` circles clockwise (left of the target), `+1` counter-clockwise.
    pub flank_side: f32,
    pub regroup: Option<Vec2>,
    pub retreat: bool,
    /// Lures the target instead of closing in (Ambush scout).
    pub lure: bool,
}

impl Default for Engagement {
    fn default() -> Self {
        Self {
            preferred: AgentState::Approach,
            flank_side: 1.0,
            regroup: None,
            retreat: false,
            lure: false,
        }
    }
}

/// One predator.
///
/// Fields are public for tooling and tests; during a tick only the coordinator mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentKey,
    pub pack: PackKey,
    pub kind: WolfKind,
    pub body: BodyHandle,
    pub home: Vec2,

    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Vec2,

    pub health: f32,
    pub stamina: f32,
    pub morale: f32,
    pub aggression: f32,
    pub intelligence: f32,
    pub coordination: f32,

    pub state: AgentState,
    pub previous_state: AgentState,
    pub state_timer: f32,
    pub state_elapsed: f32,
    /// Per-agent multiplier on state durations, within `1 ± TEMPO_JITTER`.
    pub tempo: f32,
    pub decision_timer: f32,
    pub engage_cooldown: f32,
    pub directive: Option<Directive>,
    pub pressure: Pressure,
    /// Set when the budget turned a request into threaten-only.
    pub holding_off: bool,

    pub emotion: EmotionState,
    pub limp: f32,
    pub role: Role,
    pub role_lock: f32,
    pub engagement: Engagement,
    pub flank_side: f32,

    pub memory: TargetMemory,
    pub inbox: Inbox,
    pub terrain: TerrainCache,
    pub attack: AttackRuntime,
    pub need_help_cooldown: f32,
    /// Seconds of berserk rage left.
    pub enraged: f32,

    pub hits_landed: u32,
    pub swings_failed: u32,
}

impl Agent {
    /// Spawns an agent at `position`, drawing its temperament from `rng` in a fixed order:
    /// morale, aggression, intelligence, coordination. The kind's offsets apply after the draws.
    ///
    /// The first terrain scan and the duration jitter come from `seed` and do not touch `rng`.
    pub fn spawn(
        id: AgentKey,
        pack: PackKey,
        kind: WolfKind,
        position: Vec2,
        seed: u64,
        rng: &mut SimRng,
        config: &HuntConfig,
    ) -> Self {
        let tuning = &config.agent;
        let first_scan_in = config
            .terrain
            .scan_interval
            .lerp(agent_phase(seed, id, TERRAIN_STREAM));
        let tempo = 1.0 + TEMPO_JITTER * (2.0 * agent_phase(seed, id, TEMPO_STREAM) - 1.0);
        let modifiers = kind.modifiers();
        let morale = tuning.morale.sample(rng);
        let aggression =
            clamp_finite(tuning.aggression.sample(rng) + modifiers.aggression, 0.0, 1.0);
        let intelligence =
            clamp_finite(tuning.intelligence.sample(rng) + modifiers.intelligence, 0.0, 1.0);
        let coordination =
            clamp_finite(tuning.coordination.sample(rng) + modifiers.coordination, 0.0, 1.0);
        let position = position.finite_or(Vec2::new(0.5, 0.5)).clamp_components(0.0, 1.0);

        Self {
            id,
            pack,
            kind,
            body: BodyHandle::default(),
            home: position,
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            health: 1.0,
            stamina: 1.0,
            morale,
            aggression,
            intelligence,
            coordination,
            state: AgentState::Idle,
            previous_state: AgentState::Idle,
            state_timer: AgentState::Idle.base_duration() * tempo,
            state_elapsed: 0.0,
            tempo,
            decision_timer: 0.0,
            engage_cooldown: 0.0,
            directive: None,
            pressure: Pressure::None,
            holding_off: false,
            emotion: EmotionState::default(),
            limp: 1.0,
            role: Role::None,
            role_lock: 0.0,
            engagement: Engagement::default(),
            flank_side: if id.0 % 2 == 0 { -1.0 } else { 1.0 },
            memory: TargetMemory {
                last_known_position: position,
                ..TargetMemory::default()
            },
            inbox: Inbox::new(config.comms.inbox_capacity),
            terrain: TerrainCache::with_first_scan_in(first_scan_in),
            attack: AttackRuntime::default(),
            need_help_cooldown: 0.0,
            enraged: 0.0,
            hits_landed: 0,
            swings_failed: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Whether the engage cooldown has run out.
    pub fn can_engage(&self) -> bool {
        self.engage_cooldown <= 0.0
    }

    pub fn active_directive(&self) -> Option<Directive> {
        self.directive.filter(Directive::is_active)
    }

    pub fn is_enraged(&self) -> bool {
        self.enraged > 0.0
    }

    /// Scales the damage this agent's hits request.
    pub fn damage_multiplier(&self, tuning: &LeaderTuning) -> f32 {
        let rage = if self.is_enraged() {
            tuning.berserk_damage
        } else {
            1.0
        };
        self.kind.modifiers().damage * rage
    }

    /// Scales this agent's movement speed.
    pub fn speed_multiplier(&self, tuning: &LeaderTuning) -> f32 {
        let rage = if self.is_enraged() {
            tuning.berserk_speed
        } else {
            1.0
        };
        self.kind.modifiers().speed * rage
    }

    /// Applies damage as a fraction of a normal wolf's full health, reduced by the kind's
    /// toughness. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: f32, tuning: &AgentTuning) -> f32 {
        let amount = clamp_finite(amount, 0.0, 1.0) / self.kind.modifiers().toughness;
        let before = self.health;
        self.health = (self.health - amount).max(0.0);
        let lost = before - self.health;
        if lost > 0.0 {
            self.emotion.on_damage_taken(lost, &tuning.emotion);
        }
        lost
    }

    /// A hit from outside the engine: damage, a share of `knockback` added to velocity and a
    /// morale cost. Interrupting a swing is left to the caller.
    pub fn take_hit(&mut self, amount: f32, knockback: Vec2, tuning: &AgentTuning) -> f32 {
        let lost = self.take_damage(amount, tuning);
        self.velocity += knockback.finite_or(Vec2::ZERO) * tuning.knockback_scale;
        self.morale = (self.morale - tuning.hit_morale_cost).max(0.0);
        lost
    }

    /// Pulls every attribute back into its declared bounds. Returns `true` if anything moved.
    pub fn clamp_attributes(&mut self) -> bool {
        let before = (
            self.position,
            self.velocity,
            self.facing,
            self.health,
            self.stamina,
            self.morale,
            self.aggression,
            self.intelligence,
            self.coordination,
        );

        self.position = self
            .position
            .finite_or(self.home)
            .clamp_components(0.0, 1.0);
        self.velocity = self.velocity.finite_or(Vec2::ZERO);
        if !self.facing.is_finite() || (self.facing.length_squared() - 1.0).abs() > 1e-3 {
            let facing = self.facing.finite_or(Vec2::X).normalize_or_zero();
            self.facing = if facing == Vec2::ZERO { Vec2::X } else { facing };
        }
        self.health = clamp_finite(self.health, 0.0, 1.0);
        self.stamina = clamp_finite(self.stamina, 0.0, 1.0);
        self.morale = clamp_finite(self.morale, 0.0, 1.0);
        self.aggression = clamp_finite(self.aggression, 0.0, 1.0);
        self.intelligence = clamp_finite(self.intelligence, 0.0, 1.0);
        self.coordination = clamp_finite(self.coordination, 0.0, 1.0);
        self.emotion.clamp();

        let after = (
            self.position,
            self.velocity,
            self.facing,
            self.health,
            self.stamina,
            self.morale,
            self.aggression,
            self.intelligence,
            self.coordination,
        );
        // Bitwise, so a repaired NaN counts as a change.
        !bitwise_eq(before, after)
    }
}

type Attributes = (Vec2, Vec2, Vec2, f32, f32, f32, f32, f32, f32);

fn bitwise_eq(a: Attributes, b: Attributes) -> bool {
    let bits = |v: Attributes| {
        [
            v.0.x, v.0.y, v.1.x, v.1.y, v.2.x, v.2.y, v.3, v.4, v.5, v.6, v.7, v.8,
        ]
        .map(f32::to_bits)
    };
    bits(a) == bits(b)
}
