//! Hunt tuning, loaded once at coordinator construction.
//!
//! Distances are in normalized world units (the arena is `[0, 1]²`) and durations in seconds.
//! With the `serde` feature every struct deserializes with `#[serde(default)]`, so a partial YAML
//! file only overrides the fields it names.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::SimRng;

use crate::HuntError;

/// Inclusive `[min, max]` interval sampled from the simulation stream.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// One draw from `rng`.
    pub fn sample(&self, rng: &mut SimRng) -> f32 {
        rng.range(self.min, self.max)
    }

    /// Maps `t ∈ [0, 1]` linearly onto the interval.
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t.clamp(0.0, 1.0)
    }

    pub fn clamp(&self, value: f32) -> f32 {
        wolfpack_core::math::clamp_finite(value, self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, field: &'static str) -> Result<(), HuntError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(HuntError::invalid(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(HuntError::invalid(
                field,
                format!("inverted range [{}, {}]", self.min, self.max),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HuntConfig {
    pub agent: AgentTuning,
    pub pack: PackTuning,
    pub fairness: FairnessConfig,
    pub comms: CommsConfig,
    pub terrain: TerrainConfig,
    pub prediction: PredictionConfig,
    pub difficulty: DifficultyConfig,
    pub schedule: ScheduleConfig,
}

impl HuntConfig {
    /// Rejects inverted ranges, non-positive caps and non-finite values.
    pub fn validate(&self) -> Result<(), HuntError> {
        self.agent.validate()?;
        self.pack.validate()?;
        self.fairness.validate()?;
        self.comms.validate()?;
        self.terrain.validate()?;
        self.prediction.validate()?;
        self.difficulty.validate()?;
        self.schedule.validate()
    }
}

/// Per-agent movement, perception and vitals tuning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentTuning {
    pub base_speed: f32,
    /// Velocity blend rate per second before the limp multiplier.
    pub acceleration: f32,
    /// Facing blend rate per second before the limp multiplier.
    pub turn_rate: f32,
    pub detection_range: f32,
    /// Hearing radius as a multiple of `detection_range`.
    pub hearing_multiplier: f32,
    pub attack_range: f32,
    /// Probe ring as a multiple of `attack_range`.
    pub probe_multiplier: f32,
    /// Threaten ring as a multiple of `attack_range`.
    pub threaten_multiplier: f32,
    /// Where threaten-only agents hold, as a multiple of `attack_range`.
    pub hold_multiplier: f32,
    /// Damage requested from the combat collaborator by a standard hit.
    pub base_damage: f32,

    pub morale: Span,
    pub aggression: Span,
    pub intelligence: Span,
    pub coordination: Span,

    pub flee_health: f32,
    pub retreat_health: f32,
    pub retreat_morale: f32,
    /// Morale lost each time an agent enters Retreat.
    pub retreat_morale_cost: f32,

    pub stamina_regen: f32,
    pub sprint_drain: f32,
    pub attack_stamina_cost: f32,

    pub combo_aggression: f32,
    pub combo_stamina: f32,
    /// Above this intelligence the state machine consults the terrain cache.
    pub terrain_intelligence: f32,

    /// Share of an incoming knockback added to velocity.
    pub knockback_scale: f32,
    /// Morale lost per hit taken.
    pub hit_morale_cost: f32,
    /// Recover time after a hit interrupts a swing.
    pub stagger_duration: f32,

    pub emotion: EmotionTuning,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            base_speed: 0.25,
            acceleration: 8.0,
            turn_rate: 10.0,
            detection_range: 0.4,
            hearing_multiplier: 1.25,
            attack_range: 0.08,
            probe_multiplier: 1.5,
            threaten_multiplier: 2.5,
            hold_multiplier: 1.75,
            base_damage: 10.0,
            morale: Span::new(0.6, 0.8),
            aggression: Span::new(0.3, 0.7),
            intelligence: Span::new(0.4, 0.8),
            coordination: Span::new(0.5, 0.8),
            flee_health: 0.15,
            retreat_health: 0.3,
            retreat_morale: 0.4,
            retreat_morale_cost: 0.1,
            stamina_regen: 0.1,
            sprint_drain: 0.05,
            attack_stamina_cost: 0.2,
            combo_aggression: 0.55,
            combo_stamina: 0.4,
            terrain_intelligence: 0.6,
            knockback_scale: 0.3,
            hit_morale_cost: 0.05,
            stagger_duration: 0.5,
            emotion: EmotionTuning::default(),
        }
    }
}

impl AgentTuning {
    pub fn hearing_range(&self) -> f32 {
        self.detection_range * self.hearing_multiplier
    }

    pub fn probe_range(&self) -> f32 {
        self.attack_range * self.probe_multiplier
    }

    pub fn threaten_range(&self) -> f32 {
        self.attack_range * self.threaten_multiplier
    }

    pub fn hold_range(&self) -> f32 {
        self.attack_range * self.hold_multiplier
    }

    fn validate(&self) -> Result<(), HuntError> {
        positive("agent.base_speed", self.base_speed)?;
        positive("agent.acceleration", self.acceleration)?;
        positive("agent.turn_rate", self.turn_rate)?;
        positive("agent.detection_range", self.detection_range)?;
        positive("agent.hearing_multiplier", self.hearing_multiplier)?;
        positive("agent.attack_range", self.attack_range)?;
        positive("agent.base_damage", self.base_damage)?;
        if !(self.probe_multiplier >= 1.0
            && self.hold_multiplier >= self.probe_multiplier
            && self.threaten_multiplier >= self.hold_multiplier)
        {
            return Err(HuntError::invalid(
                "agent.probe_multiplier",
                "rings must satisfy 1 <= probe <= hold <= threaten",
            ));
        }
        unit_span("agent.morale", self.morale)?;
        unit_span("agent.aggression", self.aggression)?;
        unit_span("agent.intelligence", self.intelligence)?;
        unit_span("agent.coordination", self.coordination)?;
        unit("agent.flee_health", self.flee_health)?;
        unit("agent.retreat_health", self.retreat_health)?;
        unit("agent.retreat_morale", self.retreat_morale)?;
        unit("agent.retreat_morale_cost", self.retreat_morale_cost)?;
        non_negative("agent.stamina_regen", self.stamina_regen)?;
        non_negative("agent.sprint_drain", self.sprint_drain)?;
        unit("agent.attack_stamina_cost", self.attack_stamina_cost)?;
        unit("agent.combo_aggression", self.combo_aggression)?;
        unit("agent.combo_stamina", self.combo_stamina)?;
        unit("agent.terrain_intelligence", self.terrain_intelligence)?;
        non_negative("agent.knockback_scale", self.knockback_scale)?;
        unit("agent.hit_morale_cost", self.hit_morale_cost)?;
        non_negative("agent.stagger_duration", self.stagger_duration)?;
        self.emotion.validate()
    }
}

/// Health coupling and emotion dynamics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmotionTuning {
    /// Fraction of the distance to neutral recovered per second.
    pub decay_rate: f32,
    pub limp_health: f32,
    pub limp_multiplier: f32,
    pub fear_health: f32,
    pub fear_floor: f32,
    pub desperate_health: f32,
    /// NeedHelp sends per second while wounded.
    pub need_help_rate: f32,
    /// NeedHelp sends per second once desperate.
    pub desperate_need_help_rate: f32,
    /// Below this health a wounded, engaged agent may call for help.
    pub need_help_health: f32,
    pub need_help_cooldown: f32,
    /// Seconds an agent stays Aggressive after being hit.
    pub aggressive_window: f32,
}

impl Default for EmotionTuning {
    fn default() -> Self {
        Self {
            decay_rate: 0.1,
            limp_health: 0.7,
            limp_multiplier: 0.8,
            fear_health: 0.4,
            fear_floor: 0.4,
            desperate_health: 0.2,
            need_help_rate: 0.1,
            desperate_need_help_rate: 0.6,
            need_help_health: 0.5,
            need_help_cooldown: 3.0,
            aggressive_window: 1.5,
        }
    }
}

impl EmotionTuning {
    fn validate(&self) -> Result<(), HuntError> {
        unit("agent.emotion.decay_rate", self.decay_rate)?;
        unit("agent.emotion.limp_health", self.limp_health)?;
        unit("agent.emotion.limp_multiplier", self.limp_multiplier)?;
        unit("agent.emotion.fear_health", self.fear_health)?;
        unit("agent.emotion.fear_floor", self.fear_floor)?;
        unit("agent.emotion.desperate_health", self.desperate_health)?;
        unit("agent.emotion.need_help_health", self.need_help_health)?;
        non_negative("agent.emotion.need_help_rate", self.need_help_rate)?;
        non_negative(
            "agent.emotion.desperate_need_help_rate",
            self.desperate_need_help_rate,
        )?;
        non_negative("agent.emotion.need_help_cooldown", self.need_help_cooldown)?;
        non_negative("agent.emotion.aggressive_window", self.aggressive_window)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PackTuning {
    pub max_packs: usize,
    pub max_members: usize,
    pub role_lock: Span,
    /// Multiplier over each plan's base duration.
    pub plan_duration_scale: f32,
    /// Regroup completes once every member is this close to the pack centre.
    pub regroup_radius: f32,
    pub sync_ready_count: usize,
    pub sync_min_stamina: f32,
    pub sync_cooldown: f32,
    /// Morale lost by every packmate when a member dies.
    pub death_morale_cost: f32,
    pub leader: LeaderTuning,
}

impl Default for PackTuning {
    fn default() -> Self {
        Self {
            max_packs: 8,
            max_members: 8,
            role_lock: Span::new(6.0, 10.0),
            plan_duration_scale: 1.0,
            regroup_radius: 0.12,
            sync_ready_count: 3,
            sync_min_stamina: 0.3,
            sync_cooldown: 2.0,
            death_morale_cost: 0.1,
            leader: LeaderTuning::default(),
        }
    }
}

impl PackTuning {
    fn validate(&self) -> Result<(), HuntError> {
        at_least_one("pack.max_packs", self.max_packs)?;
        at_least_one("pack.max_members", self.max_members)?;
        at_least_one("pack.sync_ready_count", self.sync_ready_count)?;
        self.role_lock.check("pack.role_lock")?;
        non_negative("pack.role_lock.min", self.role_lock.min)?;
        positive("pack.plan_duration_scale", self.plan_duration_scale)?;
        positive("pack.regroup_radius", self.regroup_radius)?;
        unit("pack.sync_min_stamina", self.sync_min_stamina)?;
        non_negative("pack.sync_cooldown", self.sync_cooldown)?;
        unit("pack.death_morale_cost", self.death_morale_cost)?;
        self.leader.validate()
    }
}

/// Leader abilities. One ability per pack at a time: each cooldown runs from the pack's last
/// ability of any kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LeaderTuning {
    pub rally_cooldown: f32,
    /// Rally fires below this pack morale.
    pub rally_morale: f32,
    pub rally_morale_boost: f32,
    pub rally_coordination_boost: f32,

    pub berserk_cooldown: f32,
    /// Berserk fires when the leader's health drops below this.
    pub berserk_health: f32,
    pub berserk_duration: f32,
    /// Packmates this close to the leader are roused too.
    pub berserk_radius: f32,
    pub berserk_aggression_boost: f32,
    pub berserk_speed: f32,
    pub berserk_damage: f32,

    pub strike_cooldown: f32,
    pub strike_ready_count: usize,
    /// Engage cooldown members are left with after a coordinated strike.
    pub strike_ready_delay: f32,

    pub intimidate_cooldown: f32,
    /// Intimidate fires when the target is this close to the leader.
    pub intimidate_range: f32,
}

impl Default for LeaderTuning {
    fn default() -> Self {
        Self {
            rally_cooldown: 20.0,
            rally_morale: 0.4,
            rally_morale_boost: 0.25,
            rally_coordination_boost: 0.2,
            berserk_cooldown: 25.0,
            berserk_health: 0.3,
            berserk_duration: 10.0,
            berserk_radius: 0.3,
            berserk_aggression_boost: 0.3,
            berserk_speed: 1.5,
            berserk_damage: 2.0,
            strike_cooldown: 15.0,
            strike_ready_count: 3,
            strike_ready_delay: 0.5,
            intimidate_cooldown: 10.0,
            intimidate_range: 0.2,
        }
    }
}

impl LeaderTuning {
    fn validate(&self) -> Result<(), HuntError> {
        non_negative("pack.leader.rally_cooldown", self.rally_cooldown)?;
        unit("pack.leader.rally_morale", self.rally_morale)?;
        unit("pack.leader.rally_morale_boost", self.rally_morale_boost)?;
        unit("pack.leader.rally_coordination_boost", self.rally_coordination_boost)?;
        non_negative("pack.leader.berserk_cooldown", self.berserk_cooldown)?;
        unit("pack.leader.berserk_health", self.berserk_health)?;
        non_negative("pack.leader.berserk_duration", self.berserk_duration)?;
        non_negative("pack.leader.berserk_radius", self.berserk_radius)?;
        unit("pack.leader.berserk_aggression_boost", self.berserk_aggression_boost)?;
        positive("pack.leader.berserk_speed", self.berserk_speed)?;
        positive("pack.leader.berserk_damage", self.berserk_damage)?;
        non_negative("pack.leader.strike_cooldown", self.strike_cooldown)?;
        at_least_one("pack.leader.strike_ready_count", self.strike_ready_count)?;
        non_negative("pack.leader.strike_ready_delay", self.strike_ready_delay)?;
        non_negative("pack.leader.intimidate_cooldown", self.intimidate_cooldown)?;
        non_negative("pack.leader.intimidate_range", self.intimidate_range)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FairnessConfig {
    pub commit_cap: u8,
    pub probe_cap: u8,
    pub mercy_window: f32,
    pub mercy_hits: usize,
    pub disengage: Span,
    /// Cosine of the anti-corner arc (30°). Stored as a cosine so no trig runs at load time.
    pub corner_arc_cos: f32,
    pub engage_cooldown: Span,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            commit_cap: 1,
            probe_cap: 1,
            mercy_window: 2.0,
            mercy_hits: 2,
            disengage: Span::new(0.8, 1.2),
            corner_arc_cos: 0.866_025_4,
            engage_cooldown: Span::new(1.5, 2.5),
        }
    }
}

impl FairnessConfig {
    fn validate(&self) -> Result<(), HuntError> {
        if self.commit_cap == 0 {
            return Err(HuntError::invalid("fairness.commit_cap", "must be at least 1"));
        }
        if self.probe_cap == 0 {
            return Err(HuntError::invalid("fairness.probe_cap", "must be at least 1"));
        }
        positive("fairness.mercy_window", self.mercy_window)?;
        at_least_one("fairness.mercy_hits", self.mercy_hits)?;
        self.disengage.check("fairness.disengage")?;
        non_negative("fairness.disengage.min", self.disengage.min)?;
        self.engage_cooldown.check("fairness.engage_cooldown")?;
        non_negative("fairness.engage_cooldown.min", self.engage_cooldown.min)?;
        if !(self.corner_arc_cos > -1.0 && self.corner_arc_cos < 1.0) {
            return Err(HuntError::invalid(
                "fairness.corner_arc_cos",
                "must lie strictly inside (-1, 1)",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommsConfig {
    pub range: f32,
    /// Beyond this distance a delivery may be dropped.
    pub drop_distance: f32,
    pub drop_chance: Span,
    pub latency: Span,
    pub inbox_capacity: usize,
    pub message_ttl: f32,
}

impl Default for CommsConfig {
    fn default() -> Self {
        Self {
            range: 0.4,
            drop_distance: 0.35,
            drop_chance: Span::new(0.03, 0.05),
            latency: Span::new(0.08, 0.16),
            inbox_capacity: 8,
            message_ttl: 1.0,
        }
    }
}

impl CommsConfig {
    fn validate(&self) -> Result<(), HuntError> {
        positive("comms.range", self.range)?;
        non_negative("comms.drop_distance", self.drop_distance)?;
        unit_span("comms.drop_chance", self.drop_chance)?;
        self.latency.check("comms.latency")?;
        non_negative("comms.latency.min", self.latency.min)?;
        at_least_one("comms.inbox_capacity", self.inbox_capacity)?;
        positive("comms.message_ttl", self.message_ttl)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerrainConfig {
    pub scan_radius: f32,
    pub scan_interval: Span,
    pub cache_capacity: usize,
    pub max_features: usize,
    pub cover_boost: f32,
    pub chokepoint_boost: f32,
    pub high_ground_boost: f32,
    pub open_field_low_morale: f32,
    pub low_morale: f32,
    pub low_ground: f32,
    pub water: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            scan_radius: 0.3,
            scan_interval: Span::new(1.2, 1.8),
            cache_capacity: 4,
            max_features: 256,
            cover_boost: 1.5,
            chokepoint_boost: 1.5,
            high_ground_boost: 1.3,
            open_field_low_morale: 0.5,
            low_morale: 0.5,
            low_ground: 0.6,
            water: 0.7,
        }
    }
}

impl TerrainConfig {
    fn validate(&self) -> Result<(), HuntError> {
        positive("terrain.scan_radius", self.scan_radius)?;
        self.scan_interval.check("terrain.scan_interval")?;
        positive("terrain.scan_interval.min", self.scan_interval.min)?;
        at_least_one("terrain.cache_capacity", self.cache_capacity)?;
        at_least_one("terrain.max_features", self.max_features)?;
        non_negative("terrain.cover_boost", self.cover_boost)?;
        non_negative("terrain.chokepoint_boost", self.chokepoint_boost)?;
        non_negative("terrain.high_ground_boost", self.high_ground_boost)?;
        non_negative("terrain.open_field_low_morale", self.open_field_low_morale)?;
        unit("terrain.low_morale", self.low_morale)?;
        non_negative("terrain.low_ground", self.low_ground)?;
        non_negative("terrain.water", self.water)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PredictionConfig {
    /// Prediction only kicks in strictly above this intelligence.
    pub min_intelligence: f32,
    /// Intelligence at which the full lead applies.
    pub full_intelligence: f32,
    pub lead: Span,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_intelligence: 0.7,
            full_intelligence: 0.8,
            lead: Span::new(0.5, 1.0),
        }
    }
}

impl PredictionConfig {
    fn validate(&self) -> Result<(), HuntError> {
        unit("prediction.min_intelligence", self.min_intelligence)?;
        unit("prediction.full_intelligence", self.full_intelligence)?;
        if self.full_intelligence <= self.min_intelligence {
            return Err(HuntError::invalid(
                "prediction.full_intelligence",
                "must exceed min_intelligence",
            ));
        }
        self.lead.check("prediction.lead")?;
        non_negative("prediction.lead.min", self.lead.min)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DifficultyConfig {
    pub enabled: bool,
    pub interval: f32,
    /// Fraction of the remaining distance covered per adjustment.
    pub step: f32,
    /// Weight of the newest sample in the skill EMAs.
    pub sample_weight: f32,
    pub speed: Span,
    pub aggression: Span,
    pub reaction_delay: Span,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 10.0,
            step: 0.1,
            sample_weight: 0.1,
            speed: Span::new(0.85, 1.15),
            aggression: Span::new(0.3, 0.85),
            reaction_delay: Span::new(0.09, 0.22),
        }
    }
}

impl DifficultyConfig {
    fn validate(&self) -> Result<(), HuntError> {
        positive("difficulty.interval", self.interval)?;
        unit("difficulty.step", self.step)?;
        unit("difficulty.sample_weight", self.sample_weight)?;
        self.speed.check("difficulty.speed")?;
        positive("difficulty.speed.min", self.speed.min)?;
        unit_span("difficulty.aggression", self.aggression)?;
        self.reaction_delay.check("difficulty.reaction_delay")?;
        non_negative("difficulty.reaction_delay.min", self.reaction_delay.min)
    }
}

/// Tick sanitation and work staggering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduleConfig {
    /// Substituted for a non-finite or non-positive delta.
    pub fixed_dt: f32,
    pub max_dt: f32,
    pub terrain_every: u32,
    pub comms_every: u32,
    /// Agents farther than this from the target run staggered work less often.
    pub lod_distance: f32,
    pub lod_factor: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_dt: 0.1,
            terrain_every: 4,
            comms_every: 2,
            lod_distance: 0.8,
            lod_factor: 4,
        }
    }
}

impl ScheduleConfig {
    fn validate(&self) -> Result<(), HuntError> {
        positive("schedule.fixed_dt", self.fixed_dt)?;
        positive("schedule.max_dt", self.max_dt)?;
        if self.fixed_dt > self.max_dt {
            return Err(HuntError::invalid("schedule.fixed_dt", "must not exceed max_dt"));
        }
        if self.terrain_every == 0 || self.comms_every == 0 || self.lod_factor == 0 {
            return Err(HuntError::invalid(
                "schedule",
                "stagger periods and lod_factor must be at least 1",
            ));
        }
        positive("schedule.lod_distance", self.lod_distance)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), HuntError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(HuntError::invalid(field, format!("expected a positive finite value, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), HuntError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(HuntError::invalid(field, format!("expected a finite value >= 0, got {value}")))
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), HuntError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(HuntError::invalid(field, format!("expected a value in [0, 1], got {value}")))
    }
}

fn unit_span(field: &'static str, span: Span) -> Result<(), HuntError> {
    span.check(field)?;
    unit(field, span.min)?;
    unit(field, span.max)
}

fn at_least_one(field: &'static str, value: usize) -> Result<(), HuntError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(HuntError::invalid(field, "must be at least 1"))
    }
}
