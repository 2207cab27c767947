//! Static map features and the per-agent scored cache built from them.
//!
//! The registry is read-only after construction. Agents rescan on a jittered interval and the
//! state machine only ever reads the cached result.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{SimRng, Vec2};

use crate::config::TerrainConfig;
use crate::AgentState;

/// Stream tag for per-agent terrain phase offsets.
pub const TERRAIN_STREAM: u64 = 0x7465_7272;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TerrainKind {
    HighGround = 0,
    LowGround = 1,
    Cover = 2,
    OpenField = 3,
    Chokepoint = 4,
    Water = 5,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 6] = [
        TerrainKind::HighGround,
        TerrainKind::LowGround,
        TerrainKind::Cover,
        TerrainKind::OpenField,
        TerrainKind::Chokepoint,
        TerrainKind::Water,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainKind::HighGround => "high_ground",
            TerrainKind::LowGround => "low_ground",
            TerrainKind::Cover => "cover",
            TerrainKind::OpenField => "open_field",
            TerrainKind::Chokepoint => "chokepoint",
            TerrainKind::Water => "water",
        }
    }

    /// Default advantage for a feature of this kind.
    pub fn base_advantage(self) -> f32 {
        match self {
            TerrainKind::HighGround => 0.8,
            TerrainKind::Cover => 0.7,
            TerrainKind::Chokepoint => 0.6,
            TerrainKind::OpenField => 0.4,
            TerrainKind::LowGround => 0.3,
            TerrainKind::Water => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerrainFeature {
    pub position: Vec2,
    pub radius: f32,
    pub kind: TerrainKind,
    pub advantage: f32,
}

impl TerrainFeature {
    pub fn new(position: Vec2, radius: f32, kind: TerrainKind) -> Self {
        Self {
            position,
            radius,
            kind,
            advantage: kind.base_advantage(),
        }
    }

    pub fn with_advantage(mut self, advantage: f32) -> Self {
        self.advantage = advantage;
        self
    }
}

/// Read-only feature list shared by every agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainRegistry {
    features: Vec<TerrainFeature>,
}

impl TerrainRegistry {
    /// Drops non-finite features, clamps the rest into the world and keeps at most `max` of them.
    pub fn new(features: impl IntoIterator<Item = TerrainFeature>, max: usize) -> Self {
        let mut kept = Vec::new();
        for feature in features {
            if kept.len() >= max {
                tracing::warn!(max, "terrain registry full; dropping remaining features");
                break;
            }
            if !feature.position.is_finite()
                || !feature.radius.is_finite()
                || !feature.advantage.is_finite()
            {
                tracing::warn!(kind = feature.kind.name(), "dropping non-finite terrain feature");
                continue;
            }
            kept.push(TerrainFeature {
                position: feature.position.clamp_components(0.0, 1.0),
                radius: feature.radius.max(0.0),
                advantage: feature.advantage.clamp(0.0, 1.0),
                kind: feature.kind,
            });
        }
        Self { features: kept }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TerrainFeature> {
        self.features.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainFeature> {
        self.features.iter()
    }
}

/// A feature as seen by one agent at its last scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredFeature {
    pub index: usize,
    pub kind: TerrainKind,
    pub position: Vec2,
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainCache {
    entries: Vec<ScoredFeature>,
    /// Seconds until the next rescan is allowed.
    pub rescan_timer: f32,
    pub scans: u32,
}

impl TerrainCache {
    pub fn with_first_scan_in(seconds: f32) -> Self {
        Self {
            entries: Vec::new(),
            rescan_timer: seconds,
            scans: 0,
        }
    }

    /// Best-first.
    pub fn entries(&self) -> &[ScoredFeature] {
        &self.entries
    }

    pub fn best(&self) -> Option<&ScoredFeature> {
        self.entries.first()
    }

    pub fn best_of(&self, kind: TerrainKind) -> Option<&ScoredFeature> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    pub fn contains(&self, kind: TerrainKind) -> bool {
        self.best_of(kind).is_some()
    }
}

/// Score multiplier for `kind` given what the agent is doing.
pub fn state_multiplier(
    kind: TerrainKind,
    state: AgentState,
    morale: f32,
    config: &TerrainConfig,
) -> f32 {
    match kind {
        TerrainKind::Cover if matches!(state, AgentState::Approach | AgentState::Ambush) => {
            config.cover_boost
        }
        TerrainKind::Chokepoint if matches!(state, AgentState::Retreat | AgentState::Flee) => {
            config.chokepoint_boost
        }
        TerrainKind::HighGround if matches!(state, AgentState::Ambush | AgentState::Flank) => {
            config.high_ground_boost
        }
        TerrainKind::OpenField if morale < config.low_morale => config.open_field_low_morale,
        TerrainKind::LowGround => config.low_ground,
        TerrainKind::Water => config.water,
        _ => 1.0,
    }
}

/// Scores every feature within the scan radius and returns the best `cache_capacity` of them.
pub fn scan(
    registry: &TerrainRegistry,
    position: Vec2,
    state: AgentState,
    morale: f32,
    config: &TerrainConfig,
) -> Vec<ScoredFeature> {
    let radius = config.scan_radius;
    let mut scored: Vec<ScoredFeature> = registry
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let d = position.distance(feature.position);
            if d > radius {
                return None;
            }
            let proximity = 1.0 - 0.5 * d / radius;
            let score = feature.advantage * state_multiplier(feature.kind, state, morale, config)
                * proximity;
            Some(ScoredFeature {
                index,
                kind: feature.kind,
                position: feature.position,
                score,
            })
        })
        .collect();

    // Higher score first; equal scores keep the lower feature index.
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.index.cmp(&b.index))
    });
    scored.truncate(config.cache_capacity);
    scored
}

/// Advances the rescan timer and rescans when it has expired and the agent's stagger slot is due.
///
/// Returns whether a scan ran. Each scan draws the next interval from `rng`.
#[allow(clippy::too_many_arguments)]
pub fn tick(
    cache: &mut TerrainCache,
    registry: &TerrainRegistry,
    position: Vec2,
    state: AgentState,
    morale: f32,
    dt: f32,
    due: bool,
    rng: &mut SimRng,
    config: &TerrainConfig,
) -> bool {
    cache.rescan_timer -= dt;
    if cache.rescan_timer > 0.0 || !due {
        return false;
    }
    cache.entries = scan(registry, position, state, morale, config);
    cache.rescan_timer = config.scan_interval.sample(rng);
    cache.scans = cache.scans.saturating_add(1);
    true
}
