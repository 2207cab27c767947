//! Fairness rules: pressure budgets, mercy windows, anti-corner spacing and engage cooldowns.
//!
//! Everything here produces *directives*: soft overrides that substitute an agent's next state
//! for a bounded time. None of them can put an agent into a state it could not otherwise reach.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{AgentKey, SimRng, Vec2};

use crate::config::{AgentTuning, FairnessConfig};
use crate::AgentState;

/// How hard an agent is allowed to press the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pressure {
    #[default]
    None,
    /// Circling outside the probe ring; uncapped.
    Threaten,
    /// Inside the probe ring without swinging.
    Probe,
    /// Swinging at the target.
    Commit,
}

/// The pressure an agent in `state` at `distance` from the target asks for.
pub fn requested_pressure(state: AgentState, distance: f32, tuning: &AgentTuning) -> Pressure {
    if state.is_attacking() {
        Pressure::Commit
    } else if !state.is_engaged() || state == AgentState::Ambush {
        Pressure::None
    } else if distance <= tuning.probe_range() {
        Pressure::Probe
    } else if distance <= tuning.threaten_range() {
        Pressure::Threaten
    } else {
        Pressure::None
    }
}

/// Live commit/probe grants for one pack.
///
/// Counters only move through [`PressureBudget::exchange`], so they never exceed the caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PressureBudget {
    pub commits: u8,
    pub probes: u8,
}

impl PressureBudget {
    /// Rebuilds the counters from the grants members currently hold, demoting grants beyond the
    /// caps. Returns how many grants had to be demoted.
    pub fn rebuild<'a>(
        grants: impl IntoIterator<Item = &'a mut Pressure>,
        config: &FairnessConfig,
    ) -> (Self, usize) {
        let mut budget = Self::default();
        let mut demoted = 0;
        for grant in grants {
            let held = *grant;
            let kept = budget.exchange(Pressure::None, held, config);
            if kept != held {
                demoted += 1;
            }
            *grant = kept;
        }
        (budget, demoted)
    }

    /// Releases `held` and requests `wanted`, returning what was granted.
    ///
    /// An over-cap commit falls back to a probe when one is free; anything else over cap becomes
    /// threaten-only.
    pub fn exchange(
        &mut self,
        held: Pressure,
        wanted: Pressure,
        config: &FairnessConfig,
    ) -> Pressure {
        self.release(held);
        match wanted {
            Pressure::Commit if self.commits < config.commit_cap => {
                self.commits += 1;
                Pressure::Commit
            }
            Pressure::Commit | Pressure::Probe if self.probes < config.probe_cap => {
                self.probes += 1;
                Pressure::Probe
            }
            Pressure::Commit | Pressure::Probe => Pressure::Threaten,
            other => other,
        }
    }

    pub fn release(&mut self, held: Pressure) {
        match held {
            Pressure::Commit => self.commits = self.commits.saturating_sub(1),
            Pressure::Probe => self.probes = self.probes.saturating_sub(1),
            Pressure::None | Pressure::Threaten => {}
        }
    }

    /// Whether a request for `pressure` would be granted as asked.
    pub fn has_room(&self, pressure: Pressure, config: &FairnessConfig) -> bool {
        match pressure {
            Pressure::Commit => self.commits < config.commit_cap,
            Pressure::Probe => self.probes < config.probe_cap,
            Pressure::None | Pressure::Threaten => true,
        }
    }

    pub fn within(&self, config: &FairnessConfig) -> bool {
        self.commits <= config.commit_cap && self.probes <= config.probe_cap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DirectiveReason {
    Mercy,
    Yield,
}

/// A timed state override.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Directive {
    pub state: AgentState,
    pub remaining: f32,
    pub reason: DirectiveReason,
}

impl Directive {
    /// Forced disengage after the mercy window fills. Draws its duration.
    pub fn mercy(rng: &mut SimRng, config: &FairnessConfig) -> Self {
        Self {
            state: AgentState::Retreat,
            remaining: config.disengage.sample(rng),
            reason: DirectiveReason::Mercy,
        }
    }

    /// Anti-corner yield for one decision interval.
    pub fn yield_for(seconds: f32) -> Self {
        Self {
            state: AgentState::Strafe,
            remaining: seconds,
            reason: DirectiveReason::Yield,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Rolling log of hits on the target, shared by every pack.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MercyWindow {
    hits: Vec<f32>,
    pub triggers: u32,
}

impl MercyWindow {
    pub fn record_hit(&mut self, now: f32) {
        self.hits.push(now);
    }

    pub fn hits(&self) -> usize {
        self.hits.len()
    }

    /// Forgets hits older than the window and reports whether the log is full.
    ///
    /// A full log is cleared, so the next trigger needs a fresh set of hits.
    pub fn check(&mut self, now: f32, config: &FairnessConfig) -> bool {
        let window = config.mercy_window;
        self.hits.retain(|&t| now - t <= window);
        if self.hits.len() >= config.mercy_hits {
            self.hits.clear();
            self.triggers = self.triggers.saturating_add(1);
            true
        } else {
            false
        }
    }
}

/// An agent considered by the anti-corner pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engaged {
    pub id: AgentKey,
    pub position: Vec2,
}

/// Agents that must yield so no two engaged agents share a narrow arc around the target.
///
/// Pairs are compared in the order given. Of a pair inside the arc, the one farther from the
/// target yields; on equal distance the one more behind the target's facing yields, then the
/// higher id. A yielding agent is not compared again.
pub fn corner_yielders(
    target: Vec2,
    target_facing: Vec2,
    engaged: &[Engaged],
    arc_cos: f32,
) -> Vec<AgentKey> {
    let dirs: Vec<(Vec2, f32)> = engaged
        .iter()
        .map(|e| {
            let offset = e.position - target;
            (offset.normalize_or_zero(), offset.length())
        })
        .collect();
    let mut yielding = vec![false; engaged.len()];

    for i in 0..engaged.len() {
        for j in (i + 1)..engaged.len() {
            if yielding[i] || yielding[j] {
                continue;
            }
            let (dir_i, dist_i) = dirs[i];
            let (dir_j, dist_j) = dirs[j];
            if dir_i == Vec2::ZERO || dir_j == Vec2::ZERO || dir_i.dot(dir_j) < arc_cos {
                continue;
            }
            let j_yields = if dist_i != dist_j {
                dist_j > dist_i
            } else {
                let front_i = dir_i.dot(target_facing);
                let front_j = dir_j.dot(target_facing);
                if front_i != front_j {
                    front_j < front_i
                } else {
                    engaged[j].id > engaged[i].id
                }
            };
            if j_yields {
                yielding[j] = true;
            } else {
                yielding[i] = true;
            }
        }
    }

    engaged
        .iter()
        .zip(yielding)
        .filter_map(|(e, y)| y.then_some(e.id))
        .collect()
}
