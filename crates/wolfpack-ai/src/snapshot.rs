//! Read-only views of the simulation for hosts, replays and golden files.
//!
//! The flat getters take plain indices (agents in id order, packs in id order, features in
//! registry order) and return a fixed default for anything out of range, so a host polling
//! every frame never has to handle an error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{AgentKey, PackKey, RngState, Vec2};

use crate::agent::WolfKind;
use crate::coordinator::PackCoordinator;
use crate::emotion::Emotion;
use crate::pack::{PackPlan, Role};
use crate::AgentState;

impl PackCoordinator {
    pub fn agent_count(&self) -> usize {
        self.agents().len()
    }

    pub fn agent_id(&self, index: usize) -> u32 {
        self.agents().get(index).map_or(0, |a| a.id.0)
    }

    pub fn agent_x(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.position.x)
    }

    pub fn agent_y(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.position.y)
    }

    pub fn agent_vx(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.velocity.x)
    }

    pub fn agent_vy(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.velocity.y)
    }

    /// Facing as a unit vector; `(0, 0)` out of range.
    pub fn agent_facing(&self, index: usize) -> (f32, f32) {
        self.agents()
            .get(index)
            .map_or((0.0, 0.0), |a| (a.facing.x, a.facing.y))
    }

    pub fn agent_health(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.health)
    }

    pub fn agent_state(&self, index: usize) -> u8 {
        self.agents().get(index).map_or(0, |a| a.state.id())
    }

    pub fn agent_emotion(&self, index: usize) -> u8 {
        self.agents().get(index).map_or(0, |a| a.emotion.current.id())
    }

    pub fn agent_kind(&self, index: usize) -> u8 {
        self.agents().get(index).map_or(0, |a| a.kind.id())
    }

    pub fn agent_pack(&self, index: usize) -> u32 {
        self.agents().get(index).map_or(0, |a| a.pack.0)
    }

    pub fn agent_role(&self, index: usize) -> u8 {
        self.agents().get(index).map_or(0, |a| a.role.id())
    }

    pub fn agent_aggression(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.aggression)
    }

    pub fn agent_morale(&self, index: usize) -> f32 {
        self.agents().get(index).map_or(0.0, |a| a.morale)
    }

    pub fn pack_count(&self) -> usize {
        self.packs().len()
    }

    /// Plan id of the pack at `index`; `0` when out of range or before the first plan.
    pub fn pack_plan(&self, index: usize) -> u8 {
        self.packs()
            .get(index)
            .and_then(|p| p.plan)
            .map_or(0, PackPlan::id)
    }

    pub fn pack_morale(&self, index: usize) -> f32 {
        self.packs().get(index).map_or(0.0, |p| p.morale)
    }

    pub fn pack_member_count(&self, index: usize) -> usize {
        self.packs().get(index).map_or(0, |p| p.members.len())
    }

    /// Position of the leader in the pack's member list, or `-1`.
    pub fn pack_leader_index(&self, index: usize) -> i32 {
        self.packs()
            .get(index)
            .and_then(|p| p.leader.and_then(|leader| p.member_index(leader)))
            .map_or(-1, |i| i as i32)
    }

    pub fn terrain_count(&self) -> usize {
        self.terrain().len()
    }

    pub fn terrain_x(&self, index: usize) -> f32 {
        self.terrain().get(index).map_or(0.0, |f| f.position.x)
    }

    pub fn terrain_y(&self, index: usize) -> f32 {
        self.terrain().get(index).map_or(0.0, |f| f.position.y)
    }

    pub fn terrain_radius(&self, index: usize) -> f32 {
        self.terrain().get(index).map_or(0.0, |f| f.radius)
    }

    pub fn terrain_type(&self, index: usize) -> u8 {
        self.terrain().get(index).map_or(0, |f| f.kind.id())
    }

    /// Owned copy of everything a replay needs to compare two runs.
    pub fn snapshot(&self) -> HuntSnapshot {
        HuntSnapshot {
            frame: self.frame(),
            time: self.time(),
            rng: self.rng().state(),
            agents: self
                .agents()
                .iter()
                .map(|a| AgentSnapshot {
                    id: a.id,
                    pack: a.pack,
                    kind: a.kind,
                    position: a.position,
                    velocity: a.velocity,
                    facing: a.facing,
                    health: a.health,
                    stamina: a.stamina,
                    morale: a.morale,
                    aggression: a.aggression,
                    state: a.state,
                    emotion: a.emotion.current,
                    role: a.role,
                })
                .collect(),
            packs: self
                .packs()
                .iter()
                .map(|p| PackSnapshot {
                    id: p.id,
                    plan: p.plan,
                    morale: p.morale,
                    members: p.members.len() as u32,
                    leader: p.leader,
                    commits: p.budget.commits,
                    probes: p.budget.probes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentSnapshot {
    pub id: AgentKey,
    pub pack: PackKey,
    pub kind: WolfKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Vec2,
    pub health: f32,
    pub stamina: f32,
    pub morale: f32,
    pub aggression: f32,
    pub state: AgentState,
    pub emotion: Emotion,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackSnapshot {
    pub id: PackKey,
    pub plan: Option<PackPlan>,
    pub morale: f32,
    pub members: u32,
    pub leader: Option<AgentKey>,
    pub commits: u8,
    pub probes: u8,
}

/// The whole observable state after one tick.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HuntSnapshot {
    pub frame: u64,
    pub time: f32,
    pub rng: RngState,
    pub agents: Vec<AgentSnapshot>,
    pub packs: Vec<PackSnapshot>,
}

impl HuntSnapshot {
    /// Canonical little-endian encoding. Floats are written by bit pattern, so two snapshots
    /// encode equal exactly when every value is bit-identical.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(40 + self.agents.len() * 64 + self.packs.len() * 24);
        let f = |out: &mut Vec<u8>, v: f32| out.extend_from_slice(&v.to_bits().to_le_bytes());
        let v = |out: &mut Vec<u8>, v: Vec2| {
            f(out, v.x);
            f(out, v.y);
        };

        out.extend_from_slice(&self.frame.to_le_bytes());
        f(&mut out, self.time);
        out.extend_from_slice(&self.rng.seed.to_le_bytes());
        out.extend_from_slice(&self.rng.state.to_le_bytes());
        out.extend_from_slice(&self.rng.draws.to_le_bytes());

        out.extend_from_slice(&(self.agents.len() as u32).to_le_bytes());
        for a in &self.agents {
            out.extend_from_slice(&a.id.0.to_le_bytes());
            out.extend_from_slice(&a.pack.0.to_le_bytes());
            v(&mut out, a.position);
            v(&mut out, a.velocity);
            v(&mut out, a.facing);
            for value in [a.health, a.stamina, a.morale, a.aggression] {
                f(&mut out, value);
            }
            out.extend_from_slice(&[a.state.id(), a.emotion.id(), a.role.id(), a.kind.id()]);
        }

        out.extend_from_slice(&(self.packs.len() as u32).to_le_bytes());
        for p in &self.packs {
            out.extend_from_slice(&p.id.0.to_le_bytes());
            out.push(p.plan.map_or(u8::MAX, PackPlan::id));
            f(&mut out, p.morale);
            out.extend_from_slice(&p.members.to_le_bytes());
            out.extend_from_slice(&p.leader.map_or(u32::MAX, |l| l.0).to_le_bytes());
            out.extend_from_slice(&[p.commits, p.probes]);
        }
        out
    }

    /// 64-bit FNV-1a over [`Self::to_bytes`], for cheap per-tick comparison.
    pub fn digest(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0100_0000_01b3;
        self.to_bytes()
            .iter()
            .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
    }
}
