#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{AgentKey, PackKey};

use crate::attack::{AttackKind, AttackOutcome};
use crate::comms::MessageKind;
use crate::fairness::DirectiveReason;
use crate::pack::{LeaderAbility, PackPlan, Role};
use crate::AgentState;

/// Events are kept until drained; past this many the oldest are discarded.
pub const EVENT_CAPACITY: usize = 4096;

/// Something observable that happened inside the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HuntEvent {
    PackSpawned {
        pack: PackKey,
        members: u32,
    },
    PackRemoved {
        pack: PackKey,
    },
    AgentDied {
        agent: AgentKey,
        pack: PackKey,
    },
    StateChanged {
        agent: AgentKey,
        from: AgentState,
        to: AgentState,
    },
    PlanChanged {
        pack: PackKey,
        plan: PackPlan,
    },
    RoleAssigned {
        agent: AgentKey,
        role: Role,
    },
    LeaderAbility {
        pack: PackKey,
        agent: AgentKey,
        ability: LeaderAbility,
    },
    MessageSent {
        sender: AgentKey,
        kind: MessageKind,
        delivered: u32,
        dropped: u32,
    },
    AttackStarted {
        agent: AgentKey,
        kind: AttackKind,
    },
    AttackResolved {
        agent: AgentKey,
        outcome: AttackOutcome,
    },
    Directive {
        agent: AgentKey,
        reason: DirectiveReason,
    },
    DifficultyAdjusted {
        skill: f32,
    },
}

impl HuntEvent {
    /// Short stable tag, used for trace output.
    pub fn tag(&self) -> &'static str {
        match self {
            HuntEvent::PackSpawned { .. } => "pack.spawned",
            HuntEvent::PackRemoved { .. } => "pack.removed",
            HuntEvent::AgentDied { .. } => "agent.died",
            HuntEvent::StateChanged { .. } => "agent.state",
            HuntEvent::PlanChanged { .. } => "pack.plan",
            HuntEvent::RoleAssigned { .. } => "agent.role",
            HuntEvent::LeaderAbility { .. } => "pack.ability",
            HuntEvent::MessageSent { .. } => "comms.sent",
            HuntEvent::AttackStarted { .. } => "attack.start",
            HuntEvent::AttackResolved { .. } => "attack.resolve",
            HuntEvent::Directive { .. } => "fairness.directive",
            HuntEvent::DifficultyAdjusted { .. } => "difficulty.adjust",
        }
    }
}
