#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behaviour state of a single agent.
///
/// The discriminants are the exported state ids and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum AgentState {
    #[default]
    Idle = 0,
    Patrol = 1,
    Investigate = 2,
    Alert = 3,
    Approach = 4,
    Strafe = 5,
    Attack = 6,
    Combo = 7,
    Retreat = 8,
    Recover = 9,
    Flee = 10,
    Ambush = 11,
    Flank = 12,
}

impl AgentState {
    pub const ALL: [AgentState; 13] = [
        AgentState::Idle,
        AgentState::Patrol,
        AgentState::Investigate,
        AgentState::Alert,
        AgentState::Approach,
        AgentState::Strafe,
        AgentState::Attack,
        AgentState::Combo,
        AgentState::Retreat,
        AgentState::Recover,
        AgentState::Flee,
        AgentState::Ambush,
        AgentState::Flank,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Patrol => "patrol",
            AgentState::Investigate => "investigate",
            AgentState::Alert => "alert",
            AgentState::Approach => "approach",
            AgentState::Strafe => "strafe",
            AgentState::Attack => "attack",
            AgentState::Combo => "combo",
            AgentState::Retreat => "retreat",
            AgentState::Recover => "recover",
            AgentState::Flee => "flee",
            AgentState::Ambush => "ambush",
            AgentState::Flank => "flank",
        }
    }

    /// Nominal time spent in the state before its timer expires.
    pub fn base_duration(self) -> f32 {
        match self {
            AgentState::Idle => 2.0,
            AgentState::Patrol => 4.0,
            AgentState::Investigate => 1.5,
            AgentState::Alert => 1.0,
            AgentState::Approach => 3.0,
            AgentState::Strafe => 2.0,
            AgentState::Attack => 0.8,
            AgentState::Combo => 0.6,
            AgentState::Retreat => 2.0,
            AgentState::Recover => 1.0,
            AgentState::Flee => 3.0,
            AgentState::Ambush => 3.0,
            AgentState::Flank => 2.5,
        }
    }

    /// States that swing at the target and therefore need a commit grant.
    pub fn is_attacking(self) -> bool {
        matches!(self, AgentState::Attack | AgentState::Combo)
    }

    /// States that never act on inbox messages.
    pub fn ignores_messages(self) -> bool {
        matches!(
            self,
            AgentState::Attack | AgentState::Combo | AgentState::Flee | AgentState::Recover
        )
    }

    /// Not yet aware of the target.
    pub fn is_calm(self) -> bool {
        matches!(
            self,
            AgentState::Idle | AgentState::Patrol | AgentState::Investigate
        )
    }

    /// Actively working the target (may claim pressure).
    pub fn is_engaged(self) -> bool {
        matches!(
            self,
            AgentState::Approach
                | AgentState::Strafe
                | AgentState::Attack
                | AgentState::Combo
                | AgentState::Ambush
                | AgentState::Flank
        )
    }

    pub fn is_withdrawing(self) -> bool {
        matches!(
            self,
            AgentState::Retreat | AgentState::Recover | AgentState::Flee
        )
    }
}
