//! Per-agent transition rules.
//!
//! [`decide`] is evaluated once per tick and walks a fixed priority list: forced directive,
//! vitals, an actionable inbox message, then normal progression gated by the decision timer.
//! [`enter`] performs the bookkeeping of a state change, including the attack-bag draw.

use wolfpack_core::{SimRng, Vec2};

use crate::agent::Agent;
use crate::attack::{AttackKind, AttackOutcome};
use crate::comms::{Message, MessageKind};
use crate::config::AgentTuning;
use crate::host::TargetInput;
use crate::terrain::TerrainKind;
use crate::AgentState;

/// Seconds after a block or roll during which smart agents hold their swing.
const GUARD_MEMORY: f32 = 0.3;

/// What an agent can see of the target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub target: Vec2,
    pub target_facing: Vec2,
    /// Where the agent aims when leading the target.
    pub predicted: Vec2,
    /// Unit vector from the agent toward the target (zero when on top of it).
    pub toward: Vec2,
    pub distance: f32,
    pub in_detection: bool,
    pub in_hearing: bool,
    pub in_threaten: bool,
    pub in_probe: bool,
    pub in_attack: bool,
    /// The target blocked or rolled very recently.
    pub guarded: bool,
}

impl Perception {
    pub fn new(
        agent: &Agent,
        target: &TargetInput,
        predicted: Vec2,
        now: f32,
        tuning: &AgentTuning,
    ) -> Self {
        let offset = target.position - agent.position;
        let distance = offset.length();
        let recent = |t: Option<f32>| t.is_some_and(|t| now - t <= GUARD_MEMORY);
        let senses = agent.kind.modifiers().detection;
        Self {
            target: target.position,
            target_facing: target.facing,
            predicted,
            toward: offset.normalize_or_zero(),
            distance,
            in_detection: distance <= tuning.detection_range * senses,
            in_hearing: distance <= tuning.hearing_range() * senses,
            in_threaten: distance <= tuning.threaten_range(),
            in_probe: distance <= tuning.probe_range(),
            in_attack: distance <= tuning.attack_range,
            guarded: target.blocking
                || target.rolling
                || recent(agent.memory.last_block)
                || recent(agent.memory.last_roll),
        }
    }
}

/// The outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub state: AgentState,
    /// Side to flank on, when a flank order picked it.
    pub flank_side: Option<f32>,
    /// The decision came from an inbox message.
    pub from_message: bool,
}

impl Decision {
    fn to(state: AgentState) -> Self {
        Self {
            state,
            flank_side: None,
            from_message: false,
        }
    }
}

/// Message-relevant facts about an agent, captured before its inbox is borrowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Receptiveness {
    pub state: AgentState,
    pub under_directive: bool,
    pub can_engage: bool,
    pub flanking_plan: bool,
    pub in_detection: bool,
}

impl Receptiveness {
    pub fn of(agent: &Agent, perception: &Perception) -> Self {
        Self {
            state: agent.state,
            under_directive: agent.active_directive().is_some(),
            can_engage: agent.can_engage(),
            flanking_plan: agent.engagement.preferred == AgentState::Flank,
            in_detection: perception.in_detection,
        }
    }

    /// Whether `message` may drive a transition right now.
    pub fn accepts(&self, message: &Message) -> bool {
        if self.state.ignores_messages() || self.under_directive {
            return false;
        }
        match message.kind {
            MessageKind::AttackNow => self.can_engage && self.in_detection,
            MessageKind::Retreat => self.state != AgentState::Retreat,
            MessageKind::FlankLeft | MessageKind::FlankRight => {
                self.flanking_plan && self.in_detection && self.state != AgentState::Flank
            }
            MessageKind::NeedHelp => {
                self.in_detection
                    && !matches!(self.state, AgentState::Approach | AgentState::Strafe)
            }
            MessageKind::TargetSpotted => self.state.is_calm(),
            MessageKind::Regroup => true,
        }
    }
}

/// Picks the agent's next state.
///
/// `aggression` is the agent's effective aggression. The only draw is the combo roll, made when
/// an attack ends with the agent eager and rested enough to chain.
pub fn decide(
    agent: &Agent,
    perception: &Perception,
    message: Option<&Message>,
    aggression: f32,
    tuning: &AgentTuning,
    rng: &mut SimRng,
) -> Decision {
    let state = agent.state;

    if let Some(directive) = agent.active_directive() {
        return Decision::to(directive.state);
    }

    if agent.health <= tuning.flee_health
        && perception.in_hearing
        && !matches!(state, AgentState::Flee | AgentState::Recover)
    {
        return Decision::to(AgentState::Flee);
    }
    if !state.is_withdrawing()
        && ((agent.health < tuning.retreat_health && agent.morale < tuning.retreat_morale)
            || agent.engagement.retreat)
    {
        return Decision::to(AgentState::Retreat);
    }

    if let Some(message) = message {
        let mut decision = Decision {
            state: react(message, perception),
            flank_side: None,
            from_message: true,
        };
        decision.flank_side = match message.kind {
            MessageKind::FlankLeft => Some(-1.0),
            MessageKind::FlankRight => Some(1.0),
            _ => None,
        };
        return decision;
    }

    if agent.decision_timer > 0.0 {
        return Decision::to(state);
    }
    Decision::to(progress(agent, perception, aggression, tuning, rng))
}

fn react(message: &Message, perception: &Perception) -> AgentState {
    match message.kind {
        MessageKind::AttackNow if perception.in_attack => AgentState::Attack,
        MessageKind::AttackNow | MessageKind::NeedHelp => AgentState::Approach,
        MessageKind::Retreat => AgentState::Retreat,
        MessageKind::FlankLeft | MessageKind::FlankRight => AgentState::Flank,
        MessageKind::TargetSpotted | MessageKind::Regroup => AgentState::Alert,
    }
}

fn progress(
    agent: &Agent,
    p: &Perception,
    aggression: f32,
    tuning: &AgentTuning,
    rng: &mut SimRng,
) -> AgentState {
    let timer_done = agent.state_timer <= 0.0;
    let smart = agent.intelligence > tuning.terrain_intelligence;
    // Smart agents wait out a raised guard instead of swinging into it.
    let may_swing = agent.can_engage()
        && agent.stamina >= tuning.attack_stamina_cost
        && !(smart && p.guarded);

    match agent.state {
        AgentState::Idle | AgentState::Patrol => {
            if p.in_detection {
                AgentState::Alert
            } else if p.in_hearing {
                AgentState::Investigate
            } else if timer_done {
                if agent.state == AgentState::Idle {
                    AgentState::Patrol
                } else {
                    AgentState::Idle
                }
            } else {
                agent.state
            }
        }
        AgentState::Investigate => {
            if p.in_detection {
                AgentState::Alert
            } else if timer_done {
                AgentState::Patrol
            } else {
                AgentState::Investigate
            }
        }
        AgentState::Alert => {
            if !timer_done || agent.engagement.regroup.is_some() {
                AgentState::Alert
            } else if !p.in_hearing {
                AgentState::Patrol
            } else if p.in_probe {
                AgentState::Strafe
            } else {
                engagement_state(agent, smart)
            }
        }
        AgentState::Approach => {
            if !p.in_hearing {
                AgentState::Alert
            } else if p.in_probe || (agent.holding_off && p.in_threaten) {
                AgentState::Strafe
            } else {
                AgentState::Approach
            }
        }
        AgentState::Strafe => {
            if p.in_attack && may_swing {
                AgentState::Attack
            } else if !p.in_hearing {
                AgentState::Alert
            } else if timer_done && !p.in_threaten {
                AgentState::Approach
            } else {
                AgentState::Strafe
            }
        }
        AgentState::Attack => {
            if !timer_done {
                AgentState::Attack
            } else if aggression > tuning.combo_aggression
                && agent.stamina > tuning.combo_stamina
                && rng.chance(aggression * 0.5)
            {
                AgentState::Combo
            } else {
                AgentState::Recover
            }
        }
        AgentState::Combo | AgentState::Retreat => {
            if timer_done {
                AgentState::Recover
            } else {
                agent.state
            }
        }
        AgentState::Recover => {
            if !timer_done {
                AgentState::Recover
            } else if p.in_threaten {
                AgentState::Strafe
            } else if p.in_detection {
                AgentState::Alert
            } else {
                AgentState::Idle
            }
        }
        AgentState::Flee => {
            if p.in_detection {
                AgentState::Flee
            } else {
                AgentState::Recover
            }
        }
        AgentState::Ambush => {
            if p.distance <= 2.0 * tuning.attack_range && may_swing {
                AgentState::Attack
            } else if timer_done {
                AgentState::Approach
            } else {
                AgentState::Ambush
            }
        }
        AgentState::Flank => {
            if p.in_probe {
                AgentState::Strafe
            } else if !p.in_hearing {
                AgentState::Alert
            } else if timer_done {
                AgentState::Approach
            } else {
                AgentState::Flank
            }
        }
    }
}

/// The state an Alert agent moves into under its pack orders.
fn engagement_state(agent: &Agent, smart: bool) -> AgentState {
    match agent.engagement.preferred {
        AgentState::Ambush if smart && agent.terrain.contains(TerrainKind::Cover) => {
            AgentState::Ambush
        }
        AgentState::Ambush => AgentState::Approach,
        AgentState::Flank => AgentState::Flank,
        AgentState::Strafe => AgentState::Strafe,
        _ => AgentState::Approach,
    }
}

/// Nominal seconds `agent` should spend in `state` once entered.
pub fn state_duration(agent: &Agent, state: AgentState) -> f32 {
    let base = if state.is_attacking() {
        agent.attack.kind.timing().total()
    } else {
        state.base_duration()
    };
    base * agent.emotion.current.duration_multiplier(state) * agent.tempo
}

/// Bookkeeping produced by [`enter`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateEntry {
    /// A swing ended on the way out.
    pub resolved: Option<AttackOutcome>,
    /// A swing started on the way in.
    pub started: Option<AttackKind>,
    /// The attack chain ended, so an engage cooldown is owed.
    pub chain_ended: bool,
}

/// Moves `agent` into `next`.
///
/// Entering Attack or Combo draws the next swing from the agent's bag; a drawn feint is kept
/// with probability `feint_keep` (one extra draw when below 1) and otherwise replaced.
pub fn enter(
    agent: &mut Agent,
    next: AgentState,
    feint_keep: f32,
    rng: &mut SimRng,
    tuning: &AgentTuning,
) -> StateEntry {
    let mut entry = StateEntry::default();
    let from = agent.state;

    if from.is_attacking() {
        let outcome = agent.attack.finish();
        if matches!(
            outcome,
            AttackOutcome::Blocked | AttackOutcome::Dodged | AttackOutcome::Missed
        ) {
            agent.swings_failed = agent.swings_failed.saturating_add(1);
            agent.emotion.on_attack_failed();
        }
        entry.resolved = Some(outcome);
        if !next.is_attacking() {
            agent.attack.cooldown_pending = true;
            entry.chain_ended = true;
        }
    }

    if next.is_attacking() {
        let mut kind = agent.attack.bag.draw(rng).unwrap_or_default();
        if kind == AttackKind::Feint && feint_keep < 1.0 && !rng.chance(feint_keep) {
            kind = agent.attack.bag.draw(rng).unwrap_or_default();
        }
        agent.attack.begin(kind);
        agent.stamina = (agent.stamina - tuning.attack_stamina_cost).max(0.0);
        entry.started = Some(kind);
    }

    if next == AgentState::Retreat {
        agent.morale = (agent.morale - tuning.retreat_morale_cost).max(0.0);
    }

    agent.previous_state = from;
    agent.state = next;
    agent.state_elapsed = 0.0;
    agent.state_timer = state_duration(agent, next);
    entry
}
