use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use wolfpack_ai::{DirectiveReason, HuntEvent};

/// A small, allocation-friendly trace event.
///
/// Flat data so it can be diffed and stored as JSON. `a` is usually the subject (agent or pack
/// id) and `b` the payload; [`TraceEvent::from_hunt`] documents the packing per tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            a: 0,
            b: 0,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }

    /// Flattens one engine event recorded during `tick`.
    ///
    /// - `agent.state`: `b = from << 8 | to` (state ids)
    /// - `pack.ability`: `b = pack << 8 | ability`
    /// - `comms.sent`: `b = kind | delivered << 8 | dropped << 36`
    /// - `difficulty.adjust`: `a` holds the skill estimate's `f32` bits
    pub fn from_hunt(tick: u64, event: &HuntEvent) -> Self {
        let base = Self::new(tick, event.tag());
        match *event {
            HuntEvent::PackSpawned { pack, members } => {
                base.with_a(pack.0.into()).with_b(members.into())
            }
            HuntEvent::PackRemoved { pack } => base.with_a(pack.0.into()),
            HuntEvent::AgentDied { agent, pack } => {
                base.with_a(agent.0.into()).with_b(pack.0.into())
            }
            HuntEvent::StateChanged { agent, from, to } => base
                .with_a(agent.0.into())
                .with_b(u64::from(from.id()) << 8 | u64::from(to.id())),
            HuntEvent::PlanChanged { pack, plan } => {
                base.with_a(pack.0.into()).with_b(plan.id().into())
            }
            HuntEvent::RoleAssigned { agent, role } => {
                base.with_a(agent.0.into()).with_b(role.id().into())
            }
            HuntEvent::LeaderAbility {
                pack,
                agent,
                ability,
            } => base
                .with_a(agent.0.into())
                .with_b(u64::from(pack.0) << 8 | u64::from(ability.id())),
            HuntEvent::MessageSent {
                sender,
                kind,
                delivered,
                dropped,
            } => base.with_a(sender.0.into()).with_b(
                u64::from(kind.id()) | u64::from(delivered) << 8 | u64::from(dropped) << 36,
            ),
            HuntEvent::AttackStarted { agent, kind } => {
                base.with_a(agent.0.into()).with_b(kind.id().into())
            }
            HuntEvent::AttackResolved { agent, outcome } => {
                base.with_a(agent.0.into()).with_b(outcome.id().into())
            }
            HuntEvent::Directive { agent, reason } => {
                let reason = match reason {
                    DirectiveReason::Mercy => 0,
                    DirectiveReason::Yield => 1,
                };
                base.with_a(agent.0.into()).with_b(reason)
            }
            HuntEvent::DifficultyAdjusted { skill } => base.with_a(skill.to_bits().into()),
        }
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Forwards every event to `tracing` at trace level.
#[derive(Debug, Default)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::trace!(
            tick = event.tick,
            tag = %event.tag,
            a = event.a,
            b = event.b,
            "hunt event"
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded during `tick`, in emission order.
    pub fn at_tick(&self, tick: u64) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }
}

/// Writes `event` to the log and the sink.
pub fn emit(log: &mut TraceLog, sink: &mut dyn TraceSink, event: TraceEvent) {
    log.push(event.clone());
    sink.emit(event);
}
