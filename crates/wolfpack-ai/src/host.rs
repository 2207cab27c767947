//! Seams to the game: the target we hunt and the collaborators we call out to.
//!
//! The coordinator reads the target through [`TargetInput`] and writes side effects through
//! [`CombatSink`] and [`PhysicsBridge`]. Nothing in the engine reaches into game state directly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{AgentKey, BodyHandle, Vec2};

/// Per-tick view of the target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetInput {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Vec2,
    /// Fraction of full health, `[0, 1]`.
    pub health: f32,
    pub blocking: bool,
    pub rolling: bool,
    /// The target evaded a swing this tick.
    pub dodged: bool,
}

impl Default for TargetInput {
    fn default() -> Self {
        Self {
            position: Vec2::new(0.5, 0.5),
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            health: 1.0,
            blocking: false,
            rolling: false,
            dodged: false,
        }
    }
}

impl TargetInput {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Replaces non-finite fields: position with `last_position`, velocity with zero, health
    /// with `last_health`. Returns the cleaned input and whether anything was replaced.
    pub fn sanitized(&self, last_position: Vec2, last_health: f32) -> (Self, bool) {
        let mut clean = *self;
        let mut repaired = false;
        if !clean.position.is_finite() {
            clean.position = last_position;
            repaired = true;
        }
        if !clean.velocity.is_finite() {
            clean.velocity = Vec2::ZERO;
            repaired = true;
        }
        let facing = clean.facing.finite_or(Vec2::ZERO).normalize_or_zero();
        if facing == Vec2::ZERO {
            repaired |= !clean.facing.is_finite();
            clean.facing = Vec2::X;
        } else {
            clean.facing = facing;
        }
        if !clean.health.is_finite() {
            clean.health = last_health;
            repaired = true;
        }
        clean.position = clean.position.clamp_components(0.0, 1.0);
        clean.health = clean.health.clamp(0.0, 1.0);
        (clean, repaired)
    }
}

/// Receives damage the pack deals to the target.
pub trait CombatSink {
    /// `direction` points from the attacker toward the target.
    fn apply_damage(&mut self, at: Vec2, direction: Vec2, amount: f32);
}

/// Owns the rigid bodies backing each agent.
pub trait PhysicsBridge {
    fn create_body(&mut self, agent: AgentKey, position: Vec2) -> BodyHandle;

    fn destroy_body(&mut self, body: BodyHandle);

    /// Lets the physics layer correct an integrated position (collisions, obstacles).
    ///
    /// `None` keeps the engine's own position.
    fn resolve_motion(
        &mut self,
        body: BodyHandle,
        position: Vec2,
        velocity: Vec2,
        dt: f32,
    ) -> Option<Vec2> {
        let _ = (body, position, velocity, dt);
        None
    }
}

/// Everything `update` needs from the game.
pub trait HuntHost: CombatSink + PhysicsBridge {}

impl<T: CombatSink + PhysicsBridge> HuntHost for T {}

/// Host that swallows damage and hands out sequential body handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullHost {
    next_body: u64,
}

impl CombatSink for NullHost {
    fn apply_damage(&mut self, _at: Vec2, _direction: Vec2, _amount: f32) {}
}

impl PhysicsBridge for NullHost {
    fn create_body(&mut self, _agent: AgentKey, _position: Vec2) -> BodyHandle {
        self.next_body += 1;
        BodyHandle(self.next_body)
    }

    fn destroy_body(&mut self, _body: BodyHandle) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DamageRequest {
    pub at: Vec2,
    pub direction: Vec2,
    pub amount: f32,
}

/// Host that records every call. Useful in tests and replays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingHost {
    pub damage: Vec<DamageRequest>,
    pub created: Vec<(AgentKey, BodyHandle)>,
    pub destroyed: Vec<BodyHandle>,
    next_body: u64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_damage(&self) -> f32 {
        self.damage.iter().map(|d| d.amount).sum()
    }
}

impl CombatSink for RecordingHost {
    fn apply_damage(&mut self, at: Vec2, direction: Vec2, amount: f32) {
        self.damage.push(DamageRequest {
            at,
            direction,
            amount,
        });
    }
}

impl PhysicsBridge for RecordingHost {
    fn create_body(&mut self, agent: AgentKey, _position: Vec2) -> BodyHandle {
        self.next_body += 1;
        let body = BodyHandle(self.next_body);
        self.created.push((agent, body));
        body
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        self.destroyed.push(body);
    }
}
