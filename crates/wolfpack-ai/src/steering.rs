//! Desired velocities per state, packmate separation and integration.

use std::collections::BTreeMap;

use wolfpack_core::{AgentKey, PackKey, Vec2};

use crate::agent::Agent;
use crate::attack::AttackPhase;
use crate::config::AgentTuning;
use crate::state_machine::Perception;
use crate::terrain::TerrainKind;
use crate::AgentState;

/// Below this stamina agents move at reduced speed.
const TIRED_STAMINA: f32 = 0.2;
const TIRED_SPEED: f32 = 0.7;
/// Distance at which an agent counts as having reached a waypoint.
const ARRIVE_RADIUS: f32 = 0.02;

/// Speed multipliers per state, relative to base speed.
fn state_speed(state: AgentState) -> f32 {
    match state {
        AgentState::Idle | AgentState::Recover => 0.3,
        AgentState::Patrol => 0.4,
        AgentState::Investigate => 0.6,
        AgentState::Alert | AgentState::Strafe => 0.7,
        AgentState::Ambush => 0.8,
        AgentState::Retreat => 0.9,
        AgentState::Approach | AgentState::Flank => 1.0,
        AgentState::Flee => 1.1,
        AgentState::Attack | AgentState::Combo => 1.6,
    }
}

/// States that spend stamina while moving.
pub fn is_sprinting(agent: &Agent) -> bool {
    match agent.state {
        AgentState::Approach | AgentState::Flank | AgentState::Flee => true,
        AgentState::Attack | AgentState::Combo => {
            agent.attack.kind.timing().phase_at(agent.state_elapsed) == AttackPhase::Execute
        }
        _ => false,
    }
}

/// Velocity `agent` wants this tick. `speed_scale` is the difficulty speed multiplier.
pub fn desired_velocity(
    agent: &Agent,
    p: &Perception,
    speed_scale: f32,
    tuning: &AgentTuning,
) -> Vec2 {
    let mut speed = tuning.base_speed * speed_scale * state_speed(agent.state);
    if agent.stamina < TIRED_STAMINA {
        speed *= TIRED_SPEED;
    }
    let smart = agent.intelligence > tuning.terrain_intelligence;

    match agent.state {
        AgentState::Idle => Vec2::ZERO,
        AgentState::Patrol => {
            let from_home = agent.position - agent.home;
            if from_home.length() > 0.1 {
                seek(agent.position, agent.home, speed)
            } else {
                // Circle the den.
                let around = from_home.normalize_or_zero().perp();
                let around = if around == Vec2::ZERO { Vec2::X } else { around };
                around * (speed * agent.flank_side)
            }
        }
        AgentState::Investigate => arrive(agent.position, agent.memory.last_known_position, speed),
        AgentState::Alert => match agent.engagement.regroup {
            Some(point) => arrive(agent.position, point, speed),
            None if !p.in_detection => {
                arrive(agent.position, agent.memory.last_known_position, speed)
            }
            None => Vec2::ZERO,
        },
        AgentState::Approach => {
            if agent.engagement.lure || agent.holding_off {
                let ring = if agent.engagement.lure {
                    tuning.threaten_range()
                } else {
                    tuning.hold_range()
                };
                return hold_ring(p, ring, speed);
            }
            let mut dir = p.toward;
            if smart && !p.in_threaten {
                if let Some(cover) = agent.terrain.best_of(TerrainKind::Cover) {
                    let to_cover = (cover.position - agent.position).normalize_or_zero();
                    dir = (dir * 0.6 + to_cover * 0.4).normalize_or_zero();
                }
            }
            dir * speed
        }
        AgentState::Strafe => {
            let ring = if agent.holding_off {
                tuning.hold_range()
            } else if agent.can_engage() {
                tuning.attack_range * 0.8
            } else {
                tuning.probe_range() * 1.1
            };
            orbit(agent, p, ring, speed)
        }
        AgentState::Attack | AgentState::Combo => {
            match agent.attack.kind.timing().phase_at(agent.state_elapsed) {
                AttackPhase::Execute => p.toward * speed,
                AttackPhase::Anticipation | AttackPhase::Recovery => Vec2::ZERO,
            }
        }
        AgentState::Retreat | AgentState::Flee => {
            let mut dir = -p.toward;
            if smart {
                if let Some(choke) = agent.terrain.best_of(TerrainKind::Chokepoint) {
                    let to_choke = (choke.position - agent.position).normalize_or_zero();
                    dir = (dir * 0.5 + to_choke * 0.5).normalize_or_zero();
                }
            }
            if dir == Vec2::ZERO {
                dir = agent.facing * -1.0;
            }
            dir * speed
        }
        AgentState::Recover => {
            if p.in_probe {
                -p.toward * speed
            } else {
                Vec2::ZERO
            }
        }
        AgentState::Ambush => match agent.terrain.best_of(TerrainKind::Cover) {
            Some(cover) => arrive(agent.position, cover.position, speed),
            None => Vec2::ZERO,
        },
        AgentState::Flank => {
            let from_target = (agent.position - p.predicted).normalize_or_zero();
            let from_target = if from_target == Vec2::ZERO {
                -p.toward
            } else {
                from_target
            };
            let side = from_target.perp() * agent.flank_side;
            let offset = (from_target + side).normalize_or_zero() * tuning.threaten_range();
            let goal = p.predicted + offset;
            arrive(agent.position, goal.clamp_components(0.0, 1.0), speed)
        }
    }
}

/// Where the agent should look this tick.
pub fn desired_facing(agent: &Agent, p: &Perception, velocity: Vec2) -> Vec2 {
    let engaged = agent.state.is_engaged() || agent.state == AgentState::Alert;
    if engaged && p.in_hearing {
        let aim = if agent.state == AgentState::Ambush || agent.state == AgentState::Flank {
            (p.predicted - agent.position).normalize_or_zero()
        } else {
            p.toward
        };
        if aim != Vec2::ZERO {
            return aim;
        }
    }
    let heading = velocity.normalize_or_zero();
    if heading == Vec2::ZERO {
        agent.facing
    } else {
        heading
    }
}

fn seek(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Seek that slows to a stop inside [`ARRIVE_RADIUS`].
fn arrive(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let offset = to - from;
    let d = offset.length();
    if d <= ARRIVE_RADIUS {
        Vec2::ZERO
    } else {
        offset.normalize_or_zero() * (speed * (d / (ARRIVE_RADIUS * 4.0)).min(1.0))
    }
}

/// Moves onto the ring of radius `ring` around the target without circling.
fn hold_ring(p: &Perception, ring: f32, speed: f32) -> Vec2 {
    let error = p.distance - ring;
    if error.abs() <= ARRIVE_RADIUS * 0.5 {
        return Vec2::ZERO;
    }
    p.toward * (speed * (error / (ARRIVE_RADIUS * 4.0)).clamp(-1.0, 1.0))
}

/// Circles the target at radius `ring`, drifting toward the last angle a hit landed from.
fn orbit(agent: &Agent, p: &Perception, ring: f32, speed: f32) -> Vec2 {
    let outward = -p.toward;
    let mut side = agent.flank_side;
    if let Some(angle) = agent.memory.last_hit_angle {
        let cross = outward.cross(angle);
        if cross != 0.0 {
            side = cross.signum();
        }
    }
    let tangent = outward.perp() * side;
    let radial = p.toward * ((p.distance - ring) / ring.max(1e-3)).clamp(-1.0, 1.0);
    (tangent * 0.6 + radial).normalize_or_zero() * speed
}

/// Packmate separation, using a deterministic spatial hash.
#[derive(Debug, Clone)]
pub struct Separation {
    radius: f32,
    weight: f32,
    buckets: BTreeMap<Cell, Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cell(i32, i32);

impl Separation {
    pub fn new(radius: f32, weight: f32) -> Self {
        Self {
            radius: radius.max(1e-3),
            weight,
            buckets: BTreeMap::new(),
        }
    }

    /// Pushes each desired velocity away from nearby bodies of the same pack.
    ///
    /// `bodies` holds `(id, pack, position)`; the result depends only on ids and positions, not
    /// on slice order.
    pub fn apply(&mut self, bodies: &[(AgentKey, PackKey, Vec2)], desired: &mut [Vec2]) {
        let radius = self.radius;
        self.buckets.clear();
        for (idx, body) in bodies.iter().enumerate() {
            self.buckets.entry(cell_for(body.2, radius)).or_default().push(idx);
        }
        for bucket in self.buckets.values_mut() {
            bucket.sort_by_key(|&i| (bodies[i].0, i));
        }

        let radius2 = radius * radius;
        for i in 0..bodies.len() {
            let (_, pack, position) = bodies[i];
            let cell = cell_for(position, radius);
            let mut push = Vec2::ZERO;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(bucket) = self.buckets.get(&Cell(cell.0 + dx, cell.1 + dy)) else {
                        continue;
                    };
                    for &j in bucket {
                        if i == j || bodies[j].1 != pack {
                            continue;
                        }
                        let delta = position - bodies[j].2;
                        let dist2 = delta.dot(delta);
                        if dist2 <= 1e-12 || dist2 > radius2 {
                            continue;
                        }
                        let dist = dist2.sqrt();
                        push += (delta / dist) * ((radius - dist) / radius);
                    }
                }
            }
            desired[i] += push * self.weight;
        }
    }
}

fn cell_for(p: Vec2, cell_size: f32) -> Cell {
    Cell((p.x / cell_size).floor() as i32, (p.y / cell_size).floor() as i32)
}

/// Blends velocity and facing toward their goals and advances the position.
///
/// The limp multiplier slows both blends. Positions stay inside the unit world.
pub fn integrate(agent: &mut Agent, desired: Vec2, facing: Vec2, dt: f32, tuning: &AgentTuning) {
    let accel = (tuning.acceleration * agent.limp * dt).min(1.0);
    agent.velocity = agent.velocity.lerp(desired.finite_or(Vec2::ZERO), accel);

    let turn = (tuning.turn_rate * agent.limp * dt).min(1.0);
    let turned = agent.facing.lerp(facing, turn).normalize_or_zero();
    if turned != Vec2::ZERO {
        agent.facing = turned;
    }

    agent.position = (agent.position + agent.velocity * dt).clamp_components(0.0, 1.0);
}

/// Spends or restores stamina for this tick.
pub fn update_stamina(agent: &mut Agent, dt: f32, tuning: &AgentTuning) {
    agent.stamina = if is_sprinting(agent) {
        agent.stamina - tuning.sprint_drain * dt
    } else {
        agent.stamina + tuning.stamina_regen * dt
    }
    .clamp(0.0, 1.0);
}
