//! The top-level simulation object.
//!
//! A [`PackCoordinator`] owns every agent, pack and the single random stream. One call to
//! [`PackCoordinator::update`] advances the hunt by one tick in a fixed order:
//!
//! 1. sanitize inputs and remove the dead
//! 2. pack phase, packs by id: roles, plans, leader abilities, orders, synchronized attacks
//! 3. agent phase, agents by id: timers, emotion, terrain, inbox, state machine, pressure gating
//! 4. motion: steering, separation, integration, physics, attack contact
//! 5. fairness phase: the target-wide mercy window, then per pack anti-corner yields and engage
//!    cooldowns
//! 6. adaptive difficulty and invariant checks
//!
//! Random draws happen only in phases 2, 3 and 5, always in that order.

use std::collections::VecDeque;

use wolfpack_core::{AgentKey, PackKey, SimRng, Stagger, TickContext, Vec2};

use crate::agent::{Agent, WolfKind};
use crate::attack::{AttackOutcome, AttackPhase};
use crate::comms::{self, Delivery, MessageKind, Outgoing, Payload, Recipient};
use crate::config::HuntConfig;
use crate::difficulty::AdaptiveDifficulty;
use crate::events::{HuntEvent, EVENT_CAPACITY};
use crate::fairness::{self, Directive, Engaged, MercyWindow, Pressure, PressureBudget};
use crate::host::{CombatSink, HuntHost, PhysicsBridge, TargetInput};
use crate::pack::{self, AbilityCues, LeaderAbility, Pack, PackPlan, Role};
use crate::prediction;
use crate::state_machine::{self, Perception, Receptiveness};
use crate::steering::{self, Separation};
use crate::terrain::{self, TerrainFeature, TerrainRegistry};
use crate::{AgentState, HuntError};

/// Packmates closer than this push each other apart.
const SEPARATION_RADIUS: f32 = 0.05;
const SEPARATION_WEIGHT: f32 = 0.3;
/// Attack contact reaches slightly past the nominal attack range.
const CONTACT_REACH: f32 = 1.25;
/// Minimum alignment between facing and the target direction for a swing to connect (60°).
const CONTACT_ALIGNMENT: f32 = 0.5;

pub struct PackCoordinator {
    config: HuntConfig,
    seed: u64,
    rng: SimRng,
    frame: u64,
    time: f32,
    /// Sorted by id; ids ascend with spawn order, so this is also pack-then-member order.
    agents: Vec<Agent>,
    /// Sorted by id.
    packs: Vec<Pack>,
    terrain: TerrainRegistry,
    difficulty: AdaptiveDifficulty,
    separation: Separation,
    target: TargetInput,
    /// Hits on the target from every pack.
    mercy: MercyWindow,
    next_agent: u32,
    next_pack: u32,
    events: VecDeque<HuntEvent>,
    repairs: u64,
}

impl PackCoordinator {
    /// Validates `config` and seeds the simulation stream.
    pub fn new(
        seed: u64,
        config: HuntConfig,
        terrain: impl IntoIterator<Item = TerrainFeature>,
    ) -> Result<Self, HuntError> {
        config.validate()?;
        let terrain = TerrainRegistry::new(terrain, config.terrain.max_features);
        let difficulty = AdaptiveDifficulty::new(&config.difficulty);
        tracing::info!(seed, features = terrain.len(), "hunt coordinator created");
        Ok(Self {
            seed,
            rng: SimRng::new(seed),
            frame: 0,
            time: 0.0,
            agents: Vec::new(),
            packs: Vec::new(),
            terrain,
            difficulty,
            separation: Separation::new(SEPARATION_RADIUS, SEPARATION_WEIGHT),
            target: TargetInput::default(),
            mercy: MercyWindow::default(),
            next_agent: 0,
            next_pack: 0,
            events: VecDeque::new(),
            repairs: 0,
            config,
        })
    }

    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&self) -> &SimRng {
        &self.rng
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn terrain(&self) -> &TerrainRegistry {
        &self.terrain
    }

    pub fn difficulty(&self) -> &AdaptiveDifficulty {
        &self.difficulty
    }

    pub fn mercy(&self) -> &MercyWindow {
        &self.mercy
    }

    /// The target as last seen, after sanitizing.
    pub fn target(&self) -> &TargetInput {
        &self.target
    }

    pub fn agent(&self, id: AgentKey) -> Option<&Agent> {
        self.agent_index(id).map(|i| &self.agents[i])
    }

    /// Direct access for tools and tests. Changes made here bypass every engine rule.
    pub fn agent_mut(&mut self, id: AgentKey) -> Option<&mut Agent> {
        self.agent_index(id).map(move |i| &mut self.agents[i])
    }

    pub fn pack(&self, id: PackKey) -> Option<&Pack> {
        self.pack_index(id).map(|i| &self.packs[i])
    }

    /// How many times the end-of-tick checks had to pull state back into bounds.
    ///
    /// Stays at zero unless a host or tool wrote out-of-range values through [`Self::agent_mut`].
    pub fn invariant_repairs(&self) -> u64 {
        self.repairs
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<HuntEvent> {
        self.events.drain(..).collect()
    }

    fn agent_index(&self, id: AgentKey) -> Option<usize> {
        self.agents.binary_search_by_key(&id, |a| a.id).ok()
    }

    fn pack_index(&self, id: PackKey) -> Option<usize> {
        self.packs.binary_search_by_key(&id, |p| p.id).ok()
    }

    fn push_event(&mut self, event: HuntEvent) {
        if self.events.len() >= EVENT_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    // ---------------------------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------------------------

    /// Spawns a pack of normal wolves, one per position, in order.
    pub fn spawn_pack(
        &mut self,
        positions: &[Vec2],
        physics: &mut impl PhysicsBridge,
    ) -> Result<PackKey, HuntError> {
        let members: Vec<(Vec2, WolfKind)> =
            positions.iter().map(|&p| (p, WolfKind::Normal)).collect();
        self.spawn_mixed_pack(&members, physics)
    }

    /// Spawns a pack with one member per entry, in order.
    ///
    /// Entries past the member cap are dropped with a warning. Each member draws its
    /// temperament from the simulation stream.
    pub fn spawn_mixed_pack(
        &mut self,
        positions: &[(Vec2, WolfKind)],
        physics: &mut impl PhysicsBridge,
    ) -> Result<PackKey, HuntError> {
        if positions.is_empty() {
            return Err(HuntError::EmptyPack);
        }
        if self.packs.len() >= self.config.pack.max_packs {
            return Err(HuntError::PackLimit {
                limit: self.config.pack.max_packs,
            });
        }
        let cap = self.config.pack.max_members;
        if positions.len() > cap {
            tracing::warn!(
                requested = positions.len(),
                cap,
                "pack roster over capacity; dropping extra positions"
            );
        }

        let id = PackKey(self.next_pack);
        self.next_pack += 1;
        let mut members = Vec::new();
        for &(position, kind) in positions.iter().take(cap) {
            let agent_id = AgentKey(self.next_agent);
            self.next_agent += 1;
            let mut agent = Agent::spawn(
                agent_id,
                id,
                kind,
                position,
                self.seed,
                &mut self.rng,
                &self.config,
            );
            agent.body = physics.create_body(agent_id, agent.position);
            members.push(agent_id);
            self.agents.push(agent);
        }

        let count = members.len() as u32;
        self.packs.push(Pack::new(id, members));
        tracing::info!(pack = %id, members = count, "pack spawned");
        self.push_event(HuntEvent::PackSpawned {
            pack: id,
            members: count,
        });
        Ok(id)
    }

    /// Removes a pack and all of its members, destroying their bodies.
    pub fn despawn_pack(
        &mut self,
        id: PackKey,
        physics: &mut impl PhysicsBridge,
    ) -> Result<(), HuntError> {
        let index = self.pack_index(id).ok_or(HuntError::UnknownPack(id))?;
        self.packs.remove(index);
        self.agents.retain(|agent| {
            if agent.pack == id {
                physics.destroy_body(agent.body);
                false
            } else {
                true
            }
        });
        tracing::info!(pack = %id, "pack despawned");
        self.push_event(HuntEvent::PackRemoved { pack: id });
        Ok(())
    }

    /// Hits an agent for a fraction of full health, pushing it along `knockback`.
    ///
    /// A hit interrupts a swing in progress: the agent recovers for the stagger duration. An
    /// agent brought to zero health is removed at once. Returns the health actually lost, or
    /// `None` for an unknown agent.
    pub fn damage_agent(
        &mut self,
        id: AgentKey,
        amount: f32,
        knockback: Vec2,
        physics: &mut impl PhysicsBridge,
    ) -> Option<f32> {
        let index = self.agent_index(id)?;
        let tuning = &self.config.agent;
        let agent = &mut self.agents[index];
        let lost = agent.take_hit(amount, knockback, tuning);
        self.difficulty.observe_damage_to_pack(lost);

        if !agent.is_alive() {
            self.remove_dead(physics);
            return Some(lost);
        }
        if agent.state.is_attacking() {
            let from = agent.state;
            let entry =
                state_machine::enter(agent, AgentState::Recover, 1.0, &mut self.rng, tuning);
            agent.state_timer = tuning.stagger_duration;
            tracing::debug!(agent = %id, from = from.name(), "swing interrupted by a hit");
            self.push_event(HuntEvent::StateChanged {
                agent: id,
                from,
                to: AgentState::Recover,
            });
            if let Some(outcome) = entry.resolved {
                self.difficulty.observe_swing(outcome, &self.config.difficulty);
                self.push_event(HuntEvent::AttackResolved { agent: id, outcome });
            }
        }
        Some(lost)
    }

    /// Records a hit on the target dealt outside the engine, feeding the mercy window.
    pub fn record_target_hit(&mut self) {
        self.mercy.record_hit(self.time);
    }

    // ---------------------------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------------------------

    /// Advances the hunt by one tick.
    pub fn update<H: HuntHost>(&mut self, dt: f32, target: &TargetInput, host: &mut H) {
        let dt = self.sanitize_dt(dt);
        let target = self.sanitize_target(target);
        self.frame += 1;
        self.time += dt;
        let ctx = TickContext {
            frame: self.frame,
            dt_seconds: dt,
            time: self.time,
            seed: self.seed,
        };

        self.remove_dead(host);
        self.observe_target(&ctx, &target);

        for pack_index in 0..self.packs.len() {
            self.pack_phase(pack_index, &ctx, &target);
        }
        for agent_index in 0..self.agents.len() {
            self.agent_phase(agent_index, &ctx, &target);
        }
        self.motion_phase(&ctx, &target, host);
        self.fairness_phase(&ctx, &target);

        if let Some(skill) = self.difficulty.tick(dt, &self.config.difficulty) {
            tracing::debug!(skill, tuning = ?self.difficulty.tuning, "difficulty adjusted");
            self.push_event(HuntEvent::DifficultyAdjusted { skill });
        }
        self.enforce_invariants();
    }

    fn sanitize_dt(&self, dt: f32) -> f32 {
        let schedule = &self.config.schedule;
        if !dt.is_finite() || dt <= 0.0 {
            tracing::warn!(dt, fixed = schedule.fixed_dt, "invalid tick delta; using fixed dt");
            schedule.fixed_dt
        } else {
            dt.min(schedule.max_dt)
        }
    }

    fn sanitize_target(&mut self, input: &TargetInput) -> TargetInput {
        let (clean, repaired) = input.sanitized(self.target.position, self.target.health);
        if repaired {
            tracing::warn!(frame = self.frame, "non-finite target input sanitized");
        }
        self.target = clean;
        clean
    }

    fn remove_dead(&mut self, physics: &mut impl PhysicsBridge) {
        let mut dead = Vec::new();
        self.agents.retain(|agent| {
            if agent.is_alive() {
                true
            } else {
                physics.destroy_body(agent.body);
                dead.push((agent.id, agent.pack, agent.role));
                false
            }
        });
        if dead.is_empty() {
            return;
        }

        let morale_cost = self.config.pack.death_morale_cost;
        for &(id, pack_id, role) in &dead {
            tracing::info!(agent = %id, pack = %pack_id, "agent died");
            if let Some(pi) = self.pack_index(pack_id) {
                let pack = &mut self.packs[pi];
                pack.members.retain(|&m| m != id);
                if role == Role::Leader || pack.leader == Some(id) {
                    pack.leader = None;
                    pack.leader_lost = true;
                }
            }
            for mate in self.agents.iter_mut().filter(|a| a.pack == pack_id) {
                mate.emotion.on_packmate_lost();
                mate.morale = (mate.morale - morale_cost).max(0.0);
            }
            self.push_event(HuntEvent::AgentDied {
                agent: id,
                pack: pack_id,
            });
        }

        let emptied: Vec<PackKey> = self
            .packs
            .iter()
            .filter(|p| p.is_empty())
            .map(|p| p.id)
            .collect();
        self.packs.retain(|p| !p.is_empty());
        for id in emptied {
            tracing::info!(pack = %id, "pack wiped out");
            self.push_event(HuntEvent::PackRemoved { pack: id });
        }
    }

    fn observe_target(&mut self, ctx: &TickContext, target: &TargetInput) {
        for agent in &mut self.agents {
            agent.memory.velocities.push(target.velocity);
            if target.blocking {
                agent.memory.last_block = Some(ctx.time);
            }
            if target.rolling {
                agent.memory.last_roll = Some(ctx.time);
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Pack phase
    // ---------------------------------------------------------------------------------------

    fn pack_phase(&mut self, pack_index: usize, ctx: &TickContext, target: &TargetInput) {
        let dt = ctx.dt_seconds;
        let pack_id = self.packs[pack_index].id;

        // Aggregates.
        {
            let members: Vec<&Agent> = self.agents.iter().filter(|a| a.pack == pack_id).collect();
            let pack = &mut self.packs[pack_index];
            pack.morale = pack::aggregate_morale(&members);
            pack.center = pack::centroid(&members);
        }

        // Roles: only unlocked members are reassigned.
        let mut any_unlocked = false;
        for agent in self.agents.iter_mut().filter(|a| a.pack == pack_id) {
            agent.role_lock = (agent.role_lock - dt).max(0.0);
            any_unlocked |= agent.role_lock <= 0.0;
        }
        if any_unlocked {
            let mut members: Vec<&mut Agent> =
                self.agents.iter_mut().filter(|a| a.pack == pack_id).collect();
            let assignments =
                pack::assign_roles(&mut members, target.position, &mut self.rng, &self.config);
            for assignment in assignments {
                tracing::debug!(
                    agent = %assignment.agent,
                    role = assignment.role.name(),
                    lock = assignment.lock,
                    "role assigned"
                );
                self.push_event(HuntEvent::RoleAssigned {
                    agent: assignment.agent,
                    role: assignment.role,
                });
            }
        }
        let leader = self
            .agents
            .iter()
            .find(|a| a.pack == pack_id && a.role == Role::Leader)
            .map(|a| a.id);
        self.packs[pack_index].leader = leader;

        // Plan.
        self.packs[pack_index].plan_timer -= dt;
        let ended = {
            let members: Vec<&Agent> = self.agents.iter().filter(|a| a.pack == pack_id).collect();
            self.packs[pack_index].plan_end(&members, &self.config.pack)
        };
        if let Some(reason) = ended {
            let live = self.packs[pack_index].members.len();
            let next =
                self.packs[pack_index].start_next_plan(live, &mut self.rng, &self.config.pack);
            if let Some(plan) = next {
                tracing::debug!(
                    pack = %pack_id,
                    plan = plan.name(),
                    reason = reason.name(),
                    "plan changed"
                );
                self.push_event(HuntEvent::PlanChanged {
                    pack: pack_id,
                    plan,
                });
                if let Some(leader) = leader {
                    let center = Payload::Position(self.packs[pack_index].center);
                    match plan {
                        PackPlan::Retreat => {
                            self.broadcast_from(leader, MessageKind::Retreat, center);
                        }
                        PackPlan::Regroup => {
                            self.broadcast_from(leader, MessageKind::Regroup, center);
                        }
                        _ => {}
                    }
                }
            }
        }

        if let Some(leader) = leader {
            self.leader_ability(pack_index, leader, ctx, target);
        }

        // Orders.
        {
            let pack = &self.packs[pack_index];
            let plan = pack.plan;
            let center = pack.center;
            let radius = self.config.pack.regroup_radius;
            let first_support = self
                .agents
                .iter()
                .filter(|a| a.pack == pack_id)
                .position(|a| a.role == Role::Support);
            for (index, agent) in self
                .agents
                .iter_mut()
                .filter(|a| a.pack == pack_id)
                .enumerate()
            {
                let regroup = agent.engagement.regroup;
                agent.engagement =
                    pack::engagement_for(plan, agent.role, index, first_support, center);
                // A regroup order received by message holds while the agent is still on its way.
                if agent.state == AgentState::Alert && agent.engagement.regroup.is_none() {
                    agent.engagement.regroup =
                        regroup.filter(|&point| agent.position.distance(point) > radius);
                }
                // A side picked by a flank order holds for the rest of the flank.
                if agent.state != AgentState::Flank {
                    agent.flank_side = agent.engagement.flank_side;
                }
            }
        }

        // Budget: rebuilt from the grants members hold, holders first.
        {
            let grants = self
                .agents
                .iter_mut()
                .filter(|a| a.pack == pack_id)
                .map(|a| &mut a.pressure);
            let (budget, demoted) = PressureBudget::rebuild(grants, &self.config.fairness);
            self.packs[pack_index].budget = budget;
            if demoted > 0 {
                self.repaired("pressure grants over cap", pack_id.0);
            }
        }

        // Synchronized attack.
        let ready = self.ready_count(pack_id, target);
        let pack = &self.packs[pack_index];
        let cooled = pack
            .last_sync
            .is_none_or(|t| ctx.time - t >= self.config.pack.sync_cooldown);
        if ready >= self.config.pack.sync_ready_count && cooled {
            if let Some(leader) = leader {
                self.packs[pack_index].last_sync = Some(ctx.time);
                tracing::debug!(pack = %pack_id, ready, "synchronized attack");
                let at = Payload::Position(target.position);
                self.broadcast_from(leader, MessageKind::AttackNow, at);
            }
        }
    }

    /// Members able to join an attack on the target right now.
    fn ready_count(&self, pack_id: PackKey, target: &TargetInput) -> usize {
        let threaten = self.config.agent.threaten_range();
        self.agents
            .iter()
            .filter(|a| {
                a.pack == pack_id
                    && a.can_engage()
                    && a.stamina > self.config.pack.sync_min_stamina
                    && !a.state.is_withdrawing()
                    && a.position.distance(target.position) <= threaten
            })
            .count()
    }

    /// Lets the leader use at most one ability. Only a coordinated strike draws, through its
    /// broadcast.
    fn leader_ability(
        &mut self,
        pack_index: usize,
        leader: AgentKey,
        ctx: &TickContext,
        target: &TargetInput,
    ) {
        let Some(leader_index) = self.agent_index(leader) else {
            return;
        };
        let pack_id = self.packs[pack_index].id;
        let cues = {
            let agent = &self.agents[leader_index];
            AbilityCues {
                pack_morale: self.packs[pack_index].morale,
                leader_health: agent.health,
                leader_enraged: agent.is_enraged(),
                ready: self.ready_count(pack_id, target),
                target_distance: agent.position.distance(target.position),
            }
        };
        let tuning = &self.config.pack.leader;
        let Some(ability) = self.packs[pack_index].choose_ability(&cues, ctx.time, tuning) else {
            return;
        };
        self.packs[pack_index].last_ability = Some(ctx.time);

        match ability {
            LeaderAbility::Rally => {
                for agent in self.agents.iter_mut().filter(|a| a.pack == pack_id) {
                    agent.morale = (agent.morale + tuning.rally_morale_boost).min(1.0);
                    agent.coordination =
                        (agent.coordination + tuning.rally_coordination_boost).min(1.0);
                    agent.emotion.on_rally();
                }
                let members: Vec<&Agent> =
                    self.agents.iter().filter(|a| a.pack == pack_id).collect();
                self.packs[pack_index].morale = pack::aggregate_morale(&members);
            }
            LeaderAbility::BerserkRage => {
                let origin = self.agents[leader_index].position;
                let window = self.config.agent.emotion.aggressive_window;
                for agent in self.agents.iter_mut().filter(|a| a.pack == pack_id) {
                    if agent.id == leader {
                        agent.enraged = tuning.berserk_duration;
                        agent.aggression = 1.0;
                        agent.emotion.provoke(tuning.berserk_duration);
                    } else if agent.position.distance(origin) < tuning.berserk_radius {
                        agent.aggression =
                            (agent.aggression + tuning.berserk_aggression_boost).min(1.0);
                        agent.emotion.provoke(window);
                    }
                }
            }
            LeaderAbility::CoordinatedStrike => {
                let delay = tuning.strike_ready_delay;
                self.packs[pack_index].set_plan(PackPlan::Commit, &self.config.pack);
                for agent in self
                    .agents
                    .iter_mut()
                    .filter(|a| a.pack == pack_id && a.id != leader)
                {
                    agent.engage_cooldown = delay;
                }
                self.push_event(HuntEvent::PlanChanged {
                    pack: pack_id,
                    plan: PackPlan::Commit,
                });
                // Stands in for this tick's synchronized attack.
                self.packs[pack_index].last_sync = Some(ctx.time);
                let at = Payload::Position(target.position);
                self.broadcast_from(leader, MessageKind::AttackNow, at);
            }
            LeaderAbility::Intimidate => {}
        }

        tracing::debug!(
            pack = %pack_id,
            agent = %leader,
            ability = ability.name(),
            "leader ability"
        );
        self.push_event(HuntEvent::LeaderAbility {
            pack: pack_id,
            agent: leader,
            ability,
        });
    }

    /// Sends one message from `sender` to its live packmates.
    fn broadcast_from(
        &mut self,
        sender: AgentKey,
        kind: MessageKind,
        payload: Payload,
    ) -> Delivery {
        let Some(index) = self.agent_index(sender) else {
            return Delivery::default();
        };
        let origin = self.agents[index].position;
        let pack = self.agents[index].pack;
        let recipients = self
            .agents
            .iter_mut()
            .filter(|a| a.pack == pack && a.id != sender && a.is_alive())
            .map(|a| Recipient {
                id: a.id,
                position: a.position,
                inbox: &mut a.inbox,
            });
        let delivery = comms::broadcast(
            Outgoing {
                kind,
                sender,
                origin,
                payload,
            },
            self.time,
            recipients,
            &mut self.rng,
            &self.config.comms,
        );
        tracing::trace!(
            agent = %sender,
            kind = kind.name(),
            delivered = delivery.delivered,
            dropped = delivery.dropped,
            "message sent"
        );
        self.push_event(HuntEvent::MessageSent {
            sender,
            kind,
            delivered: delivery.delivered,
            dropped: delivery.dropped,
        });
        delivery
    }

    // ---------------------------------------------------------------------------------------
    // Agent phase
    // ---------------------------------------------------------------------------------------

    fn agent_phase(&mut self, index: usize, ctx: &TickContext, target: &TargetInput) {
        let dt = ctx.dt_seconds;
        let now = ctx.time;
        let Some(pack_index) = self.pack_index(self.agents[index].pack) else {
            return;
        };
        let mut sends: Vec<(MessageKind, Payload)> = Vec::new();
        let mut events: Vec<HuntEvent> = Vec::new();

        {
            let config = &self.config;
            let tuning = &config.agent;
            let schedule = &config.schedule;
            let agent = &mut self.agents[index];
            if !agent.is_alive() {
                return;
            }

            // Timers.
            agent.state_timer -= dt;
            agent.state_elapsed += dt;
            agent.decision_timer -= dt;
            agent.engage_cooldown = (agent.engage_cooldown - dt).max(0.0);
            agent.need_help_cooldown = (agent.need_help_cooldown - dt).max(0.0);
            agent.enraged = (agent.enraged - dt).max(0.0);
            if let Some(directive) = agent.directive.as_mut() {
                directive.remaining -= dt;
            }
            if agent.directive.is_some_and(|d| !d.is_active()) {
                agent.directive = None;
            }

            let coupling = agent.emotion.update(dt, agent.health, &tuning.emotion);
            agent.limp = coupling.limp;

            let predicted = prediction::predict(
                target.position,
                &agent.memory.velocities,
                agent.intelligence,
                &config.prediction,
            );
            let perception = Perception::new(agent, target, predicted, now, tuning);
            if perception.in_detection {
                agent.memory.last_known_position = target.position;
                agent.memory.last_seen = now;
            }

            // Expensive work is staggered, and stretched further for distant agents.
            let lod = if perception.distance > schedule.lod_distance {
                schedule.lod_factor
            } else {
                1
            };
            let terrain_due =
                Stagger::stretched(agent.id, schedule.terrain_every, lod).is_due(ctx.frame);
            terrain::tick(
                &mut agent.terrain,
                &self.terrain,
                agent.position,
                agent.state,
                agent.morale,
                dt,
                terrain_due,
                &mut self.rng,
                &config.terrain,
            );

            let comms_due =
                Stagger::stretched(agent.id, schedule.comms_every, lod).is_due(ctx.frame);
            let message = if comms_due {
                let receptive = Receptiveness::of(agent, &perception);
                agent.inbox.purge_expired(now, config.comms.message_ttl);
                agent
                    .inbox
                    .take_actionable(now, config.comms.message_ttl, |m| receptive.accepts(m))
            } else {
                None
            };

            let aggression = self.difficulty.tuning.effective_aggression(
                agent.aggression + agent.emotion.current.aggression_bias(),
                &config.difficulty,
            );
            let decision = state_machine::decide(
                agent,
                &perception,
                message.as_ref(),
                aggression,
                tuning,
                &mut self.rng,
            );
            if agent.decision_timer <= 0.0 {
                agent.decision_timer = self.difficulty.tuning.reaction_delay;
            }
            if let Some(message) = &message {
                match message.kind {
                    MessageKind::TargetSpotted => {
                        if let Some(at) = message.payload.position() {
                            agent.memory.last_known_position = at;
                        }
                    }
                    MessageKind::Regroup => {
                        agent.engagement.regroup = message.payload.position();
                    }
                    _ => {}
                }
            }
            if let Some(side) = decision.flank_side {
                agent.flank_side = side;
            }

            // Pressure gating: holders keep their grants, others queue in member order.
            let mut next = decision.state;
            let wanted = fairness::requested_pressure(next, perception.distance, tuning);
            let wanted = if agent.active_directive().is_some() {
                wanted.min(Pressure::Threaten)
            } else {
                wanted
            };
            let budget = &mut self.packs[pack_index].budget;
            let granted = budget.exchange(agent.pressure, wanted, &config.fairness);
            agent.pressure = granted;
            if granted < wanted {
                next = AgentState::Strafe;
                agent.holding_off = granted == Pressure::Threaten;
            } else if !next.is_engaged()
                || granted >= Pressure::Probe
                || (agent.active_directive().is_none()
                    && budget.has_room(Pressure::Probe, &config.fairness))
            {
                agent.holding_off = false;
            }

            if next != agent.state {
                let from = agent.state;
                let entry =
                    state_machine::enter(agent, next, coupling.feint_keep, &mut self.rng, tuning);
                tracing::trace!(
                    agent = %agent.id,
                    from = from.name(),
                    to = next.name(),
                    "state changed"
                );
                events.push(HuntEvent::StateChanged {
                    agent: agent.id,
                    from,
                    to: next,
                });
                if let Some(outcome) = entry.resolved {
                    events.push(HuntEvent::AttackResolved {
                        agent: agent.id,
                        outcome,
                    });
                }
                if let Some(kind) = entry.started {
                    events.push(HuntEvent::AttackStarted {
                        agent: agent.id,
                        kind,
                    });
                }

                if !decision.from_message {
                    if next == AgentState::Alert && from.is_calm() && perception.in_detection {
                        let spotted = Payload::Position(target.position);
                        sends.push((MessageKind::TargetSpotted, spotted));
                    }
                    if next == AgentState::Flank {
                        // Ask the others to close from the opposite side.
                        let kind = if agent.flank_side < 0.0 {
                            MessageKind::FlankRight
                        } else {
                            MessageKind::FlankLeft
                        };
                        sends.push((kind, Payload::Position(perception.predicted)));
                    }
                }
            }

            if coupling.need_help_rate > 0.0
                && agent.state.is_engaged()
                && agent.need_help_cooldown <= 0.0
                && self.rng.chance(coupling.need_help_rate * dt)
            {
                agent.need_help_cooldown = tuning.emotion.need_help_cooldown;
                sends.push((MessageKind::NeedHelp, Payload::Position(agent.position)));
            }
        }

        let (id, resolved): (AgentKey, Vec<AttackOutcome>) = (
            self.agents[index].id,
            events
                .iter()
                .filter_map(|e| match e {
                    HuntEvent::AttackResolved { outcome, .. } => Some(*outcome),
                    _ => None,
                })
                .collect(),
        );
        for outcome in resolved {
            self.difficulty.observe_swing(outcome, &self.config.difficulty);
        }
        for event in events {
            self.push_event(event);
        }
        for (kind, payload) in sends {
            self.broadcast_from(id, kind, payload);
        }
    }

    // ---------------------------------------------------------------------------------------
    // Motion
    // ---------------------------------------------------------------------------------------

    fn motion_phase<H: HuntHost>(&mut self, ctx: &TickContext, target: &TargetInput, host: &mut H) {
        let dt = ctx.dt_seconds;
        let tuning = &self.config.agent;
        let speed = self.difficulty.tuning.speed;

        let perceptions: Vec<Perception> = self
            .agents
            .iter()
            .map(|agent| {
                let predicted = prediction::predict(
                    target.position,
                    &agent.memory.velocities,
                    agent.intelligence,
                    &self.config.prediction,
                );
                Perception::new(agent, target, predicted, ctx.time, tuning)
            })
            .collect();
        let mut desired: Vec<Vec2> = self
            .agents
            .iter()
            .zip(&perceptions)
            .map(|(agent, p)| {
                let scale = speed * agent.speed_multiplier(&self.config.pack.leader);
                steering::desired_velocity(agent, p, scale, tuning)
            })
            .collect();
        let bodies: Vec<(AgentKey, PackKey, Vec2)> = self
            .agents
            .iter()
            .map(|a| (a.id, a.pack, a.position))
            .collect();
        self.separation.apply(&bodies, &mut desired);

        for ((agent, p), velocity) in self.agents.iter_mut().zip(&perceptions).zip(desired) {
            let facing = steering::desired_facing(agent, p, velocity);
            steering::integrate(agent, velocity, facing, dt, tuning);
            steering::update_stamina(agent, dt, tuning);
            if let Some(resolved) =
                host.resolve_motion(agent.body, agent.position, agent.velocity, dt)
            {
                if resolved.is_finite() {
                    agent.position = resolved.clamp_components(0.0, 1.0);
                } else {
                    tracing::warn!(agent = %agent.id, "physics returned a non-finite position");
                }
            }
        }

        self.resolve_contacts(ctx, target, host);
    }

    /// Lands, blocks or loses swings that are in their execute window.
    fn resolve_contacts(
        &mut self,
        ctx: &TickContext,
        target: &TargetInput,
        combat: &mut impl CombatSink,
    ) {
        let tuning = &self.config.agent;
        let reach = tuning.attack_range * CONTACT_REACH;
        let mut blocked = Vec::new();

        for index in 0..self.agents.len() {
            let agent = &mut self.agents[index];
            if !agent.state.is_attacking() || agent.attack.contact.is_some() {
                continue;
            }
            let timing = agent.attack.kind.timing();
            if timing.phase_at(agent.state_elapsed) != AttackPhase::Execute {
                continue;
            }
            let offset = target.position - agent.position;
            let dir = offset.normalize_or_zero();
            if offset.length() > reach || agent.facing.dot(dir) < CONTACT_ALIGNMENT {
                continue;
            }

            let outcome = if !agent.attack.kind.deals_damage() {
                AttackOutcome::Feinted
            } else if target.blocking {
                AttackOutcome::Blocked
            } else if target.rolling || target.dodged {
                AttackOutcome::Dodged
            } else {
                AttackOutcome::Hit
            };
            agent.attack.contact = Some(outcome);

            match outcome {
                AttackOutcome::Hit => {
                    let amount = tuning.base_damage
                        * timing.damage_multiplier
                        * agent.damage_multiplier(&self.config.pack.leader);
                    combat.apply_damage(agent.position, dir, amount);
                    agent.hits_landed = agent.hits_landed.saturating_add(1);
                    agent.emotion.on_attack_landed();
                    agent.memory.last_hit_angle = Some(-dir);
                    let pack_id = agent.pack;
                    self.difficulty.observe_damage_to_player(amount);
                    self.mercy.record_hit(ctx.time);
                    if let Some(pi) = self.pack_index(pack_id) {
                        self.packs[pi].plan_hits += 1;
                    }
                }
                AttackOutcome::Blocked => blocked.push(index),
                AttackOutcome::Dodged | AttackOutcome::Missed | AttackOutcome::Feinted => {}
            }
        }

        // A blocked swing ends at once.
        for index in blocked {
            let agent = &mut self.agents[index];
            let id = agent.id;
            let from = agent.state;
            let entry = state_machine::enter(
                agent,
                AgentState::Recover,
                1.0,
                &mut self.rng,
                &self.config.agent,
            );
            self.push_event(HuntEvent::StateChanged {
                agent: id,
                from,
                to: AgentState::Recover,
            });
            if let Some(outcome) = entry.resolved {
                self.difficulty.observe_swing(outcome, &self.config.difficulty);
                self.push_event(HuntEvent::AttackResolved { agent: id, outcome });
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Fairness phase
    // ---------------------------------------------------------------------------------------

    fn fairness_phase(&mut self, ctx: &TickContext, target: &TargetInput) {
        // Mercy window: one log for the target, every committed attacker backs off.
        if self.mercy.check(ctx.time, &self.config.fairness) {
            let mut disengaged = 0;
            for index in 0..self.agents.len() {
                if self.agents[index].pressure != Pressure::Commit {
                    continue;
                }
                let Some(pack_index) = self.pack_index(self.agents[index].pack) else {
                    continue;
                };
                let directive = Directive::mercy(&mut self.rng, &self.config.fairness);
                self.force(pack_index, index, directive);
                disengaged += 1;
            }
            tracing::debug!(disengaged, triggers = self.mercy.triggers, "mercy window full");
        }

        for pack_index in 0..self.packs.len() {
            let pack_id = self.packs[pack_index].id;

            // Anti-corner.
            let threaten = self.config.agent.threaten_range();
            let engaged: Vec<Engaged> = self
                .agents
                .iter()
                .filter(|a| {
                    a.pack == pack_id
                        && a.state.is_engaged()
                        && a.active_directive().is_none()
                        && (matches!(a.pressure, Pressure::Commit | Pressure::Probe)
                            || a.position.distance(target.position) <= threaten)
                })
                .map(|a| Engaged {
                    id: a.id,
                    position: a.position,
                })
                .collect();
            let yielders = fairness::corner_yielders(
                target.position,
                target.facing,
                &engaged,
                self.config.fairness.corner_arc_cos,
            );
            let interval = self.difficulty.tuning.reaction_delay;
            for id in yielders {
                if let Some(index) = self.agent_index(id) {
                    self.force(pack_index, index, Directive::yield_for(interval));
                }
            }

            // Engage cooldowns, member order.
            for index in 0..self.agents.len() {
                let agent = &mut self.agents[index];
                if agent.pack != pack_id || !agent.attack.cooldown_pending {
                    continue;
                }
                agent.attack.cooldown_pending = false;
                agent.engage_cooldown = self.config.fairness.engage_cooldown.sample(&mut self.rng);
            }
        }
    }

    /// Applies a directive now: the agent switches state this tick and drops capped pressure.
    fn force(&mut self, pack_index: usize, index: usize, directive: Directive) {
        let agent = &mut self.agents[index];
        let id = agent.id;
        let from = agent.state;
        agent.directive = Some(directive);
        let keep = if directive.state.is_engaged() {
            Pressure::Threaten
        } else {
            Pressure::None
        };
        let held = agent.pressure;
        self.packs[pack_index].budget.release(held);
        agent.pressure = keep;
        agent.holding_off = keep == Pressure::Threaten;

        let entry = if from != directive.state {
            Some(state_machine::enter(
                agent,
                directive.state,
                1.0,
                &mut self.rng,
                &self.config.agent,
            ))
        } else {
            None
        };
        tracing::debug!(
            agent = %id,
            reason = ?directive.reason,
            to = directive.state.name(),
            "directive"
        );
        self.push_event(HuntEvent::Directive {
            agent: id,
            reason: directive.reason,
        });
        if let Some(entry) = entry {
            self.push_event(HuntEvent::StateChanged {
                agent: id,
                from,
                to: directive.state,
            });
            if let Some(outcome) = entry.resolved {
                self.difficulty.observe_swing(outcome, &self.config.difficulty);
                self.push_event(HuntEvent::AttackResolved { agent: id, outcome });
            }
        }
    }

    fn enforce_invariants(&mut self) {
        let mut out_of_bounds = Vec::new();
        for agent in &mut self.agents {
            if agent.clamp_attributes() {
                out_of_bounds.push(agent.id.0);
            }
        }
        for id in out_of_bounds {
            self.repaired("agent attribute out of bounds", id);
        }

        let over_cap: Vec<u32> = self
            .packs
            .iter()
            .filter(|p| !p.budget.within(&self.config.fairness))
            .map(|p| p.id.0)
            .collect();
        debug_assert!(over_cap.is_empty(), "pressure budget over cap in packs {over_cap:?}");
        for id in over_cap {
            self.repaired("pressure budget over cap", id);
        }
    }

    fn repaired(&mut self, what: &'static str, id: u32) {
        self.repairs += 1;
        tracing::error!(frame = self.frame, id, what, "invariant repaired");
    }
}
