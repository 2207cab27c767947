//! Packs: plans, roles and the per-member orders derived from them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{AgentKey, PackKey, ShuffleBag, SimRng, Vec2};

use crate::agent::{Agent, Engagement, WolfKind};
use crate::config::{HuntConfig, LeaderTuning, PackTuning};
use crate::fairness::PressureBudget;
use crate::AgentState;

/// Added to an alpha's leader fit.
const ALPHA_LEADER_BONUS: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Role {
    #[default]
    None = 0,
    Leader = 1,
    Bruiser = 2,
    Skirmisher = 3,
    Support = 4,
    Scout = 5,
    Ambusher = 6,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::None,
        Role::Leader,
        Role::Bruiser,
        Role::Skirmisher,
        Role::Support,
        Role::Scout,
        Role::Ambusher,
    ];

    /// Fill order when a pack staffs its roles; members past the sixth become Support.
    pub const FILL_ORDER: [Role; 6] = [
        Role::Leader,
        Role::Bruiser,
        Role::Skirmisher,
        Role::Scout,
        Role::Ambusher,
        Role::Support,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Leader => "leader",
            Role::Bruiser => "bruiser",
            Role::Skirmisher => "skirmisher",
            Role::Support => "support",
            Role::Scout => "scout",
            Role::Ambusher => "ambusher",
        }
    }

    /// How well an agent's temperament suits the role, in `[0, 1]`.
    pub fn fit(self, agent: &Agent) -> f32 {
        let fit = match self {
            Role::None => 0.0,
            Role::Leader => {
                let alpha = if agent.kind == WolfKind::Alpha {
                    ALPHA_LEADER_BONUS
                } else {
                    0.0
                };
                0.5 * agent.intelligence + 0.3 * agent.coordination + 0.2 * agent.morale + alpha
            }
            Role::Bruiser => 0.6 * agent.aggression + 0.4 * agent.health,
            Role::Skirmisher => 0.5 * agent.stamina + 0.5 * agent.coordination,
            Role::Support => 0.7 * agent.coordination + 0.3 * (1.0 - agent.aggression),
            Role::Scout => 0.6 * agent.stamina + 0.4 * agent.intelligence,
            Role::Ambusher => 0.7 * agent.intelligence + 0.3 * agent.aggression,
        };
        fit.clamp(0.0, 1.0)
    }
}

/// The roles a pack of `size` members wants staffed, in fill order.
pub fn wanted_roles(size: usize) -> Vec<Role> {
    (0..size)
        .map(|i| Role::FILL_ORDER.get(i).copied().unwrap_or(Role::Support))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum PackPlan {
    Ambush = 0,
    Pincer = 1,
    Retreat = 2,
    Commit = 3,
    Flank = 4,
    Distract = 5,
    Regroup = 6,
}

impl PackPlan {
    pub const ALL: [PackPlan; 7] = [
        PackPlan::Ambush,
        PackPlan::Pincer,
        PackPlan::Retreat,
        PackPlan::Commit,
        PackPlan::Flank,
        PackPlan::Distract,
        PackPlan::Regroup,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PackPlan::Ambush => "ambush",
            PackPlan::Pincer => "pincer",
            PackPlan::Retreat => "retreat",
            PackPlan::Commit => "commit",
            PackPlan::Flank => "flank",
            PackPlan::Distract => "distract",
            PackPlan::Regroup => "regroup",
        }
    }

    pub fn base_duration(self) -> f32 {
        match self {
            PackPlan::Ambush => 6.0,
            PackPlan::Pincer => 5.0,
            PackPlan::Retreat => 3.0,
            PackPlan::Commit => 4.0,
            PackPlan::Flank => 5.0,
            PackPlan::Distract => 4.0,
            PackPlan::Regroup => 3.0,
        }
    }

    /// Plans that fall apart without at least two live members.
    pub fn needs_partner(self) -> bool {
        matches!(self, PackPlan::Commit | PackPlan::Pincer)
    }
}

/// Retreat and Regroup come up half as often as the offensive plans.
pub fn plan_bag() -> ShuffleBag<PackPlan> {
    ShuffleBag::weighted([
        (PackPlan::Ambush, 2),
        (PackPlan::Pincer, 2),
        (PackPlan::Retreat, 1),
        (PackPlan::Commit, 2),
        (PackPlan::Flank, 2),
        (PackPlan::Distract, 2),
        (PackPlan::Regroup, 1),
    ])
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pack {
    pub id: PackKey,
    /// Live members in spawn order.
    pub members: Vec<AgentKey>,
    pub plan: Option<PackPlan>,
    pub plan_timer: f32,
    pub plan_bag: ShuffleBag<PackPlan>,
    pub morale: f32,
    pub center: Vec2,
    pub leader: Option<AgentKey>,
    /// Set when the leader died since the last pack phase.
    pub leader_lost: bool,
    pub budget: PressureBudget,
    pub last_sync: Option<f32>,
    /// When the leader last used an ability of any kind.
    pub last_ability: Option<f32>,
    /// Hits landed since the current plan started.
    pub plan_hits: u32,
}

impl Pack {
    pub fn new(id: PackKey, members: Vec<AgentKey>) -> Self {
        Self {
            id,
            members,
            plan: None,
            plan_timer: 0.0,
            plan_bag: plan_bag(),
            morale: 0.0,
            center: Vec2::ZERO,
            leader: None,
            leader_lost: false,
            budget: PressureBudget::default(),
            last_sync: None,
            last_ability: None,
            plan_hits: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_index(&self, id: AgentKey) -> Option<usize> {
        self.members.iter().position(|&m| m == id)
    }

    /// Why the current plan has to end, if it does.
    pub fn plan_end(&self, members: &[&Agent], tuning: &PackTuning) -> Option<PlanEnd> {
        let Some(plan) = self.plan else {
            return Some(PlanEnd::Unset);
        };
        if self.leader_lost {
            return Some(PlanEnd::LeaderLost);
        }
        if plan.needs_partner() && members.len() < 2 {
            return Some(PlanEnd::TooFew);
        }
        if self.plan_timer <= 0.0 {
            return Some(PlanEnd::Expired);
        }
        let complete = match plan {
            PackPlan::Commit => self.plan_hits > 0,
            PackPlan::Regroup => members
                .iter()
                .all(|a| a.position.distance(self.center) <= tuning.regroup_radius),
            _ => false,
        };
        complete.then_some(PlanEnd::Completed)
    }

    /// Draws the next plan and restarts its timer.
    ///
    /// A lone survivor keeps drawing past plans that need a partner, at most one round of the bag.
    pub fn start_next_plan(
        &mut self,
        live_members: usize,
        rng: &mut SimRng,
        tuning: &PackTuning,
    ) -> Option<PackPlan> {
        let mut next = self.plan_bag.draw(rng)?;
        let mut attempts = self.plan_bag.template().len();
        while live_members < 2 && next.needs_partner() && attempts > 0 {
            next = self.plan_bag.draw(rng)?;
            attempts -= 1;
        }
        self.set_plan(next, tuning);
        Some(next)
    }

    /// Switches to `plan` with a fresh timer, bypassing the bag.
    pub fn set_plan(&mut self, plan: PackPlan, tuning: &PackTuning) {
        self.plan = Some(plan);
        self.plan_timer = plan.base_duration() * tuning.plan_duration_scale;
        self.plan_hits = 0;
        self.leader_lost = false;
    }

    /// The first ability, in priority order, whose trigger holds and whose cooldown has run out
    /// since the pack's last ability.
    pub fn choose_ability(
        &self,
        cues: &AbilityCues,
        now: f32,
        tuning: &LeaderTuning,
    ) -> Option<LeaderAbility> {
        LeaderAbility::ALL.into_iter().find(|&ability| {
            let cooled = self
                .last_ability
                .is_none_or(|t| now - t >= ability.cooldown(tuning));
            cooled && ability.triggered(cues, self.plan, tuning)
        })
    }
}

/// Leader-only actions, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum LeaderAbility {
    /// Lifts morale and coordination across the pack.
    Rally = 0,
    /// The wounded leader rages, rousing packmates nearby.
    BerserkRage = 1,
    /// Forces a committed attack with every member ready to swing shortly.
    CoordinatedStrike = 2,
    /// Growls at a close target. The effect on the target belongs to the host.
    Intimidate = 3,
}

impl LeaderAbility {
    pub const ALL: [LeaderAbility; 4] = [
        LeaderAbility::Rally,
        LeaderAbility::BerserkRage,
        LeaderAbility::CoordinatedStrike,
        LeaderAbility::Intimidate,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            LeaderAbility::Rally => "rally",
            LeaderAbility::BerserkRage => "berserk_rage",
            LeaderAbility::CoordinatedStrike => "coordinated_strike",
            LeaderAbility::Intimidate => "intimidate",
        }
    }

    pub fn cooldown(self, tuning: &LeaderTuning) -> f32 {
        match self {
            LeaderAbility::Rally => tuning.rally_cooldown,
            LeaderAbility::BerserkRage => tuning.berserk_cooldown,
            LeaderAbility::CoordinatedStrike => tuning.strike_cooldown,
            LeaderAbility::Intimidate => tuning.intimidate_cooldown,
        }
    }

    fn triggered(self, cues: &AbilityCues, plan: Option<PackPlan>, tuning: &LeaderTuning) -> bool {
        match self {
            LeaderAbility::Rally => cues.pack_morale < tuning.rally_morale,
            LeaderAbility::BerserkRage => {
                cues.leader_health < tuning.berserk_health && !cues.leader_enraged
            }
            LeaderAbility::CoordinatedStrike => {
                cues.ready >= tuning.strike_ready_count
                    && !matches!(
                        plan,
                        Some(PackPlan::Commit | PackPlan::Retreat | PackPlan::Regroup)
                    )
            }
            LeaderAbility::Intimidate => cues.target_distance < tuning.intimidate_range,
        }
    }
}

/// What the leader weighs when picking an ability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityCues {
    pub pack_morale: f32,
    pub leader_health: f32,
    pub leader_enraged: bool,
    /// Members close enough and rested enough to join an attack.
    pub ready: usize,
    pub target_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanEnd {
    Unset,
    Expired,
    Completed,
    LeaderLost,
    TooFew,
}

impl PlanEnd {
    pub fn name(self) -> &'static str {
        match self {
            PlanEnd::Unset => "unset",
            PlanEnd::Expired => "expired",
            PlanEnd::Completed => "completed",
            PlanEnd::LeaderLost => "leader_lost",
            PlanEnd::TooFew => "too_few",
        }
    }
}

/// Mean morale and health folded into one pack-level number.
pub fn aggregate_morale(members: &[&Agent]) -> f32 {
    if members.is_empty() {
        return 0.0;
    }
    let n = members.len() as f32;
    let morale: f32 = members.iter().map(|a| a.morale).sum::<f32>() / n;
    let health: f32 = members.iter().map(|a| a.health).sum::<f32>() / n;
    (0.7 * morale + 0.3 * health).clamp(0.0, 1.0)
}

pub fn centroid(members: &[&Agent]) -> Vec2 {
    if members.is_empty() {
        return Vec2::ZERO;
    }
    let mut sum = Vec2::ZERO;
    for agent in members {
        sum += agent.position;
    }
    sum / members.len() as f32
}

/// Ranking used to fill a vacant role.
pub fn role_score(agent: &Agent, role: Role, target: Vec2, config: &HuntConfig) -> f32 {
    let range = config.agent.detection_range;
    let closeness = 1.0 - (agent.position.distance(target) / range).clamp(0.0, 1.0);
    0.35 * agent.health + 0.2 * agent.stamina + 0.2 * closeness + 0.25 * role.fit(agent)
}

/// One role handed out by [`assign_roles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleAssignment {
    pub agent: AgentKey,
    pub role: Role,
    pub lock: f32,
}

/// Staffs the roles not covered by locked members, using unlocked members only.
///
/// `members` must be in member order. Each assignment draws a fresh lock from `rng`, in role fill
/// order. Candidates are ranked by [`role_score`]; equal scores go to the lowest id.
pub fn assign_roles(
    members: &mut [&mut Agent],
    target: Vec2,
    rng: &mut SimRng,
    config: &HuntConfig,
) -> Vec<RoleAssignment> {
    let mut vacant = wanted_roles(members.len());
    for agent in members.iter().filter(|a| a.role_lock > 0.0) {
        if let Some(i) = vacant.iter().position(|&r| r == agent.role) {
            vacant.remove(i);
        }
    }

    let mut free: Vec<usize> = (0..members.len())
        .filter(|&i| members[i].role_lock <= 0.0)
        .collect();
    let mut assignments = Vec::new();

    for role in vacant {
        let mut best: Option<(usize, f32)> = None;
        for (slot, &i) in free.iter().enumerate() {
            let score = role_score(&*members[i], role, target, config);
            let better = match best {
                None => true,
                Some((best_slot, best_score)) => {
                    score > best_score
                        || (score == best_score && members[i].id < members[free[best_slot]].id)
                }
            };
            if better {
                best = Some((slot, score));
            }
        }
        let Some((slot, _)) = best else {
            break;
        };
        let i = free.remove(slot);
        let lock = config.pack.role_lock.sample(rng);
        let agent = &mut *members[i];
        agent.role = role;
        agent.role_lock = lock;
        assignments.push(RoleAssignment {
            agent: agent.id,
            role,
            lock,
        });
    }

    // Unlocked members left over once every role is staffed keep no role.
    for &i in &free {
        members[i].role = Role::None;
    }
    assignments
}

/// Orders for the member at `index` (member order) holding `role` under `plan`.
pub fn engagement_for(
    plan: Option<PackPlan>,
    role: Role,
    index: usize,
    first_support: Option<usize>,
    center: Vec2,
) -> Engagement {
    let side = if index % 2 == 0 { -1.0 } else { 1.0 };
    let mut engagement = Engagement {
        flank_side: side,
        ..Engagement::default()
    };
    match plan {
        None | Some(PackPlan::Commit) => {}
        Some(PackPlan::Ambush) => {
            if role == Role::Scout {
                engagement.lure = true;
            } else {
                engagement.preferred = AgentState::Ambush;
            }
        }
        Some(PackPlan::Pincer) => engagement.preferred = AgentState::Flank,
        Some(PackPlan::Flank) => {
            if role != Role::Bruiser {
                engagement.preferred = AgentState::Flank;
            }
        }
        Some(PackPlan::Distract) => {
            if first_support != Some(index) {
                engagement.preferred = AgentState::Strafe;
            }
        }
        Some(PackPlan::Regroup) => engagement.regroup = Some(center),
        Some(PackPlan::Retreat) => engagement.retreat = true,
    }
    engagement
}
