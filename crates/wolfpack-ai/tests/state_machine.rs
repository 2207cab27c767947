use wolfpack_ai::attack::AttackKind;
use wolfpack_ai::fairness::Directive;
use wolfpack_ai::state_machine::{decide, enter, Perception, Receptiveness, StateEntry};
use wolfpack_ai::{
    Agent, AgentKey, AgentState, AttackOutcome, HuntConfig, Message, MessageKind, PackKey,
    Payload, SimRng, TargetInput, Vec2, WolfKind,
};

fn wolf() -> Agent {
    let mut rng = SimRng::new(1);
    Agent::spawn(
        AgentKey(0),
        PackKey(0),
        WolfKind::Normal,
        Vec2::new(0.5, 0.5),
        99,
        &mut rng,
        &HuntConfig::default(),
    )
}

fn see(agent: &Agent, target: Vec2) -> Perception {
    see_input(agent, &TargetInput::at(target))
}

fn see_input(agent: &Agent, target: &TargetInput) -> Perception {
    let tuning = HuntConfig::default().agent;
    Perception::new(agent, target, target.position, 0.0, &tuning)
}

fn message(kind: MessageKind) -> Message {
    Message {
        kind,
        sender: AgentKey(1),
        origin: Vec2::new(0.5, 0.4),
        payload: Payload::Position(Vec2::new(0.5, 0.4)),
        send_time: 0.0,
        arrival_time: 0.1,
    }
}

fn next(agent: &Agent, p: &Perception, msg: Option<&Message>) -> AgentState {
    let tuning = HuntConfig::default().agent;
    let mut rng = SimRng::new(5);
    decide(agent, p, msg, agent.aggression, &tuning, &mut rng).state
}

#[test]
fn idle_wolf_alerts_on_sight_and_investigates_on_sound() {
    let agent = wolf();
    assert_eq!(agent.state, AgentState::Idle);

    let seen = see(&agent, Vec2::new(0.7, 0.5));
    assert!(seen.in_detection);
    assert_eq!(next(&agent, &seen, None), AgentState::Alert);

    let heard = see(&agent, Vec2::new(0.95, 0.5));
    assert!(!heard.in_detection && heard.in_hearing);
    assert_eq!(next(&agent, &heard, None), AgentState::Investigate);
}

#[test]
fn decision_timer_holds_normal_progression() {
    let mut agent = wolf();
    agent.decision_timer = 0.1;
    let p = see(&agent, Vec2::new(0.7, 0.5));
    assert_eq!(next(&agent, &p, None), AgentState::Idle);
}

#[test]
fn vitals_override_the_decision_timer() {
    let mut agent = wolf();
    agent.decision_timer = 1.0;
    agent.state = AgentState::Approach;

    agent.health = 0.1;
    let p = see(&agent, Vec2::new(0.7, 0.5));
    assert_eq!(next(&agent, &p, None), AgentState::Flee);

    agent.health = 0.25;
    agent.morale = 0.3;
    assert_eq!(next(&agent, &p, None), AgentState::Retreat);

    agent.health = 1.0;
    agent.morale = 1.0;
    agent.engagement.retreat = true;
    assert_eq!(next(&agent, &p, None), AgentState::Retreat);
}

#[test]
fn directive_beats_everything() {
    let mut agent = wolf();
    agent.health = 0.1;
    agent.directive = Some(Directive::yield_for(0.5));
    let p = see(&agent, Vec2::new(0.55, 0.5));
    let attack_now = message(MessageKind::AttackNow);

    assert_eq!(next(&agent, &p, Some(&attack_now)), AgentState::Strafe);
}

#[test]
fn attack_now_strikes_in_range_and_closes_otherwise() {
    let tuning = HuntConfig::default().agent;
    let mut agent = wolf();
    agent.state = AgentState::Alert;
    agent.decision_timer = 1.0;
    let mut rng = SimRng::new(5);
    let attack_now = message(MessageKind::AttackNow);

    let close = see(&agent, Vec2::new(0.55, 0.5));
    let decision = decide(&agent, &close, Some(&attack_now), 0.5, &tuning, &mut rng);
    assert_eq!(decision.state, AgentState::Attack);
    assert!(decision.from_message);

    let far = see(&agent, Vec2::new(0.8, 0.5));
    let decision = decide(&agent, &far, Some(&attack_now), 0.5, &tuning, &mut rng);
    assert_eq!(decision.state, AgentState::Approach);
    assert_eq!(rng.draws(), 0);
}

#[test]
fn flank_orders_pick_the_side() {
    let tuning = HuntConfig::default().agent;
    let mut agent = wolf();
    agent.state = AgentState::Alert;
    let mut rng = SimRng::new(5);
    let p = see(&agent, Vec2::new(0.7, 0.5));

    let right = decide(&agent, &p, Some(&message(MessageKind::FlankRight)), 0.5, &tuning, &mut rng);
    assert_eq!(right.state, AgentState::Flank);
    assert_eq!(right.flank_side, Some(1.0));

    let left = decide(&agent, &p, Some(&message(MessageKind::FlankLeft)), 0.5, &tuning, &mut rng);
    assert_eq!(left.flank_side, Some(-1.0));
}

#[test]
fn receptiveness_filters_by_context() {
    let base = Receptiveness {
        state: AgentState::Alert,
        under_directive: false,
        can_engage: true,
        flanking_plan: false,
        in_detection: true,
    };

    assert!(base.accepts(&message(MessageKind::AttackNow)));
    assert!(base.accepts(&message(MessageKind::Retreat)));
    assert!(!base.accepts(&message(MessageKind::FlankLeft)));
    assert!(!base.accepts(&message(MessageKind::TargetSpotted)));

    let cooling = Receptiveness {
        can_engage: false,
        ..base
    };
    assert!(!cooling.accepts(&message(MessageKind::AttackNow)));

    let swinging = Receptiveness {
        state: AgentState::Attack,
        ..base
    };
    assert!(!swinging.accepts(&message(MessageKind::Retreat)));

    let flanker = Receptiveness {
        flanking_plan: true,
        ..base
    };
    assert!(flanker.accepts(&message(MessageKind::FlankRight)));

    let patrolling = Receptiveness {
        state: AgentState::Patrol,
        in_detection: false,
        ..base
    };
    assert!(patrolling.accepts(&message(MessageKind::TargetSpotted)));
    assert!(!patrolling.accepts(&message(MessageKind::NeedHelp)));

    let ordered = Receptiveness {
        under_directive: true,
        ..base
    };
    assert!(!ordered.accepts(&message(MessageKind::Regroup)));
}

#[test]
fn ambush_without_cover_becomes_approach() {
    let mut agent = wolf();
    agent.state = AgentState::Alert;
    agent.state_timer = 0.0;
    agent.intelligence = 0.8;
    agent.engagement.preferred = AgentState::Ambush;
    assert!(agent.terrain.entries().is_empty());

    let p = see(&agent, Vec2::new(0.75, 0.5));
    assert!(p.in_hearing && !p.in_probe);
    assert_eq!(next(&agent, &p, None), AgentState::Approach);
}

#[test]
fn smart_wolf_waits_out_a_raised_guard() {
    let mut agent = wolf();
    agent.state = AgentState::Strafe;
    let mut target = TargetInput::at(Vec2::new(0.55, 0.5));
    target.blocking = true;

    agent.intelligence = 0.9;
    let p = see_input(&agent, &target);
    assert!(p.in_attack && p.guarded);
    assert_eq!(next(&agent, &p, None), AgentState::Strafe);

    agent.intelligence = 0.3;
    assert_eq!(next(&agent, &p, None), AgentState::Attack);
}

#[test]
fn combo_roll_only_when_eager_and_rested() {
    let tuning = HuntConfig::default().agent;
    let mut agent = wolf();
    agent.state = AgentState::Attack;
    agent.state_timer = 0.0;
    let p = see(&agent, Vec2::new(0.55, 0.5));

    let mut rng = SimRng::new(5);
    let calm = decide(&agent, &p, None, 0.5, &tuning, &mut rng);
    assert_eq!(calm.state, AgentState::Recover);
    assert_eq!(rng.draws(), 0);

    agent.stamina = 0.3;
    let tired = decide(&agent, &p, None, 0.9, &tuning, &mut rng);
    assert_eq!(tired.state, AgentState::Recover);
    assert_eq!(rng.draws(), 0);

    agent.stamina = 1.0;
    let eager = decide(&agent, &p, None, 0.9, &tuning, &mut rng);
    assert!(matches!(eager.state, AgentState::Combo | AgentState::Recover));
    assert_eq!(rng.draws(), 1);
}

#[test]
fn entering_and_leaving_an_attack_keeps_the_books() {
    let tuning = HuntConfig::default().agent;
    let mut agent = wolf();
    agent.state = AgentState::Strafe;
    let mut rng = SimRng::new(8);

    let entry = enter(&mut agent, AgentState::Attack, 1.0, &mut rng, &tuning);
    let kind = entry.started.unwrap();
    assert_eq!(agent.state, AgentState::Attack);
    assert_eq!(agent.previous_state, AgentState::Strafe);
    assert_eq!(agent.attack.kind, kind);
    assert_eq!(agent.stamina, 1.0 - tuning.attack_stamina_cost);
    assert_eq!(agent.state_timer, kind.timing().total() * agent.tempo);
    assert!(entry.resolved.is_none());

    let exit = enter(&mut agent, AgentState::Recover, 1.0, &mut rng, &tuning);
    let expected = if kind == AttackKind::Feint {
        AttackOutcome::Feinted
    } else {
        AttackOutcome::Missed
    };
    assert_eq!(exit.resolved, Some(expected));
    assert!(exit.chain_ended);
    assert!(agent.attack.cooldown_pending);
    assert_eq!(agent.swings_failed, u32::from(expected == AttackOutcome::Missed));
}

#[test]
fn retreat_costs_morale() {
    let tuning = HuntConfig::default().agent;
    let mut agent = wolf();
    agent.morale = 0.5;
    let mut rng = SimRng::new(8);

    let entry = enter(&mut agent, AgentState::Retreat, 1.0, &mut rng, &tuning);
    assert_eq!(entry, StateEntry::default());
    assert!((agent.morale - 0.4).abs() < 1e-6);
    assert_eq!(rng.draws(), 0);
}
