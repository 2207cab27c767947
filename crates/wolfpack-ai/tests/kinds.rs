use wolfpack_ai::agent::TEMPO_STREAM;
use wolfpack_ai::config::LeaderTuning;
use wolfpack_ai::pack::assign_roles;
use wolfpack_ai::state_machine::Perception;
use wolfpack_ai::{
    Agent, AgentKey, HuntConfig, NullHost, PackCoordinator, PackKey, Role, SimRng, TargetInput,
    Vec2, WolfKind,
};
use wolfpack_core::rng::agent_phase;

fn spawn(kind: WolfKind) -> (Agent, SimRng) {
    let mut rng = SimRng::new(8);
    let agent = Agent::spawn(
        AgentKey(3),
        PackKey(0),
        kind,
        Vec2::new(0.5, 0.5),
        41,
        &mut rng,
        &HuntConfig::default(),
    );
    (agent, rng)
}

#[test]
fn kinds_shift_temperament_without_extra_draws() {
    let (normal, normal_rng) = spawn(WolfKind::Normal);
    for kind in WolfKind::ALL {
        let (agent, rng) = spawn(kind);
        assert_eq!(rng.draws(), normal_rng.draws(), "{}", kind.name());
        assert_eq!(agent.morale, normal.morale);
        assert_eq!(agent.tempo, normal.tempo);
        assert_eq!(agent.kind, kind);
    }

    let (alpha, _) = spawn(WolfKind::Alpha);
    assert_eq!(alpha.aggression, (normal.aggression + 0.2).min(1.0));
    assert_eq!(alpha.intelligence, normal.intelligence);

    let (scout, _) = spawn(WolfKind::Scout);
    assert_eq!(scout.intelligence, (normal.intelligence + 0.1).min(1.0));

    let (hunter, _) = spawn(WolfKind::Hunter);
    assert_eq!(hunter.coordination, (normal.coordination + 0.15).min(1.0));

    let (omega, _) = spawn(WolfKind::Omega);
    assert_eq!(omega.aggression, normal.aggression);
    assert_eq!(omega.coordination, normal.coordination);
}

#[test]
fn offsets_never_leave_the_unit_interval() {
    let mut config = HuntConfig::default();
    config.agent.aggression = wolfpack_ai::Span::new(0.95, 1.0);
    config.agent.intelligence = wolfpack_ai::Span::new(0.95, 1.0);
    config.agent.coordination = wolfpack_ai::Span::new(0.95, 1.0);
    let mut rng = SimRng::new(2);
    for kind in WolfKind::ALL {
        let agent = Agent::spawn(AgentKey(0), PackKey(0), kind, Vec2::ZERO, 1, &mut rng, &config);
        for v in [agent.aggression, agent.intelligence, agent.coordination] {
            assert!((0.0..=1.0).contains(&v), "{} {v}", kind.name());
        }
    }
}

#[test]
fn tempo_comes_from_the_seed_phase() {
    let (agent, _) = spawn(WolfKind::Normal);
    let phase = agent_phase(41, AgentKey(3), TEMPO_STREAM);
    assert_eq!(agent.tempo, 1.0 + 0.02 * (2.0 * phase - 1.0));
}

#[test]
fn alphas_shrug_off_damage_and_hit_harder() {
    let tuning = HuntConfig::default();
    let leader = LeaderTuning::default();
    let (mut alpha, _) = spawn(WolfKind::Alpha);
    let lost = alpha.take_damage(0.3, &tuning.agent);
    assert!((lost - 0.2).abs() < 1e-6);
    assert!((alpha.damage_multiplier(&leader) - 1.3).abs() < 1e-6);
    assert_eq!(alpha.speed_multiplier(&leader), 1.0);

    let (hunter, _) = spawn(WolfKind::Hunter);
    assert!((hunter.damage_multiplier(&leader) - 1.2).abs() < 1e-6);

    let (mut scout, _) = spawn(WolfKind::Scout);
    assert!((scout.speed_multiplier(&leader) - 1.2).abs() < 1e-6);
    scout.enraged = 1.0;
    assert!((scout.speed_multiplier(&leader) - 1.8).abs() < 1e-5);
    assert_eq!(scout.damage_multiplier(&leader), 2.0);
}

#[test]
fn scouts_see_farther() {
    let tuning = HuntConfig::default().agent;
    let target = TargetInput::at(Vec2::new(0.5, 0.95));
    let (normal, _) = spawn(WolfKind::Normal);
    let (scout, _) = spawn(WolfKind::Scout);

    let normal_sees = Perception::new(&normal, &target, target.position, 0.0, &tuning);
    let scout_sees = Perception::new(&scout, &target, target.position, 0.0, &tuning);
    assert!(!normal_sees.in_detection);
    assert!(scout_sees.in_detection);
}

#[test]
fn an_alpha_wins_the_lead_over_an_equal_packmate() {
    let config = HuntConfig::default();
    let (normal, _) = spawn(WolfKind::Normal);
    let mut pack = vec![
        Agent {
            id: AgentKey(0),
            ..normal.clone()
        },
        Agent {
            id: AgentKey(1),
            kind: WolfKind::Alpha,
            ..normal
        },
    ];
    let mut rng = SimRng::new(4);
    let assignments = {
        let mut members: Vec<&mut Agent> = pack.iter_mut().collect();
        assign_roles(&mut members, Vec2::new(0.5, 0.5), &mut rng, &config)
    };
    assert_eq!(assignments[0].role, Role::Leader);
    assert_eq!(assignments[0].agent, AgentKey(1));
}

#[test]
fn mixed_packs_keep_their_kinds() {
    let mut hunt = PackCoordinator::new(5, HuntConfig::default(), Vec::new()).unwrap();
    let mut host = NullHost::default();
    let roster = [
        (Vec2::new(0.4, 0.4), WolfKind::Alpha),
        (Vec2::new(0.45, 0.4), WolfKind::Scout),
        (Vec2::new(0.5, 0.4), WolfKind::Omega),
    ];
    hunt.spawn_mixed_pack(&roster, &mut host).unwrap();

    let kinds: Vec<WolfKind> = hunt.agents().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![WolfKind::Alpha, WolfKind::Scout, WolfKind::Omega]);
    assert_eq!(hunt.agent_kind(1), WolfKind::Scout.id());
    assert_eq!(hunt.snapshot().agents[0].kind, WolfKind::Alpha);
}
