use wolfpack_ai::config::{AgentTuning, FairnessConfig};
use wolfpack_ai::fairness::{
    corner_yielders, requested_pressure, Directive, DirectiveReason, Engaged, MercyWindow,
    Pressure, PressureBudget,
};
use wolfpack_ai::{AgentKey, AgentState, SimRng, Vec2};

fn engaged(id: u32, x: f32, y: f32) -> Engaged {
    Engaged {
        id: AgentKey(id),
        position: Vec2::new(x, y),
    }
}

#[test]
fn requested_pressure_follows_state_and_distance() {
    let tuning = AgentTuning::default();
    let probe = tuning.probe_range();
    let threaten = tuning.threaten_range();

    assert_eq!(requested_pressure(AgentState::Attack, 1.0, &tuning), Pressure::Commit);
    assert_eq!(requested_pressure(AgentState::Combo, 0.0, &tuning), Pressure::Commit);
    assert_eq!(requested_pressure(AgentState::Strafe, probe, &tuning), Pressure::Probe);
    assert_eq!(
        requested_pressure(AgentState::Approach, threaten, &tuning),
        Pressure::Threaten
    );
    assert_eq!(
        requested_pressure(AgentState::Approach, threaten + 0.01, &tuning),
        Pressure::None
    );
    assert_eq!(requested_pressure(AgentState::Ambush, 0.01, &tuning), Pressure::None);
    assert_eq!(requested_pressure(AgentState::Retreat, 0.01, &tuning), Pressure::None);
}

#[test]
fn budget_grants_in_request_order_up_to_caps() {
    let config = FairnessConfig::default();
    let mut budget = PressureBudget::default();

    assert_eq!(budget.exchange(Pressure::None, Pressure::Commit, &config), Pressure::Commit);
    // Second commit falls back to the free probe slot.
    assert_eq!(budget.exchange(Pressure::None, Pressure::Commit, &config), Pressure::Probe);
    // Both slots taken: threaten only.
    assert_eq!(budget.exchange(Pressure::None, Pressure::Probe, &config), Pressure::Threaten);
    assert_eq!(budget.exchange(Pressure::None, Pressure::Commit, &config), Pressure::Threaten);
    assert_eq!(budget, PressureBudget { commits: 1, probes: 1 });
    assert!(budget.within(&config));
    assert!(!budget.has_room(Pressure::Probe, &config));
}

#[test]
fn holder_keeps_its_grant_on_renewal() {
    let config = FairnessConfig::default();
    let mut budget = PressureBudget::default();
    let held = budget.exchange(Pressure::None, Pressure::Commit, &config);

    assert_eq!(budget.exchange(held, Pressure::Commit, &config), Pressure::Commit);
    assert_eq!(budget.commits, 1);

    budget.release(Pressure::Commit);
    assert!(budget.has_room(Pressure::Commit, &config));
}

#[test]
fn rebuild_demotes_grants_beyond_caps() {
    let config = FairnessConfig::default();
    let mut grants = vec![
        Pressure::Commit,
        Pressure::Commit,
        Pressure::Probe,
        Pressure::Threaten,
    ];

    let (budget, demoted) = PressureBudget::rebuild(grants.iter_mut(), &config);

    assert_eq!(
        grants,
        vec![Pressure::Commit, Pressure::Probe, Pressure::Threaten, Pressure::Threaten]
    );
    assert_eq!(demoted, 2);
    assert_eq!(budget, PressureBudget { commits: 1, probes: 1 });
}

#[test]
fn mercy_window_triggers_on_two_recent_hits_then_clears() {
    let config = FairnessConfig::default();
    let mut mercy = MercyWindow::default();

    mercy.record_hit(0.0);
    assert!(!mercy.check(0.5, &config));
    mercy.record_hit(1.0);
    assert!(mercy.check(1.5, &config));
    assert_eq!(mercy.hits(), 0);
    assert_eq!(mercy.triggers, 1);

    mercy.record_hit(2.0);
    assert!(!mercy.check(2.1, &config));
}

#[test]
fn mercy_window_forgets_old_hits() {
    let config = FairnessConfig::default();
    let mut mercy = MercyWindow::default();

    mercy.record_hit(0.0);
    mercy.record_hit(2.5);
    assert!(!mercy.check(2.6, &config));
    assert_eq!(mercy.hits(), 1);
}

#[test]
fn mercy_directive_draws_disengage_duration() {
    let config = FairnessConfig::default();
    let mut rng = SimRng::new(11);
    for _ in 0..100 {
        let directive = Directive::mercy(&mut rng, &config);
        assert_eq!(directive.state, AgentState::Retreat);
        assert_eq!(directive.reason, DirectiveReason::Mercy);
        assert!((0.8..=1.2).contains(&directive.remaining));
    }
    assert_eq!(rng.draws(), 100);
}

#[test]
fn yield_directive_expires() {
    let mut directive = Directive::yield_for(0.1);
    assert_eq!(directive.state, AgentState::Strafe);
    assert!(directive.is_active());
    directive.remaining -= 0.1;
    assert!(!directive.is_active());
}

#[test]
fn farther_agent_yields_inside_the_arc() {
    let target = Vec2::new(0.5, 0.5);
    let arc = FairnessConfig::default().corner_arc_cos;
    let agents = [engaged(0, 0.6, 0.5), engaged(1, 0.7, 0.51)];

    assert_eq!(
        corner_yielders(target, Vec2::X, &agents, arc),
        vec![AgentKey(1)]
    );
}

#[test]
fn agents_on_opposite_sides_do_not_yield() {
    let target = Vec2::new(0.5, 0.5);
    let arc = FairnessConfig::default().corner_arc_cos;
    let agents = [
        engaged(0, 0.6, 0.5),
        engaged(1, 0.4, 0.5),
        engaged(2, 0.5, 0.6),
    ];

    assert!(corner_yielders(target, Vec2::X, &agents, arc).is_empty());
}

#[test]
fn equal_distance_tie_yields_the_one_behind_the_target_facing() {
    let target = Vec2::ZERO;
    let arc = FairnessConfig::default().corner_arc_cos;
    // 5-12-13 triangle: both exactly 13/16 from the target, about 23° apart.
    let behind = engaged(7, 0.8125, 0.0);
    let ahead = engaged(8, 0.75, 0.3125);

    let ids = corner_yielders(target, Vec2::new(0.0, 1.0), &[behind, ahead], arc);
    assert_eq!(ids, vec![AgentKey(7)]);
}

#[test]
fn full_tie_yields_the_higher_id() {
    let target = Vec2::new(0.5, 0.5);
    let arc = FairnessConfig::default().corner_arc_cos;
    let first = engaged(6, 0.6, 0.5);
    let second = engaged(5, 0.6, 0.5);

    let ids = corner_yielders(target, Vec2::X, &[first, second], arc);
    assert_eq!(ids, vec![AgentKey(6)]);
}

#[test]
fn a_yielding_agent_is_not_compared_again() {
    let target = Vec2::new(0.5, 0.5);
    let arc = FairnessConfig::default().corner_arc_cos;
    let agents = [
        engaged(0, 0.7, 0.5),
        engaged(1, 0.6, 0.5),
        engaged(2, 0.8, 0.5),
    ];

    let mut ids = corner_yielders(target, Vec2::X, &agents, arc);
    ids.sort();
    assert_eq!(ids, vec![AgentKey(0), AgentKey(2)]);
}
