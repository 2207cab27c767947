use std::path::{Path, PathBuf};

use proptest::prelude::*;
use wolfpack_ai::{HuntConfig, HuntError};
use wolfpack_tools::{
    scripted_target, GoldenTrace, NullTraceSink, Scenario, TraceError, VecTraceSink,
    FORMAT_VERSION,
};

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("wolfpack-{}-{name}.json", std::process::id()))
}

#[test]
fn scenario_a_records_the_same_trace_twice() {
    let scenario = Scenario::default();
    let mut sink = VecTraceSink::default();

    let first = scenario.record(&mut sink).unwrap();
    let second = scenario.record(&mut NullTraceSink).unwrap();

    assert_eq!(first.ticks.len(), 120);
    assert_eq!(first.ticks[0].tick, 1);
    assert_eq!(first, second);
    assert_eq!(sink.events, first.events.events);
    assert!(first.events.count_tag("pack.spawned") == 1);
    assert!(first.events.count_tag("pack.plan") >= 1);
    assert!(first.first_divergence(&second).is_none());
}

/// Scenario A as recorded on a known-good build.
///
/// Set `WOLFPACK_BLESS=1` to re-record it after an intended behavior change. A checkout without
/// the file records it on first run.
fn blessed_scenario_a() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/golden/scenario_a.json")
}

#[test]
fn scenario_a_matches_the_blessed_trace() {
    let path = blessed_scenario_a();
    if std::env::var_os("WOLFPACK_BLESS").is_some() || !path.exists() {
        let trace = Scenario::default().record(&mut NullTraceSink).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        trace.save(&path).unwrap();
        eprintln!("recorded {}", path.display());
        return;
    }

    let blessed = GoldenTrace::load(&path).unwrap();
    assert_eq!(blessed.scenario, Scenario::default());
    assert_eq!(blessed.ticks.len(), 120);
    if let Err(err) = blessed.verify() {
        panic!("scenario A no longer matches {}: {err}", path.display());
    }
}

#[test]
fn different_seeds_diverge_on_the_first_tick() {
    let a = Scenario::default().record(&mut NullTraceSink).unwrap();
    let b = Scenario {
        seed: 54321,
        ..Scenario::default()
    }
    .record(&mut NullTraceSink)
    .unwrap();

    let divergence = a.first_divergence(&b).unwrap();
    assert_eq!(divergence.tick, 1);
}

#[test]
fn tampered_digest_is_reported_at_its_tick() {
    let scenario = Scenario {
        ticks: 40,
        ..Scenario::default()
    };
    let mut trace = scenario.record(&mut NullTraceSink).unwrap();
    trace.ticks[24].digest ^= 1;

    let divergence = trace.replay().unwrap().unwrap();
    assert_eq!(divergence.tick, 25);
    assert_eq!(divergence.expected.map(|t| t.digest), Some(trace.ticks[24].digest));
    assert!(matches!(trace.verify(), Err(TraceError::Diverged { tick: 25 })));
}

#[test]
fn truncated_trace_diverges_where_it_ends() {
    let scenario = Scenario {
        ticks: 30,
        ..Scenario::default()
    };
    let full = scenario.record(&mut NullTraceSink).unwrap();
    let mut short = full.clone();
    short.ticks.truncate(20);

    let divergence = short.first_divergence(&full).unwrap();
    assert_eq!(divergence.tick, 21);
    assert!(divergence.expected.is_none());
    assert!(divergence.actual.is_some());
}

#[test]
fn traces_survive_a_trip_through_disk() {
    let scenario = Scenario {
        packs: 2,
        agents: 4,
        ticks: 60,
        config: {
            let mut config = HuntConfig::default();
            config.pack.max_packs = 2;
            config
        },
        ..Scenario::default()
    };
    let trace = scenario.record(&mut NullTraceSink).unwrap();
    let path = scratch("disk");

    trace.save(&path).unwrap();
    let loaded = GoldenTrace::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, trace);
    assert!(loaded.verify().is_ok());
}

#[test]
fn unknown_format_is_rejected() {
    let mut trace = Scenario {
        ticks: 5,
        ..Scenario::default()
    }
    .record(&mut NullTraceSink)
    .unwrap();
    trace.format = FORMAT_VERSION + 1;
    let json = serde_json::to_string(&trace).unwrap();

    let err = GoldenTrace::from_json(&json).unwrap_err();
    assert!(matches!(err, TraceError::Format { .. }));
    assert!(matches!(
        GoldenTrace::from_json("{not json"),
        Err(TraceError::Json(_))
    ));
}

#[test]
fn too_many_packs_is_a_setup_error() {
    let mut config = HuntConfig::default();
    config.pack.max_packs = 2;
    let scenario = Scenario {
        packs: 3,
        config,
        ..Scenario::default()
    };
    let err = scenario.record(&mut NullTraceSink).unwrap_err();
    assert!(matches!(err, TraceError::Hunt(HuntError::PackLimit { .. })));
}

#[test]
fn scripted_target_sweeps_and_turns_back() {
    let start = scripted_target(0, 1.0);
    let middle = scripted_target(300, 1.0);
    let back = scripted_target(600, 1.0);

    assert_eq!(start.position.x, 0.3);
    assert!((middle.position.x - 0.7).abs() < 1e-6);
    assert_eq!(back.position, start.position);
    assert!(start.velocity.x > 0.0);
    assert!(scripted_target(450, 1.0).velocity.x < 0.0);
    assert!(start.blocking);
    assert!(!scripted_target(10, 1.0).blocking);
}

#[test]
fn spawn_layout_stays_on_the_map() {
    let scenario = Scenario {
        agents: 8,
        ..Scenario::default()
    };
    for pack in 0..8 {
        for p in scenario.pack_positions(pack) {
            assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
        }
    }
    let terrain = scenario.terrain();
    assert_eq!(terrain, scenario.terrain());
    assert!(terrain.iter().all(|f| (0.05..=0.95).contains(&f.position.x)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn any_seed_replays_cleanly(seed in any::<u64>(), agents in 1usize..=8) {
        let scenario = Scenario { seed, agents, ticks: 45, ..Scenario::default() };
        let trace = scenario.record(&mut NullTraceSink).unwrap();
        prop_assert!(trace.replay().unwrap().is_none());
    }
}
