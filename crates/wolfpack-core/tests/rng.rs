use wolfpack_core::rng::{derive_seed, mix64};
use wolfpack_core::{DeterministicRng, SimRng, SplitMix64};

#[test]
fn same_seed_produces_same_stream() {
    let mut a = SimRng::new(12345);
    let mut b = SimRng::new(12345);
    for _ in 0..1_000 {
        assert_eq!(a.next_float().to_bits(), b.next_float().to_bits());
    }
    assert_eq!(a.draws(), 1_000);
    assert_eq!(a.state(), b.state());
}

#[test]
fn different_seeds_diverge() {
    let mut a = SimRng::new(1);
    let mut b = SimRng::new(2);
    let same = (0..64).filter(|_| a.next_u64() == b.next_u64()).count();
    assert!(same < 4);
}

#[test]
fn floats_stay_in_unit_interval() {
    let mut rng = SimRng::new(7);
    for _ in 0..10_000 {
        let x = rng.next_float();
        assert!((0.0..1.0).contains(&x), "{x}");
    }
}

#[test]
fn range_respects_bounds_and_reversed_input() {
    let mut rng = SimRng::new(99);
    for _ in 0..5_000 {
        let x = rng.range(0.8, 1.2);
        assert!((0.8..=1.2).contains(&x));
        let y = rng.range(2.5, 1.5);
        assert!((1.5..=2.5).contains(&y));
    }
}

#[test]
fn chance_extremes_are_exact() {
    let mut rng = SimRng::new(3);
    for _ in 0..1_000 {
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
        assert!(!rng.chance(f32::NAN));
    }
    assert_eq!(rng.draws(), 3_000);
}

#[test]
fn index_is_in_bounds_and_skips_trivial_lengths() {
    let mut rng = SimRng::new(5);
    assert_eq!(rng.index(0), 0);
    assert_eq!(rng.index(1), 0);
    assert_eq!(rng.draws(), 0);

    let mut seen = [0u32; 7];
    for _ in 0..7_000 {
        seen[rng.index(7)] += 1;
    }
    assert!(seen.iter().all(|&n| n > 800), "{seen:?}");
}

#[test]
fn restored_state_continues_the_same_stream() {
    let mut rng = SimRng::new(42);
    for _ in 0..17 {
        rng.next_float();
    }
    let saved = rng.state();
    let mut restored = SimRng::from_state(saved);
    for _ in 0..100 {
        assert_eq!(rng.next_u64(), restored.next_u64());
    }
    assert_eq!(rng.draws(), restored.draws());
}

#[test]
fn splitmix_matches_reference_mixer() {
    let mut sm = SplitMix64::new(0);
    assert_eq!(sm.next_u64(), mix64(0x9E3779B97F4A7C15));
}

#[test]
fn derived_seeds_depend_on_every_input() {
    let base = derive_seed(1, 2, 3);
    assert_eq!(base, derive_seed(1, 2, 3));
    assert_ne!(base, derive_seed(9, 2, 3));
    assert_ne!(base, derive_seed(1, 9, 3));
    assert_ne!(base, derive_seed(1, 2, 9));
}

#[cfg(feature = "serde")]
#[test]
fn saved_state_survives_json() {
    let mut rng = SimRng::new(2024);
    for _ in 0..9 {
        rng.next_float();
    }
    let json = serde_json::to_string(&rng.state()).expect("serialize rng state");
    let state: wolfpack_core::RngState =
        serde_json::from_str(&json).expect("deserialize rng state");
    assert_eq!(state, rng.state());

    let mut restored = SimRng::from_state(state);
    for _ in 0..32 {
        assert_eq!(rng.next_u64(), restored.next_u64());
    }

    let mut sm = SplitMix64::new(77);
    sm.next_u64();
    let json = serde_json::to_string(&sm).expect("serialize splitmix");
    let mut back: SplitMix64 = serde_json::from_str(&json).expect("deserialize splitmix");
    assert_eq!(back, sm);
    assert_eq!(back.next_u64(), sm.next_u64());
}
