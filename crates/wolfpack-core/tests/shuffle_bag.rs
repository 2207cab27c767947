use proptest::prelude::*;
use wolfpack_core::{ShuffleBag, SimRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Plan {
    Ambush,
    Pincer,
    Retreat,
    Commit,
    Flank,
    Distract,
    Regroup,
}

const PLANS: [Plan; 7] = [
    Plan::Ambush,
    Plan::Pincer,
    Plan::Retreat,
    Plan::Commit,
    Plan::Flank,
    Plan::Distract,
    Plan::Regroup,
];

#[test]
fn each_round_is_a_permutation_of_distinct_items() {
    let mut rng = SimRng::new(12345);
    let mut bag = ShuffleBag::new(PLANS);
    for _ in 0..20 {
        let mut round: Vec<Plan> = (0..PLANS.len())
            .map(|_| bag.draw(&mut rng).unwrap())
            .collect();
        round.sort();
        let mut expected = PLANS.to_vec();
        expected.sort();
        assert_eq!(round, expected);
    }
}

#[test]
fn never_repeats_across_refill() {
    let mut rng = SimRng::new(1);
    let mut bag = ShuffleBag::new(PLANS);
    let mut prev = bag.draw(&mut rng).unwrap();
    for _ in 0..1_000 {
        let next = bag.draw(&mut rng).unwrap();
        assert_ne!(prev, next);
        prev = next;
    }
}

#[test]
fn single_item_bag_repeats() {
    let mut rng = SimRng::new(1);
    let mut bag = ShuffleBag::new([Plan::Commit]);
    for _ in 0..10 {
        assert_eq!(bag.draw(&mut rng), Some(Plan::Commit));
    }
}

#[test]
fn empty_bag_draws_nothing() {
    let mut rng = SimRng::new(1);
    let mut bag: ShuffleBag<Plan> = ShuffleBag::new([]);
    assert!(bag.is_empty());
    assert_eq!(bag.draw(&mut rng), None);
    assert_eq!(rng.draws(), 0);
}

#[test]
fn weights_control_frequency() {
    let mut rng = SimRng::new(77);
    let mut bag = ShuffleBag::weighted([("lunge", 3), ("jab", 2), ("power", 2), ("feint", 1)]);
    assert_eq!(bag.template().len(), 8);

    let mut counts = std::collections::BTreeMap::new();
    for _ in 0..8_000 {
        *counts.entry(bag.draw(&mut rng).unwrap()).or_insert(0u32) += 1;
    }
    assert!(counts["lunge"] > counts["feint"] * 2);
    assert!(counts["feint"] > 500);
}

#[test]
fn same_seed_same_draw_sequence() {
    let mut a = ShuffleBag::new(PLANS);
    let mut b = ShuffleBag::new(PLANS);
    let mut ra = SimRng::new(2024);
    let mut rb = SimRng::new(2024);
    for _ in 0..100 {
        assert_eq!(a.draw(&mut ra), b.draw(&mut rb));
    }
}

#[test]
fn reset_restores_template() {
    let mut rng = SimRng::new(4);
    let mut bag = ShuffleBag::new(PLANS);
    bag.draw(&mut rng);
    bag.draw(&mut rng);
    assert_eq!(bag.remaining(), PLANS.len() - 2);
    bag.reset();
    assert_eq!(bag.remaining(), PLANS.len());
    assert_eq!(bag.last(), None);
}

proptest! {
    #[test]
    fn weighted_bags_never_repeat_back_to_back(
        seed in any::<u64>(),
        weights in proptest::collection::vec(1u32..5, 2..6),
    ) {
        let entries: Vec<(usize, u32)> = weights.iter().copied().enumerate().collect();
        let mut bag = ShuffleBag::weighted(entries);
        let mut rng = SimRng::new(seed);
        let mut prev = bag.draw(&mut rng).unwrap();
        for _ in 0..200 {
            let next = bag.draw(&mut rng).unwrap();
            prop_assert_ne!(prev, next);
            prev = next;
        }
    }
}
