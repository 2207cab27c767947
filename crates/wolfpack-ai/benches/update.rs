use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wolfpack_ai::{
    HuntConfig, NullHost, PackCoordinator, TargetInput, TerrainFeature, TerrainKind, Vec2,
};

fn make_hunt(packs: usize, members: usize) -> (PackCoordinator, NullHost) {
    let terrain = (0..16).map(|i| {
        let x = 0.1 + (i % 4) as f32 * 0.25;
        let y = 0.1 + (i / 4) as f32 * 0.25;
        TerrainFeature::new(Vec2::new(x, y), 0.05, TerrainKind::ALL[i % TerrainKind::ALL.len()])
    });
    let mut config = HuntConfig::default();
    config.pack.max_packs = packs;
    let mut hunt = PackCoordinator::new(7, config, terrain).expect("default config is valid");
    let mut host = NullHost::default();
    for p in 0..packs {
        let positions: Vec<Vec2> = (0..members)
            .map(|m| {
                let x = 0.1 + 0.8 * (p as f32 / packs as f32);
                Vec2::new(x, 0.1 + 0.02 * m as f32)
            })
            .collect();
        hunt.spawn_pack(&positions, &mut host).expect("pack fits");
    }
    (hunt, host)
}

fn bench_update(c: &mut Criterion) {
    let dt = 1.0 / 60.0;
    let mut group = c.benchmark_group("wolfpack-ai/update");

    for &packs in &[1usize, 4, 8] {
        let (mut hunt, mut host) = make_hunt(packs, 8);
        let mut target = TargetInput::at(Vec2::new(0.5, 0.5));
        target.velocity = Vec2::new(0.05, 0.0);
        group.bench_with_input(BenchmarkId::from_parameter(packs * 8), &packs, |b, &_packs| {
            b.iter(|| {
                hunt.update(dt, &target, &mut host);
                black_box(hunt.agent_x(0));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
