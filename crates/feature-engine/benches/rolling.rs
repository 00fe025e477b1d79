use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{FeatureConfig, RollingFeatureComputer};
use series_store::{Reading, TimeSeriesStore, SENSOR_COUNT, SETTING_COUNT};

fn fleet(engines: u32, cycles: u32) -> TimeSeriesStore {
    let readings = (1..=engines).flat_map(|engine| {
        (1..=cycles).map(move |cycle| Reading {
            entity_id: engine,
            cycle,
            operational_settings: [0.0; SETTING_COUNT],
            sensor_values: std::array::from_fn(|s| 500.0 + s as f64 + (cycle as f64 * 0.1).sin()),
        })
    });
    TimeSeriesStore::from_readings(readings).expect("valid fleet")
}

fn bench_rolling(c: &mut Criterion) {
    let computer = RollingFeatureComputer::new(&FeatureConfig::default()).expect("default config");
    let store = fleet(100, 200);

    c.bench_function("compute_all_100x200", |b| {
        b.iter(|| computer.compute_all(black_box(&store)))
    });

    let series = store.get(1).expect("engine 1");
    c.bench_function("compute_single_engine", |b| {
        b.iter(|| computer.compute(black_box(series)))
    });
}

criterion_group!(benches, bench_rolling);
criterion_main!(benches);
