use cartrack_schema::{AdditionalData, Carton, CartonId};
use cartrack_store::{StoreConfig, TableStore};
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_cartons(n: usize) -> Vec<Carton> {
    let meta = serde_json::json!({"recipient": "bench", "weight_kg": 4.2});
    (0..n)
        .map(|i| {
            Carton::scanned(
                CartonId::new(format!("CTN-{i:06}")),
                "2025-01-01T00:00:00.000Z".to_owned(),
            )
            .with_additional_data(AdditionalData::from_value(&meta))
        })
        .collect()
}

fn bench_replace(c: &mut Criterion) {
    c.bench_function("table_replace_1000_cartons", |b| {
        b.iter_with_setup(
            || {
                let dir = tempfile::tempdir().unwrap();
                let store = TableStore::new(StoreConfig::new(dir.path()));
                store.replace_table(&sample_cartons(1000)).unwrap();
                (dir, store, sample_cartons(1000))
            },
            |(_dir, store, rows)| {
                store.replace_table(&rows).unwrap();
            },
        );
    });
}

fn bench_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::new(StoreConfig::new(dir.path()));
    store.replace_table(&sample_cartons(1000)).unwrap();

    c.bench_function("table_load_1000_cartons", |b| {
        b.iter(|| store.load_table::<Carton>());
    });
}

criterion_group!(benches, bench_replace, bench_load);
criterion_main!(benches);
