use criterion::{black_box, criterion_group, criterion_main, Criterion};
use admission_predictor::{
    history::{HistoryBackend, HistoryEntry, HistoryKey, HistoryStore, SqliteHistoryBackend},
    Gender, PredictionQuery, Quota, Round,
};
use std::num::NonZeroUsize;
use std::sync::Arc;

fn query(rank: u32, category: &str) -> PredictionQuery {
    PredictionQuery {
        rank,
        category: category.to_string(),
        quota: Quota::HS,
        gender: Gender::GenderNeutral,
        round: Round::Numbered(1),
        year: 2024,
        authority: "JoSAA".to_string(),
        state: None,
    }
}

fn capacity() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap()
}

fn bench_history_record(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = HistoryStore::in_memory(capacity(), HistoryKey::ExcludeRank);
    let mut i = 0u32;

    c.bench_function("history_record_memory", |b| {
        b.to_async(&runtime).iter(|| {
            i = i.wrapping_add(1);
            let category = format!("CAT-{}", i % 8);
            let store = &store;
            async move { black_box(store.record(&query(i, &category), 3).await.unwrap()) }
        });
    });
}

fn bench_sqlite_save(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let backend = Arc::new(SqliteHistoryBackend::new(":memory:").unwrap());
    let entries: Vec<HistoryEntry> = (0..5)
        .map(|i| HistoryEntry {
            query: query(100 + i, "OPEN"),
            result_count: i as usize,
            timestamp: chrono::Utc::now(),
        })
        .collect();

    c.bench_function("history_sqlite_save", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(backend.save(&entries).await.unwrap())
        });
    });

    c.bench_function("history_sqlite_load", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(backend.load().await.unwrap())
        });
    });
}

criterion_group!(benches, bench_history_record, bench_sqlite_save);
criterion_main!(benches);
