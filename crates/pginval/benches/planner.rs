//! Benchmark planning and applying invalidations.
//!
//! Planning is pure and runs after every editor submission, so it should stay
//! well below parser cost even for long migration scripts.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pginval::{
    Event, InvalidateOptions, InvalidationEvent, InvalResult, QueryCache, QueryKey,
    apply_invalidations, plan_invalidations_from_events,
};

/// Accepts every invalidation.
struct NullCache;

#[async_trait::async_trait]
impl QueryCache for NullCache {
    async fn invalidate(&self, _key: &QueryKey, _options: InvalidateOptions) -> InvalResult<()> {
        Ok(())
    }
}

fn make_events(count: usize) -> Vec<InvalidationEvent> {
    (0..count)
        .map(|i| {
            let event = match i % 3 {
                0 => Event::table("public", &format!("t_{i}")),
                1 => Event::function("api", &format!("f_{i}")),
                _ => Event::cron("schedule"),
            };
            InvalidationEvent::new("bench-project", event)
        })
        .collect()
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_invalidations_from_events");

    for size in [1, 10, 100, 1000] {
        let events = make_events(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &events, |b, events| {
            b.iter(|| black_box(plan_invalidations_from_events(events)));
        });
    }

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut group = c.benchmark_group("apply_invalidations");

    for size in [10, 100] {
        let actions = plan_invalidations_from_events(&make_events(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &actions, |b, actions| {
            b.iter(|| black_box(runtime.block_on(apply_invalidations(&NullCache, actions))));
        });
    }

    group.finish();
}

#[cfg(feature = "sql")]
fn bench_extract(c: &mut Criterion) {
    use pginval::{EventExtractor, PgQueryParser};

    let extractor = EventExtractor::new(PgQueryParser);
    let mut group = c.benchmark_group("extract_and_plan");

    for (name, sql) in [
        ("select_prefiltered", "SELECT * FROM users WHERE id = 1"),
        ("create_table", "CREATE TABLE public.users (id INT PRIMARY KEY)"),
        (
            "mixed",
            "CREATE TABLE a (id INT); DROP TABLE b, c; SELECT cron.schedule('j', '* * * * *', 'SELECT 1')",
        ),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| {
                let events = extractor.extract(sql, "bench-project").into_events();
                black_box(plan_invalidations_from_events(&events))
            });
        });
    }

    group.finish();
}

#[cfg(feature = "sql")]
criterion_group!(benches, bench_plan, bench_apply, bench_extract);
#[cfg(not(feature = "sql"))]
criterion_group!(benches, bench_plan, bench_apply);
criterion_main!(benches);
