//! Filter and aggregation throughput over synthetic trip tables.

use bikeshare_explorer::execution::{AnalysisEngine, AnalysisOptions};
use bikeshare_explorer::processing::{duration_stats, filter, station_stats, time_stats};
use bikeshare_explorer::types::{TripRecord, TripSchema, TripTable};
use chrono::{Duration as ChronoDuration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const STATIONS: [&str; 6] = [
    "Canal St & Adams St",
    "Clinton St & Madison St",
    "Streeter Dr & Grand Ave",
    "Lake Shore Dr & Monroe St",
    "Wells St & Concord Ln",
    "Theater on the Lake",
];

fn synthetic_table(rows: usize) -> TripTable {
    let origin = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let records = (0..rows)
        .map(|i| {
            // Spread starts over the first half of 2017 with a stride coprime to the hour.
            let start = origin + ChronoDuration::minutes((i as i64 * 37) % (181 * 24 * 60));
            let seconds = 120.0 + ((i * 7919) % 3600) as f64;
            TripRecord {
                end_time: Some(start + ChronoDuration::seconds(seconds as i64)),
                trip_duration: Some(seconds),
                start_station: Some(STATIONS[i % STATIONS.len()].to_string()),
                end_station: Some(STATIONS[(i * 5 + 1) % STATIONS.len()].to_string()),
                user_type: Some(if i % 4 == 0 { "Customer" } else { "Subscriber" }.to_string()),
                gender: (i % 4 != 0).then(|| if i % 3 == 0 { "Female" } else { "Male" }.to_string()),
                birth_year: (i % 4 != 0).then(|| 1950 + (i % 50) as i32),
                ..TripRecord::new(start)
            }
        })
        .collect();
    TripTable::new(TripSchema::full(), records)
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    for rows in [10_000usize, 100_000] {
        let table = synthetic_table(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("march_friday", rows), &table, |b, table| {
            b.iter(|| filter(black_box(table), "march", "friday"))
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let table = synthetic_table(100_000);
    group.throughput(Throughput::Elements(table.row_count() as u64));

    group.bench_function("time_stats", |b| b.iter(|| time_stats(black_box(&table))));
    group.bench_function("station_stats", |b| {
        b.iter(|| station_stats(black_box(&table)))
    });
    group.bench_function("duration_stats", |b| {
        b.iter(|| duration_stats(black_box(&table)))
    });
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let table = synthetic_table(100_000);
    let with_figures = AnalysisEngine::default();
    let stats_only = AnalysisEngine::new(AnalysisOptions { figures: false });

    let mut group = c.benchmark_group("engine");
    group.bench_function("stats_only", |b| b.iter(|| stats_only.run(black_box(&table))));
    group.bench_function("with_figures", |b| {
        b.iter(|| with_figures.run(black_box(&table)))
    });
    group.finish();
}

criterion_group!(benches, bench_filter, bench_aggregate, bench_engine);
criterion_main!(benches);
