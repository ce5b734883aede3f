use chrono::{Duration, FixedOffset, TimeZone};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dotaudit::diff::diff_snapshots;
use dotaudit::storage::{EventFilters, EventWriter, FileOperation, JsonlEventLog, Scope};
use dotaudit::tracking::Snapshot;
use dotaudit::utils::hash::hash_bytes;
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::tempdir;

fn snapshot(body: &str) -> Snapshot {
    Snapshot::new(hash_bytes(body.as_bytes()), body.len() as u64, Some(body.to_string()))
}

fn populate(log: &JsonlEventLog, count: usize) {
    let offset = FixedOffset::east_opt(0).unwrap();
    let start = offset.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    for i in 0..count {
        let before = snapshot(&format!("{{\"version\":{i},\"plugins\":[\"fmt\"]}}"));
        let after = snapshot(&format!("{{\"version\":{},\"plugins\":[\"fmt\",\"lint\"]}}", i + 1));
        let scope = if i % 3 == 0 { Scope::Project } else { Scope::User };
        let event = FileOperation::new(
            if i % 2 == 0 { "plugin install" } else { "profile apply" },
            PathBuf::from(format!("/home/user/.config/app/file_{}.json", i % 25)),
            scope,
            Some(before),
            Some(after),
        )
        .with_timestamp(start + Duration::minutes(i as i64));
        log.write(&event).unwrap();
    }
}

fn benchmark_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_log_query");

    for count in &[100, 1000, 10000] {
        let dir = tempdir().unwrap();
        let log = JsonlEventLog::open(dir.path().join("events.jsonl")).unwrap();
        populate(&log, *count);

        group.bench_with_input(BenchmarkId::new("all", count), &log, |b, log| {
            b.iter(|| log.query(black_box(&EventFilters::new())));
        });

        let filtered = EventFilters::new()
            .with_scope(Scope::Project)
            .with_operation("plugin")
            .with_limit(20);
        group.bench_with_input(BenchmarkId::new("filtered_limit_20", count), &log, |b, log| {
            b.iter(|| log.query(black_box(&filtered)));
        });
    }

    group.finish();
}

fn benchmark_append(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let log = JsonlEventLog::open(dir.path().join("events.jsonl")).unwrap();
    let event = FileOperation::new(
        "settings edit",
        PathBuf::from("/home/user/.config/app/settings.json"),
        Scope::User,
        Some(snapshot("{\"theme\":\"dark\"}")),
        Some(snapshot("{\"theme\":\"light\"}")),
    );

    c.bench_function("event_log_append", |b| b.iter(|| log.write(black_box(&event))));
}

fn benchmark_diff(c: &mut Criterion) {
    let items: Vec<String> = (0..500).map(|i| format!("\"item_{i}\"")).collect();
    let before = snapshot(&format!("{{\"items\":[{}],\"nested\":{{\"a\":{{\"b\":1}}}}}}", items[..250].join(",")));
    let after = snapshot(&format!("{{\"items\":[{}],\"nested\":{{\"a\":{{\"b\":2}}}}}}", items.join(",")));

    let mut group = c.benchmark_group("structural_diff");
    group.bench_function("truncated", |b| {
        b.iter(|| diff_snapshots(black_box(Some(&before)), black_box(Some(&after)), false));
    });
    group.bench_function("full", |b| {
        b.iter(|| diff_snapshots(black_box(Some(&before)), black_box(Some(&after)), true));
    });
    group.finish();
}

criterion_group!(benches, benchmark_query, benchmark_append, benchmark_diff);
criterion_main!(benches);
