//! Dedup window and dispatch benchmarks.
//!
//! - Steady event stream into windows of different sizes
//! - Full frame dispatch (parse, dedup, handler, acknowledgement)
//!
//! Run with: cargo bench --bench dedup_window
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

use socket_mode_bot::dispatch::{EventDeduplicator, EventDispatcher, NoopHandler};
use socket_mode_bot::identifiers::ConnectionId;

// ============================================================================
// Benchmark Parameters
// ============================================================================

/// Ids already held in the window before measuring.
const WINDOW_SIZES: &[usize] = &[100, 1_000, 10_000];

/// Events per second of `event_time` in the simulated stream.
const EVENTS_PER_SEC: i64 = 20;

const NOW: i64 = 1_700_000_000;

// ============================================================================
// Benchmark: Observe
// ============================================================================

fn bench_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe");
    group.throughput(Throughput::Elements(1));

    for &size in WINDOW_SIZES {
        group.bench_with_input(BenchmarkId::new("new_event", size), &size, |b, &size| {
            let mut dedup = filled(size);
            let mut n = size as i64;
            b.iter(|| {
                n += 1;
                let now = NOW + n / EVENTS_PER_SEC;
                black_box(dedup.observe(&format!("Ev{n}"), now, now))
            });
        });

        group.bench_with_input(BenchmarkId::new("duplicate", size), &size, |b, &size| {
            let mut dedup = filled(size);
            let now = NOW + size as i64 / EVENTS_PER_SEC;
            b.iter(|| black_box(dedup.observe("Ev0", now, now)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let connection = ConnectionId::next();

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("event_frame", |b| {
        let mut dispatcher = EventDispatcher::new(Arc::new(NoopHandler));
        let mut n = 0_i64;
        b.iter(|| {
            n += 1;
            let frame = event_frame(n);
            black_box(rt.block_on(dispatcher.dispatch_at(connection, &frame, NOW)))
        });
    });

    group.bench_function("hello_frame", |b| {
        let mut dispatcher = EventDispatcher::new(Arc::new(NoopHandler));
        let frame = json!({"type": "hello"}).to_string();
        b.iter(|| black_box(rt.block_on(dispatcher.dispatch_at(connection, &frame, NOW))));
    });

    group.finish();
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Window holding `size` ids spread over the stream's recent past.
fn filled(size: usize) -> EventDeduplicator {
    let mut dedup = EventDeduplicator::new();
    for i in 0..size as i64 {
        dedup.record(format!("Ev{i}"), NOW + i / EVENTS_PER_SEC);
    }
    dedup
}

fn event_frame(n: i64) -> String {
    let frame: Value = json!({
        "type": "events_api",
        "envelope_id": format!("E{n}"),
        "accepts_response_payload": false,
        "payload": {
            "type": "event_callback",
            "event_id": format!("Ev{n}"),
            "event_time": NOW,
            "event": {"type": "message", "channel": "C1", "text": "hello"}
        }
    });
    frame.to_string()
}

criterion_group!(benches, bench_observe, bench_dispatch);
criterion_main!(benches);
