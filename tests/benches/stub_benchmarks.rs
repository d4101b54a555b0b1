//! # Vehicle Stub Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | Request ids | Atomic id generation |
//! | Async batch | Register, send, match results, flush to client |
//! | Sync round trip | One blocking get against a replying VHAL |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use vehicle_stub::testing::{AutoReply, FakeVehicleHal, RecordingCallback};
use vehicle_stub::{AsyncGetSetRequest, RequestIdGenerator, StubConfig, VehicleStub, VehicleStubApi};
use vhal_types::{GetValueResult, HalPropValue, VehiclePropValue};

const PERF_VEHICLE_SPEED: i32 = 0x1160_0207;

// ============================================================================
// Request ids
// ============================================================================

fn bench_request_ids(c: &mut Criterion) {
    let ids = RequestIdGenerator::new();
    c.bench_function("request_id_next", |b| b.iter(|| black_box(ids.next_id())));
}

// ============================================================================
// Async batch: results delivered on the calling thread
// ============================================================================

fn bench_async_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("async-get-batch");
    group.measurement_time(Duration::from_secs(5));

    for size in [1, 10, 100] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("round_trip", size), &size, |b, &size| {
            let hal = FakeVehicleHal::new();
            let stub = VehicleStub::new(hal.clone(), StubConfig::default())
                .expect("default config is valid");
            let (callback, mut rx) = RecordingCallback::new();

            b.iter(|| {
                let deadline = Instant::now() + Duration::from_secs(60);
                let requests = (0..size)
                    .map(|id| {
                        AsyncGetSetRequest::new(id, HalPropValue::new(PERF_VEHICLE_SPEED, 0), deadline)
                    })
                    .collect();
                stub.get_async(requests, callback.clone())
                    .expect("client is alive");

                let batch = hal.take_get_batches().pop().expect("batch recorded");
                let results = batch
                    .payloads
                    .iter()
                    .map(|r| GetValueResult::ok(r.request_id, VehiclePropValue::new(PERF_VEHICLE_SPEED, 0)))
                    .collect();
                hal.deliver_get_results(results);
                black_box(rx.try_recv().expect("results flushed"));
            });
        });
    }

    group.finish();
}

// ============================================================================
// Sync round trip: replies arrive from another thread
// ============================================================================

fn bench_sync_get(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let hal = FakeVehicleHal::with_auto_reply(AutoReply::Echo);
    let stub = VehicleStub::new(hal, StubConfig::default()).expect("default config is valid");
    let request = HalPropValue::new(PERF_VEHICLE_SPEED, 0);

    c.bench_function("sync_get_round_trip", |b| {
        b.iter(|| black_box(runtime.block_on(stub.get(&request)).expect("echoed")))
    });
}

criterion_group!(benches, bench_request_ids, bench_async_batch, bench_sync_get);
criterion_main!(benches);
