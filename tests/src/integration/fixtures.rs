//! Shared builders for the integration flows.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use vehicle_stub::testing::{AutoReply, CallbackEvent, FakeVehicleHal};
use vehicle_stub::{AsyncGetSetRequest, StubConfig, VehicleStub};
use vhal_types::HalPropValue;

/// HVAC_TEMPERATURE_SET
pub const HVAC_TEMPERATURE_SET: i32 = 0x1140_0503;
/// PERF_VEHICLE_SPEED
pub const PERF_VEHICLE_SPEED: i32 = 0x1160_0207;
/// Driver-side seat area
pub const SEAT_ROW_1_LEFT: i32 = 0x0001;

/// Upper bound for anything a test waits on.
pub const PATIENCE: Duration = Duration::from_secs(5);

/// A stub over a fresh fake VHAL.
pub fn stub_with(auto_reply: AutoReply) -> (Arc<VehicleStub>, Arc<FakeVehicleHal>) {
    vhal_telemetry::init_test_logging();
    let hal = FakeVehicleHal::with_auto_reply(auto_reply);
    let stub = VehicleStub::new(hal.clone(), StubConfig::default())
        .expect("default config is valid");
    (Arc::new(stub), hal)
}

pub fn hvac_value(celsius: f32) -> HalPropValue {
    HalPropValue::new(HVAC_TEMPERATURE_SET, SEAT_ROW_1_LEFT).with_float_values(vec![celsius])
}

pub fn speed_request() -> HalPropValue {
    HalPropValue::new(PERF_VEHICLE_SPEED, 0)
}

/// Async requests `first..first + count`, all sharing `deadline`.
pub fn requests_with_deadline(first: i32, count: i32, deadline: Instant) -> Vec<AsyncGetSetRequest> {
    (first..first + count)
        .map(|id| AsyncGetSetRequest::new(id, speed_request(), deadline))
        .collect()
}

/// Async requests that will not time out during a test.
pub fn long_lived_requests(first: i32, count: i32) -> Vec<AsyncGetSetRequest> {
    requests_with_deadline(first, count, Instant::now() + Duration::from_secs(60))
}

/// Poll `condition` until it holds, panicking after `PATIENCE`.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let started = Instant::now();
    while !condition() {
        assert!(started.elapsed() < PATIENCE, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Next callback event, panicking after `PATIENCE`.
pub async fn next_event(rx: &mut UnboundedReceiver<CallbackEvent>) -> CallbackEvent {
    within(rx.recv())
        .await
        .expect("callback channel closed")
}

/// Assert no callback event arrives during `window`.
pub async fn assert_quiet(rx: &mut UnboundedReceiver<CallbackEvent>, window: Duration) {
    if let Ok(Some(event)) = tokio::time::timeout(window, rx.recv()).await {
        panic!("unexpected callback event: {event:?}");
    }
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(PATIENCE, future)
        .await
        .expect("timed out waiting")
}
