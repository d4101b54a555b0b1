//! Centralized Testing Utilities
//!
//! In-memory stand-ins for the remote VHAL and for client callbacks. Available
//! to this crate's tests and, with the `test-utils` feature, to other crates.

use crate::domain::{GetVehicleStubAsyncResult, SetVehicleStubAsyncResult, StubError, StubResult};
use crate::ports::{
    DeathRecipient, HalDeathRecipient, VehicleHal, VehicleHalCallback, VehicleHalEventCallback,
    VehicleStubCallback,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use vhal_types::{
    GetValueRequests, GetValueResult, HalError, HalPropValue, RequestId, SetValueRequests,
    SetValueResult, StatusCode, SubscribeOptions, VehiclePropConfig, VehiclePropError,
    VehiclePropValue,
};

/// Descriptor reported by `FakeVehicleHal`.
pub const FAKE_INTERFACE_DESCRIPTOR: &str = "android.hardware.automotive.vehicle.IVehicle";

/// How `FakeVehicleHal` answers batches on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoReply {
    /// Record batches only; tests deliver results by hand.
    Never,
    /// Reply OK from a separate thread. Gets return the last value set for
    /// the property/area, or echo the request.
    Echo,
    /// Reply with this status, and no value, from a separate thread.
    Status(StatusCode),
}

#[derive(Default)]
struct FakeState {
    get_batches: Vec<GetValueRequests>,
    set_batches: Vec<SetValueRequests>,
    callback: Option<Arc<dyn VehicleHalCallback>>,
    send_error: Option<HalError>,
    dead: bool,
    death_recipients: Vec<HalDeathRecipient>,
    subscriptions: Vec<SubscribeOptions>,
    prop_configs: Vec<VehiclePropConfig>,
    values: HashMap<(i32, i32), VehiclePropValue>,
}

/// In-memory VHAL recording every call.
pub struct FakeVehicleHal {
    state: Mutex<FakeState>,
    auto_reply: Mutex<AutoReply>,
}

impl FakeVehicleHal {
    pub fn new() -> Arc<Self> {
        Self::with_auto_reply(AutoReply::Never)
    }

    pub fn with_auto_reply(auto_reply: AutoReply) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState::default()),
            auto_reply: Mutex::new(auto_reply),
        })
    }

    pub fn set_auto_reply(&self, auto_reply: AutoReply) {
        *self.auto_reply.lock() = auto_reply;
    }

    /// Make every following `get_values`/`set_values` fail with `error`.
    pub fn fail_sends_with(&self, error: Option<HalError>) {
        self.state.lock().send_error = error;
    }

    pub fn set_prop_configs(&self, configs: Vec<VehiclePropConfig>) {
        self.state.lock().prop_configs = configs;
    }

    pub fn get_batches(&self) -> Vec<GetValueRequests> {
        self.state.lock().get_batches.clone()
    }

    pub fn set_batches(&self) -> Vec<SetValueRequests> {
        self.state.lock().set_batches.clone()
    }

    /// Drain the recorded get batches.
    pub fn take_get_batches(&self) -> Vec<GetValueRequests> {
        std::mem::take(&mut self.state.lock().get_batches)
    }

    /// Request ids of every get sent so far, in send order.
    pub fn get_request_ids(&self) -> Vec<RequestId> {
        self.state
            .lock()
            .get_batches
            .iter()
            .flat_map(|batch| batch.payloads.iter().map(|r| r.request_id))
            .collect()
    }

    /// Request ids of every set sent so far, in send order.
    pub fn set_request_ids(&self) -> Vec<RequestId> {
        self.state
            .lock()
            .set_batches
            .iter()
            .flat_map(|batch| batch.payloads.iter().map(|r| r.request_id))
            .collect()
    }

    pub fn subscribed_prop_ids(&self) -> Vec<i32> {
        self.state
            .lock()
            .subscriptions
            .iter()
            .map(|o| o.prop_id)
            .collect()
    }

    /// The callback passed with the most recent batch or subscription.
    pub fn callback(&self) -> Option<Arc<dyn VehicleHalCallback>> {
        self.state.lock().callback.clone()
    }

    /// Deliver get results on the calling thread.
    pub fn deliver_get_results(&self, results: Vec<GetValueResult>) {
        if let Some(callback) = self.callback() {
            callback.on_get_values(results.into());
        }
    }

    /// Deliver set results on the calling thread.
    pub fn deliver_set_results(&self, results: Vec<SetValueResult>) {
        if let Some(callback) = self.callback() {
            callback.on_set_values(results.into());
        }
    }

    /// Simulate the VHAL process dying.
    pub fn kill(&self) {
        let recipients = {
            let mut state = self.state.lock();
            state.dead = true;
            std::mem::take(&mut state.death_recipients)
        };
        for recipient in recipients {
            recipient();
        }
    }

    fn check_alive(state: &FakeState) -> Result<(), HalError> {
        if state.dead {
            Err(HalError::remote("VHAL process died"))
        } else {
            Ok(())
        }
    }

    fn reply_get(&self, callback: Arc<dyn VehicleHalCallback>, requests: &GetValueRequests) {
        let mode = *self.auto_reply.lock();
        let results: Vec<GetValueResult> = match mode {
            AutoReply::Never => return,
            AutoReply::Echo => {
                let state = self.state.lock();
                let results = requests
                    .payloads
                    .iter()
                    .map(|r| {
                        let value = state
                            .values
                            .get(&(r.prop.prop, r.prop.area_id))
                            .cloned()
                            .unwrap_or_else(|| r.prop.clone());
                        GetValueResult::ok(r.request_id, value)
                    })
                    .collect();
                results
            }
            AutoReply::Status(status) => requests
                .payloads
                .iter()
                .map(|r| GetValueResult::status_only(r.request_id, status))
                .collect(),
        };
        thread::spawn(move || callback.on_get_values(results.into()));
    }

    fn reply_set(&self, callback: Arc<dyn VehicleHalCallback>, requests: &SetValueRequests) {
        let mode = *self.auto_reply.lock();
        let status = match mode {
            AutoReply::Never => return,
            AutoReply::Echo => {
                let mut state = self.state.lock();
                for r in &requests.payloads {
                    state
                        .values
                        .insert((r.value.prop, r.value.area_id), r.value.clone());
                }
                StatusCode::Ok
            }
            AutoReply::Status(status) => status,
        };
        let results: Vec<SetValueResult> = requests
            .payloads
            .iter()
            .map(|r| SetValueResult::new(r.request_id, status))
            .collect();
        thread::spawn(move || callback.on_set_values(results.into()));
    }
}

impl VehicleHal for FakeVehicleHal {
    fn get_values(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        requests: GetValueRequests,
    ) -> Result<(), HalError> {
        {
            let mut state = self.state.lock();
            Self::check_alive(&state)?;
            if let Some(error) = state.send_error.clone() {
                return Err(error);
            }
            state.get_batches.push(requests.clone());
            state.callback = Some(Arc::clone(&callback));
        }
        self.reply_get(callback, &requests);
        Ok(())
    }

    fn set_values(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        requests: SetValueRequests,
    ) -> Result<(), HalError> {
        {
            let mut state = self.state.lock();
            Self::check_alive(&state)?;
            if let Some(error) = state.send_error.clone() {
                return Err(error);
            }
            state.set_batches.push(requests.clone());
            state.callback = Some(Arc::clone(&callback));
        }
        self.reply_set(callback, &requests);
        Ok(())
    }

    fn get_all_prop_configs(&self) -> Result<Vec<VehiclePropConfig>, HalError> {
        let state = self.state.lock();
        Self::check_alive(&state)?;
        Ok(state.prop_configs.clone())
    }

    fn interface_descriptor(&self) -> Result<String, HalError> {
        Self::check_alive(&self.state.lock())?;
        Ok(FAKE_INTERFACE_DESCRIPTOR.to_string())
    }

    fn is_alive(&self) -> bool {
        !self.state.lock().dead
    }

    fn link_to_death(&self, recipient: HalDeathRecipient) -> Result<(), HalError> {
        let mut state = self.state.lock();
        Self::check_alive(&state)?;
        state.death_recipients.push(recipient);
        Ok(())
    }

    fn unlink_to_death(&self, recipient: &HalDeathRecipient) -> Result<(), HalError> {
        let mut state = self.state.lock();
        let before = state.death_recipients.len();
        state
            .death_recipients
            .retain(|linked| !Arc::ptr_eq(linked, recipient));
        if state.death_recipients.len() == before {
            return Err(HalError::remote("recipient was not linked"));
        }
        Ok(())
    }

    fn dump(&self, out: &mut dyn Write, args: &[String]) -> Result<(), HalError> {
        writeln!(out, "FakeVehicleHal dump args: {}", args.join(" "))
            .map_err(|e| HalError::remote(e.to_string()))
    }

    fn subscribe(
        &self,
        callback: Arc<dyn VehicleHalCallback>,
        options: Vec<SubscribeOptions>,
    ) -> Result<(), HalError> {
        let mut state = self.state.lock();
        Self::check_alive(&state)?;
        state.subscriptions.extend(options);
        state.callback = Some(callback);
        Ok(())
    }

    fn unsubscribe(
        &self,
        _callback: Arc<dyn VehicleHalCallback>,
        prop_ids: Vec<i32>,
    ) -> Result<(), HalError> {
        let mut state = self.state.lock();
        Self::check_alive(&state)?;
        state
            .subscriptions
            .retain(|options| !prop_ids.contains(&options.prop_id));
        Ok(())
    }
}

/// Everything a `RecordingCallback` was called with.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    GetResults(Vec<GetVehicleStubAsyncResult>),
    SetResults(Vec<SetVehicleStubAsyncResult>),
    Timeout(Vec<i32>),
}

/// Client callback that records every call onto a channel.
pub struct RecordingCallback {
    events: mpsc::UnboundedSender<CallbackEvent>,
    death_recipients: Mutex<Vec<DeathRecipient>>,
    dead: AtomicBool,
    fail_link: AtomicBool,
}

impl RecordingCallback {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<CallbackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = Arc::new(Self {
            events: tx,
            death_recipients: Mutex::new(Vec::new()),
            dead: AtomicBool::new(false),
            fail_link: AtomicBool::new(false),
        });
        (callback, rx)
    }

    /// Make `link_to_death` fail while the client is still alive.
    pub fn fail_link_to_death(&self, fail: bool) {
        self.fail_link.store(fail, Ordering::SeqCst);
    }

    /// Simulate the client process dying; runs its death recipients here.
    pub fn die(&self) {
        self.dead.store(true, Ordering::SeqCst);
        let recipients = std::mem::take(&mut *self.death_recipients.lock());
        for recipient in recipients {
            recipient();
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    pub fn linked_recipients(&self) -> usize {
        self.death_recipients.lock().len()
    }

    fn record(&self, event: CallbackEvent) {
        // The test may have dropped its receiver.
        let _ = self.events.send(event);
    }
}

impl VehicleStubCallback for RecordingCallback {
    fn on_get_async_results(&self, results: Vec<GetVehicleStubAsyncResult>) {
        self.record(CallbackEvent::GetResults(results));
    }

    fn on_set_async_results(&self, results: Vec<SetVehicleStubAsyncResult>) {
        self.record(CallbackEvent::SetResults(results));
    }

    fn on_requests_timeout(&self, service_request_ids: Vec<i32>) {
        self.record(CallbackEvent::Timeout(service_request_ids));
    }

    fn link_to_death(&self, recipient: DeathRecipient) -> StubResult<()> {
        if self.is_dead() || self.fail_link.load(Ordering::SeqCst) {
            return Err(StubError::Remote("client is dead".into()));
        }
        self.death_recipients.lock().push(recipient);
        Ok(())
    }
}

/// Everything an `EventRecorder` was called with.
#[derive(Debug, Clone, PartialEq)]
pub enum HalEvent {
    PropertyEvent(Vec<HalPropValue>),
    SetError(Vec<VehiclePropError>),
}

/// Event callback that records every call onto a channel.
pub struct EventRecorder {
    events: mpsc::UnboundedSender<HalEvent>,
}

impl EventRecorder {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<HalEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { events: tx }), rx)
    }
}

impl VehicleHalEventCallback for EventRecorder {
    fn on_property_event(&self, values: Vec<HalPropValue>) {
        let _ = self.events.send(HalEvent::PropertyEvent(values));
    }

    fn on_property_set_error(&self, errors: Vec<VehiclePropError>) {
        let _ = self.events.send(HalEvent::SetError(errors));
    }
}
