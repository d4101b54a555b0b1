//! Subscription client: property events, no request pools.

use crate::domain::{StubError, StubResult};
use crate::ports::{VehicleHal, VehicleHalCallback, VehicleHalEventCallback};
use std::sync::{Arc, Weak};
use tracing::{debug, error};
use vhal_types::{
    GetValueResults, HalPropValue, SetValueResults, SubscribeOptions, VehiclePropError,
    VehiclePropValue,
};

/// Subscribes to property changes on the VHAL the stub talks to and
/// forwards events to a `VehicleHalEventCallback`.
pub struct SubscriptionClient {
    hal: Arc<dyn VehicleHal>,
    events: Arc<dyn VehicleHalEventCallback>,
    this: Weak<SubscriptionClient>,
}

impl SubscriptionClient {
    pub fn new(hal: Arc<dyn VehicleHal>, events: Arc<dyn VehicleHalEventCallback>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            hal,
            events,
            this: this.clone(),
        })
    }

    pub fn subscribe(&self, options: Vec<SubscribeOptions>) -> StubResult<()> {
        debug!(count = options.len(), "Subscribing");
        self.hal.subscribe(self.as_hal_callback()?, options)?;
        Ok(())
    }

    pub fn unsubscribe(&self, prop_id: i32) -> StubResult<()> {
        debug!(prop_id, "Unsubscribing");
        self.hal.unsubscribe(self.as_hal_callback()?, vec![prop_id])?;
        Ok(())
    }

    fn as_hal_callback(&self) -> StubResult<Arc<dyn VehicleHalCallback>> {
        let this = self
            .this
            .upgrade()
            .ok_or_else(|| StubError::illegal_state("subscription client already dropped"))?;
        Ok(this)
    }
}

impl VehicleHalCallback for SubscriptionClient {
    fn on_get_values(&self, results: GetValueResults) {
        error!(
            count = results.payloads.len(),
            "on_get_values must never be called for a subscription client"
        );
    }

    fn on_set_values(&self, results: SetValueResults) {
        error!(
            count = results.payloads.len(),
            "on_set_values must never be called for a subscription client"
        );
    }

    fn on_property_event(&self, values: Vec<VehiclePropValue>) {
        self.events
            .on_property_event(values.into_iter().map(HalPropValue::from).collect());
    }

    fn on_property_set_error(&self, errors: Vec<VehiclePropError>) {
        self.events.on_property_set_error(errors);
    }
}
