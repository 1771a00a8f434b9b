use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::error::SubscriptionError;
use crate::event::{EventBus, Sample, Unlisten};

/// Decoded samples waiting to be pushed into the window, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct SampleInbox(Rc<RefCell<VecDeque<Sample>>>);

impl SampleInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, sample: Sample) {
        self.0.borrow_mut().push_back(sample);
    }

    pub fn drain(&self) -> Vec<Sample> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn downgrade(&self) -> Weak<RefCell<VecDeque<Sample>>> {
        Rc::downgrade(&self.0)
    }
}

/// Ownership token for the one open channel listener of a chart.
/// Dropping it releases the listener.
#[derive(Debug)]
pub struct SubscriptionHandle {
    unlisten: Unlisten,
}

impl SubscriptionHandle {
    pub fn channel(&self) -> &str {
        self.unlisten.channel()
    }

    fn release(self) -> bool {
        self.unlisten.unlisten()
    }
}

/// Holds at most one live subscription.
#[derive(Debug, Default)]
pub struct Subscription {
    handle: Option<SubscriptionHandle>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        self.handle.as_ref()
    }

    /// Starts forwarding decoded samples from `channel` into `inbox`.
    ///
    /// Fails without touching the current subscription if one is already
    /// active. Malformed payloads are dropped inside the listener.
    pub fn activate(
        &mut self,
        bus: &EventBus,
        channel: &str,
        inbox: &SampleInbox,
    ) -> Result<&SubscriptionHandle, SubscriptionError> {
        if let Some(handle) = &self.handle {
            return Err(SubscriptionError::AlreadyActive(handle.channel().to_owned()));
        }

        // Weak, so a late delivery can never outlive the chart's state.
        let inbox = inbox.downgrade();
        let unlisten = bus.listen(channel, move |event| {
            match Sample::decode(&event.payload) {
                Ok(sample) => {
                    if let Some(inbox) = inbox.upgrade() {
                        inbox.borrow_mut().push_back(sample);
                    }
                }
                Err(err) => debug!("Dropped event on `{}`: {err}", event.channel),
            }
        })?;

        info!("Subscribed to `{channel}`");
        Ok(&*self.handle.insert(SubscriptionHandle { unlisten }))
    }

    /// Releases the active subscription. Returns `false` when there was
    /// nothing to release.
    pub fn deactivate(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                info!("Unsubscribed from `{}`", handle.channel());
                handle.release();
                true
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CpuStat, SingleCpu};
    use serde_json::json;

    fn stat(usage: f32) -> CpuStat {
        CpuStat {
            cpu: SingleCpu {
                usage,
                frequency: 0,
            },
            cpus: Vec::new(),
        }
    }

    #[test]
    fn forwards_decoded_samples() {
        let bus = EventBus::new();
        let emitter = bus.open_channel("cpu");
        let inbox = SampleInbox::new();
        let mut subscription = Subscription::new();

        subscription.activate(&bus, "cpu", &inbox).unwrap();
        emitter.emit(&stat(12.0)).unwrap();
        emitter.emit(&stat(34.0)).unwrap();
        bus.pump();

        assert_eq!(inbox.drain(), vec![Sample::new(12.0), Sample::new(34.0)]);
    }

    #[test]
    fn second_activation_is_rejected() {
        let bus = EventBus::new();
        bus.open_channel("cpu");
        let inbox = SampleInbox::new();
        let mut subscription = Subscription::new();

        subscription.activate(&bus, "cpu", &inbox).unwrap();
        let err = subscription.activate(&bus, "cpu", &inbox).unwrap_err();

        assert!(matches!(err, SubscriptionError::AlreadyActive(_)));
        assert!(subscription.is_active());
        assert_eq!(bus.listener_count("cpu"), 1);
    }

    #[test]
    fn reactivation_after_deactivate_leaves_one_listener() {
        let bus = EventBus::new();
        bus.open_channel("cpu");
        let inbox = SampleInbox::new();
        let mut subscription = Subscription::new();

        subscription.activate(&bus, "cpu", &inbox).unwrap();
        assert!(subscription.deactivate());
        assert_eq!(bus.listener_count("cpu"), 0);

        subscription.activate(&bus, "cpu", &inbox).unwrap();
        assert!(subscription.is_active());
        assert_eq!(bus.listener_count("cpu"), 1);
    }

    #[test]
    fn deactivate_without_activate_is_a_no_op() {
        let mut subscription = Subscription::new();
        assert!(!subscription.deactivate());
        assert!(!subscription.is_active());
    }

    #[test]
    fn unavailable_channel_is_reported() {
        let bus = EventBus::new();
        let inbox = SampleInbox::new();
        let mut subscription = Subscription::new();

        let err = subscription.activate(&bus, "cpu", &inbox).unwrap_err();
        assert!(matches!(err, SubscriptionError::Channel(_)));
        assert!(!subscription.is_active());
    }

    #[test]
    fn malformed_payload_leaves_inbox_untouched() {
        let bus = EventBus::new();
        let emitter = bus.open_channel("cpu");
        let inbox = SampleInbox::new();
        let mut subscription = Subscription::new();
        subscription.activate(&bus, "cpu", &inbox).unwrap();

        emitter.emit_value(json!({ "cpus": [] })).unwrap();
        emitter.emit_value(json!({ "cpu": { "usage": "n/a" } })).unwrap();
        bus.pump();

        assert!(inbox.is_empty());
        assert!(subscription.is_active());
    }

    #[test]
    fn dropping_the_subscription_releases_the_listener() {
        let bus = EventBus::new();
        bus.open_channel("cpu");
        let inbox = SampleInbox::new();
        {
            let mut subscription = Subscription::new();
            subscription.activate(&bus, "cpu", &inbox).unwrap();
            assert_eq!(bus.listener_count("cpu"), 1);
        }
        assert_eq!(bus.listener_count("cpu"), 0);
    }

    #[test]
    fn events_after_inbox_is_gone_are_dropped() {
        let bus = EventBus::new();
        let emitter = bus.open_channel("cpu");
        let mut subscription = Subscription::new();
        let inbox = SampleInbox::new();
        subscription.activate(&bus, "cpu", &inbox).unwrap();

        drop(inbox);
        emitter.emit(&stat(50.0)).unwrap();
        // The listener still runs but has nowhere to write.
        assert_eq!(bus.pump(), 1);
    }
}
