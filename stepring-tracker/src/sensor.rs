//! A step sensor driven through method calls.
//!
//! [`ChannelSensor`] implements [`StepSensor`] without hardware: callers
//! decide availability, permission and history support, and push steps with
//! [`ChannelSensor::walk`]. The CLI replays scripts through it and tests use
//! it to drive the tracker deterministically.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use stepring_core::{
    PermissionStatus, SensorError, SensorSubscription, StepEvent, StepSensor, SubscriptionId,
};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Call counters, for asserting which capability calls were made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorCalls {
    /// `is_available` calls.
    pub availability_checks: u32,
    /// `request_permission` calls.
    pub permission_requests: u32,
    /// `query_range` calls.
    pub range_queries: u32,
    /// `subscribe` calls.
    pub subscribes: u32,
    /// `unsubscribe` calls.
    pub unsubscribes: u32,
}

#[derive(Debug)]
struct Subscriber {
    sender: mpsc::UnboundedSender<StepEvent>,
    observed: u64,
}

#[derive(Debug)]
struct SensorState {
    available: Result<bool, SensorError>,
    permission: Result<PermissionStatus, SensorError>,
    history: Result<u64, SensorError>,
    subscribe_error: Option<SensorError>,
    next_id: u64,
    subscribers: HashMap<SubscriptionId, Subscriber>,
    calls: SensorCalls,
}

/// Scriptable in-process step sensor.
#[derive(Debug)]
pub struct ChannelSensor {
    state: Mutex<SensorState>,
    held: watch::Sender<bool>,
    waiting: AtomicUsize,
}

impl Default for ChannelSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSensor {
    /// Available, permission granted, no history support.
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        Self {
            state: Mutex::new(SensorState {
                available: Ok(true),
                permission: Ok(PermissionStatus::Granted),
                history: Err(SensorError::Unsupported("step history".to_string())),
                subscribe_error: None,
                next_id: 1,
                subscribers: HashMap::new(),
                calls: SensorCalls::default(),
            }),
            held,
            waiting: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, SensorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets what `is_available` reports.
    pub fn set_available(&self, available: bool) {
        self.state().available = Ok(available);
    }

    /// Makes `is_available` fail.
    pub fn fail_availability(&self, error: SensorError) {
        self.state().available = Err(error);
    }

    /// Sets what `request_permission` reports.
    pub fn set_permission(&self, status: PermissionStatus) {
        self.state().permission = Ok(status);
    }

    /// Enables history queries, reporting `total` steps for today.
    ///
    /// Later [`walk`](Self::walk) calls add to it.
    pub fn set_history(&self, total: u64) {
        self.state().history = Ok(total);
    }

    /// Makes history queries fail with `error`.
    pub fn set_history_error(&self, error: SensorError) {
        self.state().history = Err(error);
    }

    /// Makes `subscribe` fail with `error` (or succeed again with `None`).
    pub fn set_subscribe_error(&self, error: Option<SensorError>) {
        self.state().subscribe_error = error;
    }

    /// Records `steps` new steps and delivers the updated cumulative count to
    /// every open subscription. Returns how many subscriptions received it.
    pub fn walk(&self, steps: u64) -> usize {
        let mut state = self.state();
        if let Ok(total) = state.history.as_mut() {
            *total = total.saturating_add(steps);
        }
        let mut delivered = 0;
        state.subscribers.retain(|id, sub| {
            sub.observed = sub.observed.saturating_add(steps);
            if sub.sender.send(StepEvent::new(sub.observed)).is_ok() {
                delivered += 1;
                true
            } else {
                debug!(subscription = %id, "Dropping closed subscription");
                false
            }
        });
        delivered
    }

    /// Delivers a raw cumulative count to every open subscription without
    /// touching history.
    pub fn emit(&self, cumulative: u64) -> usize {
        let mut state = self.state();
        let mut delivered = 0;
        for sub in state.subscribers.values_mut() {
            sub.observed = cumulative;
            if sub.sender.send(StepEvent::new(cumulative)).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Blocks `is_available` callers until [`release`](Self::release).
    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    /// Unblocks held `is_available` callers.
    pub fn release(&self) {
        self.held.send_replace(false);
    }

    /// Number of callers currently blocked by [`hold`](Self::hold).
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Number of open subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.state().subscribers.len()
    }

    /// Call counters so far.
    pub fn calls(&self) -> SensorCalls {
        self.state().calls
    }
}

#[async_trait]
impl StepSensor for ChannelSensor {
    async fn is_available(&self) -> Result<bool, SensorError> {
        self.state().calls.availability_checks += 1;

        let mut held = self.held.subscribe();
        if *held.borrow() {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let _ = held.wait_for(|held| !*held).await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }

        self.state().available.clone()
    }

    async fn request_permission(&self) -> Result<PermissionStatus, SensorError> {
        let mut state = self.state();
        state.calls.permission_requests += 1;
        state.permission.clone()
    }

    async fn query_range(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<u64, SensorError> {
        let mut state = self.state();
        state.calls.range_queries += 1;
        debug!(start = %start, end = %end, "Range query");
        state.history.clone()
    }

    async fn subscribe(&self) -> Result<SensorSubscription, SensorError> {
        let mut state = self.state();
        state.calls.subscribes += 1;
        if let Some(error) = state.subscribe_error.clone() {
            return Err(error);
        }

        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        let (sender, events) = mpsc::unbounded_channel();
        state.subscribers.insert(id, Subscriber {
            sender,
            observed: 0,
        });
        debug!(subscription = %id, "Subscription opened");
        Ok(SensorSubscription::new(id, events))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut state = self.state();
        state.calls.unsubscribes += 1;
        if state.subscribers.remove(&id).is_some() {
            debug!(subscription = %id, "Subscription closed");
        }
    }
}
