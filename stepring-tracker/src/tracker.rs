//! Step session tracker.
//!
//! Bridges the motion sensor and the [`DailyCounterStore`] into one live step
//! total. A synchronization cycle loads today's baseline, optionally corrects
//! it from the sensor's same-day history, then opens a live subscription whose
//! events add only the steps counted since the subscription began.
//!
//! ## Concurrency
//!
//! - Synchronizations are single-flight: each takes a generation ticket and
//!   runs under `sync_lock`. A run whose ticket is no longer current after an
//!   await point stops without applying anything.
//! - At most one sensor subscription is open. It is closed before a new one
//!   is opened, on terminal failure, and on shutdown.
//! - Event pumps carry the ticket of the cycle that opened them and stop at
//!   the first event that arrives after that cycle was superseded.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use stepring_core::{
    Clock, SensorSubscription, StepEvent, StepSensor, StepSnapshot, SubscriptionId, TrackerError,
};
use stepring_store::DailyCounterStore;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::TrackerConfig;
use crate::lifecycle::AppLifecycle;

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Pending,
    Tracking,
    Failed(TrackerError),
}

#[derive(Debug)]
struct LiveSubscription {
    id: SubscriptionId,
    pump: JoinHandle<()>,
}

/// In-memory session state. Never persisted.
#[derive(Debug)]
struct Session {
    phase: Phase,
    /// Steps carried over from the store (or sensor history) at cycle start.
    baseline: u64,
    /// Sensor counter value treated as zero for this subscription.
    session_origin: Option<u64>,
    /// Published total: `baseline + (latest - session_origin)`.
    steps: u64,
    /// Day captured once per cycle; every write of this cycle uses it.
    day: Option<NaiveDate>,
    subscription: Option<LiveSubscription>,
}

impl Session {
    fn new() -> Self {
        Self {
            phase: Phase::Pending,
            baseline: 0,
            session_origin: None,
            steps: 0,
            day: None,
            subscription: None,
        }
    }

    fn snapshot(&self) -> StepSnapshot {
        match &self.phase {
            Phase::Pending => StepSnapshot::pending(self.steps),
            Phase::Tracking => StepSnapshot::tracking(self.steps),
            Phase::Failed(err @ TrackerError::CapabilityUnavailable) => {
                StepSnapshot::unavailable(self.steps, err.to_string())
            }
            Phase::Failed(err) => StepSnapshot::errored(self.steps, err.to_string()),
        }
    }
}

enum SyncOutcome {
    Tracking,
    Superseded,
}

// ============================================================================
// Step Tracker
// ============================================================================

/// Live step tracker.
///
/// Observable via a watch channel of [`StepSnapshot`]s.
pub struct StepTracker {
    sensor: Arc<dyn StepSensor>,
    store: DailyCounterStore,
    config: TrackerConfig,
    session: Mutex<Session>,
    sync_lock: Mutex<()>,
    generation: AtomicU64,
    shut_down: AtomicBool,
    state: watch::Sender<StepSnapshot>,
    lifecycle: StdMutex<Option<JoinHandle<()>>>,
}

impl StepTracker {
    /// Creates a tracker in the Pending state. Nothing runs until
    /// [`activate`](Self::activate).
    pub fn new(
        sensor: Arc<dyn StepSensor>,
        store: DailyCounterStore,
        config: TrackerConfig,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(StepSnapshot::default());
        Arc::new(Self {
            sensor,
            store,
            config,
            session: Mutex::new(Session::new()),
            sync_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            shut_down: AtomicBool::new(false),
            state,
            lifecycle: StdMutex::new(None),
        })
    }

    // ========================================================================
    // Observable
    // ========================================================================

    /// Subscribes to published state.
    pub fn subscribe(&self) -> watch::Receiver<StepSnapshot> {
        self.state.subscribe()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> StepSnapshot {
        self.state.borrow().clone()
    }

    /// The daily store this tracker writes to.
    pub fn store(&self) -> &DailyCounterStore {
        &self.store
    }

    /// Configuration in use.
    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Returns true once [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn clock(&self) -> &Arc<dyn Clock> {
        self.store.clock()
    }

    fn is_current(&self, ticket: u64) -> bool {
        !self.is_shut_down() && self.generation.load(Ordering::SeqCst) == ticket
    }

    fn publish(&self, session: &Session) {
        if self.is_shut_down() {
            return;
        }
        self.state.send_replace(session.snapshot());
    }

    fn close_subscription(&self, session: &mut Session) {
        if let Some(live) = session.subscription.take() {
            self.sensor.unsubscribe(live.id);
            live.pump.abort();
            debug!(subscription = %live.id, "Closed step subscription");
        }
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Runs the first synchronization.
    pub async fn activate(self: &Arc<Self>) {
        info!("Activating step tracker");
        self.synchronize().await;
    }

    /// Re-establishes the live total: availability, baseline, permission,
    /// history correction, then a fresh live subscription.
    ///
    /// Overlapping calls are serialized; a call superseded by a newer one
    /// discards its results.
    pub async fn synchronize(self: &Arc<Self>) {
        if self.is_shut_down() {
            return;
        }

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.sync_lock.lock().await;
        if !self.is_current(ticket) {
            debug!(ticket, "Synchronization superseded before it started");
            return;
        }

        match self.run_sync(ticket).await {
            Ok(SyncOutcome::Tracking) => {}
            Ok(SyncOutcome::Superseded) => {
                debug!(ticket, "Synchronization superseded, result discarded");
            }
            Err(err) => self.fail(ticket, err).await,
        }
    }

    async fn run_sync(self: &Arc<Self>, ticket: u64) -> Result<SyncOutcome, TrackerError> {
        {
            let mut session = self.session.lock().await;
            if !self.is_current(ticket) {
                return Ok(SyncOutcome::Superseded);
            }
            session.phase = Phase::Pending;
            self.publish(&session);
        }

        // 1. Capability
        let available = self.sensor.is_available().await.map_err(|e| {
            TrackerError::InitializationFailure(format!("availability check failed: {e}"))
        })?;
        if !self.is_current(ticket) {
            return Ok(SyncOutcome::Superseded);
        }
        if !available {
            return Err(TrackerError::CapabilityUnavailable);
        }

        // 2. Stored baseline, published before touching the sensor again
        let record = self.store.get_or_init_today().await;
        let day = record.date;
        {
            let mut session = self.session.lock().await;
            if !self.is_current(ticket) {
                return Ok(SyncOutcome::Superseded);
            }
            session.baseline = record.steps;
            session.steps = record.steps;
            session.day = Some(day);
            self.publish(&session);
        }
        debug!(date = %day, baseline = record.steps, "Baseline loaded from store");

        // 3. Permission
        let permission = self.sensor.request_permission().await.map_err(|e| {
            TrackerError::InitializationFailure(format!("permission request failed: {e}"))
        })?;
        if !self.is_current(ticket) {
            return Ok(SyncOutcome::Superseded);
        }
        if !permission.is_granted() {
            return Err(TrackerError::PermissionDenied);
        }

        // 4. Same-day authoritative total, if the device keeps history
        let start = self.clock().start_of_day(day);
        let end = self.clock().now();
        match self.sensor.query_range(start, end).await {
            Ok(total) => {
                {
                    let mut session = self.session.lock().await;
                    if !self.is_current(ticket) {
                        return Ok(SyncOutcome::Superseded);
                    }
                    session.baseline = total;
                    session.steps = total;
                    self.publish(&session);
                }
                self.store.set_for(day, total).await;
                info!(date = %day, steps = total, "Baseline corrected from sensor history");
            }
            Err(e) => {
                let err = TrackerError::HistoricalQueryUnsupported(e.to_string());
                warn!(error = %err, "Using stored baseline");
                if !self.is_current(ticket) {
                    return Ok(SyncOutcome::Superseded);
                }
            }
        }

        // 5. Live subscription, replacing any previous one
        {
            let mut session = self.session.lock().await;
            self.close_subscription(&mut session);
        }
        let subscription = self.sensor.subscribe().await.map_err(|e| {
            TrackerError::InitializationFailure(format!("subscription failed: {e}"))
        })?;

        let mut session = self.session.lock().await;
        if !self.is_current(ticket) {
            self.sensor.unsubscribe(subscription.id);
            return Ok(SyncOutcome::Superseded);
        }
        self.close_subscription(&mut session);
        session.session_origin = None;
        let id = subscription.id;
        let pump = self.spawn_pump(ticket, subscription);
        session.subscription = Some(LiveSubscription { id, pump });

        // 6. Tracking
        session.phase = Phase::Tracking;
        self.publish(&session);
        info!(date = %day, steps = session.steps, subscription = %id, "Step tracking active");
        Ok(SyncOutcome::Tracking)
    }

    async fn fail(&self, ticket: u64, err: TrackerError) {
        let mut session = self.session.lock().await;
        if !self.is_current(ticket) {
            debug!(ticket, error = %err, "Ignoring failure of superseded synchronization");
            return;
        }

        match &err {
            TrackerError::InitializationFailure(detail) => {
                error!(detail = %detail, "Step tracker initialization failed");
            }
            other => warn!(reason = %other, "Step tracking unavailable"),
        }

        self.close_subscription(&mut session);
        session.phase = Phase::Failed(err);
        self.publish(&session);
    }

    // ========================================================================
    // Live Events
    // ========================================================================

    fn spawn_pump(self: &Arc<Self>, ticket: u64, subscription: SensorSubscription) -> JoinHandle<()> {
        let tracker = Arc::downgrade(self);
        let SensorSubscription { id, mut events } = subscription;

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(tracker) = tracker.upgrade() else {
                    break;
                };
                if !tracker.apply_event(ticket, event).await {
                    break;
                }
            }
            debug!(subscription = %id, "Step event pump stopped");
        })
    }

    /// Applies one live event. Returns false if the pump that delivered it is
    /// stale and should stop.
    async fn apply_event(&self, ticket: u64, event: StepEvent) -> bool {
        let mut session = self.session.lock().await;
        if !self.is_current(ticket) {
            debug!(ticket, steps = event.steps, "Ignoring event from superseded subscription");
            return false;
        }

        // The first event counts in full: the origin is zero, not the first value.
        let origin = *session.session_origin.get_or_insert(0);
        let delta = event.steps.saturating_sub(origin);
        let total = session.baseline.checked_add(delta).unwrap_or_else(|| {
            warn!(baseline = session.baseline, delta, "Step total overflowed, saturating");
            u64::MAX
        });
        session.steps = total;

        if self.config.should_persist(event.steps) {
            if let Some(day) = session.day {
                self.store.set_for(day, total).await;
            }
        }

        self.publish(&session);
        true
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Reacts to an application lifecycle transition.
    pub async fn handle_lifecycle(self: &Arc<Self>, state: AppLifecycle) {
        if self.is_shut_down() {
            return;
        }
        match state {
            AppLifecycle::Foreground => self.resume().await,
            AppLifecycle::Background => self.flush().await,
            AppLifecycle::Inactive => debug!("Ignoring inactive transition"),
        }
    }

    /// Foreground transition: zero everything if the calendar day changed
    /// while inactive, then resynchronize.
    pub async fn resume(self: &Arc<Self>) {
        let today = self.clock().today();
        let stored_stale = self
            .store
            .load()
            .await
            .is_some_and(|record| !record.is_for(today));

        {
            let mut session = self.session.lock().await;
            let session_stale = session.day.is_some_and(|day| day != today);
            if session_stale || stored_stale {
                info!(
                    previous = ?session.day,
                    today = %today,
                    "Calendar day changed while inactive, resetting count"
                );
                self.close_subscription(&mut session);
                session.phase = Phase::Pending;
                session.baseline = 0;
                session.session_origin = None;
                session.steps = 0;
                session.day = None;
                self.publish(&session);
            }
        }

        self.synchronize().await;
    }

    /// Background transition: persist the published total regardless of the
    /// event throttle.
    pub async fn flush(&self) {
        let session = self.session.lock().await;
        if self.is_shut_down() {
            return;
        }
        let Some(day) = session.day else {
            debug!("No baseline loaded yet, nothing to flush");
            return;
        };
        let steps = session.steps;
        self.store.set_for(day, steps).await;
        info!(date = %day, steps, "Flushed step total");
    }

    /// Listens for lifecycle transitions on `events`.
    ///
    /// Foreground resyncs run in their own task, so a background flush is
    /// never queued behind a sync that is waiting on the sensor. Only one
    /// listener is kept; attaching again replaces the previous one.
    pub fn attach_lifecycle(self: &Arc<Self>, mut events: broadcast::Receiver<AppLifecycle>) {
        if self.is_shut_down() {
            return;
        }

        let tracker = Arc::downgrade(self);
        let listener = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(state) => {
                        let Some(tracker) = tracker.upgrade() else {
                            break;
                        };
                        debug!(state = %state, "Lifecycle transition");
                        if state == AppLifecycle::Foreground {
                            // Resyncs wait on the sensor; later transitions must not.
                            tokio::spawn(async move { tracker.handle_lifecycle(state).await });
                        } else {
                            tracker.handle_lifecycle(state).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Lifecycle listener fell behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Lifecycle listener stopped");
        });

        let previous = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(listener);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stops tracking for good: cancels the live subscription and lifecycle
    /// listener, and supersedes any synchronization in flight. Nothing is
    /// published or persisted afterwards.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);

        let listener = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.abort();
        }

        let mut session = self.session.lock().await;
        self.close_subscription(&mut session);
        info!("Step tracker shut down");
    }
}

impl Drop for StepTracker {
    fn drop(&mut self) {
        if let Some(listener) = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            listener.abort();
        }
        if let Some(live) = self.session.get_mut().subscription.take() {
            self.sensor.unsubscribe(live.id);
            live.pump.abort();
        }
    }
}

impl std::fmt::Debug for StepTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepTracker")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
