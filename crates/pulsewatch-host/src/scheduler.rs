//! The polling loop.
//!
//! Each cycle walks `Checking → Gating → Fetching` and always ends by waiting
//! one interval before the next cycle:
//!
//! - **Checking**: if any foreground client is visible the cycle ends with no
//!   network traffic.
//! - **Gating**: a `HEAD` probe reads the feed's modification time. The cycle
//!   ends if it matches the last recorded value or the probe fails.
//! - **Fetching**: the full payload is downloaded and, if its aggregate row is
//!   newer than anything accepted so far, summarised into a notification.
//!
//! Every failure is logged and ends the cycle; nothing stops the loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pulsewatch_core::{
    AggregatedSnapshot, NotificationOptions, StatewisePayload, WatchConfig, aggregate,
    format_message, parse_last_updated,
};
use pulsewatch_sync::{DataSourceClient, FetchError, ProbeError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::clients::is_any_client_visible;
use crate::notifier::Notifier;

/// Cheap check for whether the feed may have changed.
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    async fn probe_modification_time(&self) -> Result<i64, ProbeError>;
}

/// Full payload download.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<StatewisePayload, FetchError>;
}

#[async_trait]
impl ChangeDetector for DataSourceClient {
    async fn probe_modification_time(&self) -> Result<i64, ProbeError> {
        DataSourceClient::probe_modification_time(self).await
    }
}

#[async_trait]
impl DataFetcher for DataSourceClient {
    async fn fetch_snapshot(&self) -> Result<StatewisePayload, FetchError> {
        DataSourceClient::fetch_snapshot(self).await
    }
}

/// What the scheduler remembers between cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatcherState {
    /// Last `Last-Modified` value seen, in epoch ms. Unset until the first probe succeeds.
    pub last_modified: Option<i64>,
    /// Aggregate-row timestamp of the last payload that produced a notification.
    pub last_accepted: i64,
}

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A client was visible; nothing was requested.
    ClientVisible,
    /// The probe failed.
    ProbeFailed,
    /// The probe matched the recorded modification time.
    Unchanged,
    /// The probe changed but the full fetch failed.
    FetchFailed,
    /// The payload had no rows.
    NoData,
    /// The aggregate row was not newer than the last accepted payload.
    Stale,
    /// A new payload was accepted and handed to the notifier.
    Notified(AggregatedSnapshot),
}

pub struct Scheduler {
    detector: Arc<dyn ChangeDetector>,
    fetcher: Arc<dyn DataFetcher>,
    notifier: Notifier,
    interval: Duration,
    state: WatcherState,
}

impl Scheduler {
    pub fn new(
        config: &WatchConfig,
        detector: Arc<dyn ChangeDetector>,
        fetcher: Arc<dyn DataFetcher>,
        notifier: Notifier,
    ) -> Self {
        Self {
            detector,
            fetcher,
            notifier,
            interval: config.poll_interval,
            state: WatcherState::default(),
        }
    }

    pub fn state(&self) -> &WatcherState {
        &self.state
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Run one `Checking → Gating → Fetching` pass.
    pub async fn poll_cycle(&mut self) -> CycleOutcome {
        if is_any_client_visible(self.notifier.clients().as_ref()).await {
            return CycleOutcome::ClientVisible;
        }

        let modified = match self.detector.probe_modification_time().await {
            Ok(modified) => modified,
            Err(e) => {
                warn!(error = %e, "modification probe failed");
                return CycleOutcome::ProbeFailed;
            }
        };

        // Any difference counts, including the server clock moving backwards.
        if self.state.last_modified == Some(modified) {
            return CycleOutcome::Unchanged;
        }
        debug!(
            previous = ?self.state.last_modified,
            current = modified,
            "feed modification time changed"
        );
        self.state.last_modified = Some(modified);

        match self.fetcher.fetch_snapshot().await {
            Ok(payload) => self.accept_payload(&payload).await,
            Err(e) => {
                error!(error = %e, "feed fetch failed");
                CycleOutcome::FetchFailed
            }
        }
    }

    /// Notify about `payload` if its aggregate row is strictly newer than the
    /// last accepted one.
    pub async fn accept_payload(&mut self, payload: &StatewisePayload) -> CycleOutcome {
        let rows = payload.rows();
        let Some(head) = rows.first() else {
            debug!("payload has no statewise rows");
            return CycleOutcome::NoData;
        };

        let Some(updated) = parse_last_updated(&head.lastupdatedtime) else {
            warn!(
                lastupdatedtime = %head.lastupdatedtime,
                "aggregate row timestamp is unparsable, ignoring payload"
            );
            return CycleOutcome::Stale;
        };

        if updated <= self.state.last_accepted {
            debug!(
                updated,
                last_accepted = self.state.last_accepted,
                "payload is not newer than the last accepted one"
            );
            return CycleOutcome::Stale;
        }
        self.state.last_accepted = updated;

        let Some(snapshot) = aggregate(rows) else {
            return CycleOutcome::NoData;
        };
        let message = format_message(&snapshot);
        info!(
            confirmed = snapshot.confirmed,
            active = snapshot.active,
            recoveries = snapshot.recoveries,
            deaths = snapshot.deaths,
            "new data published"
        );

        if let Err(e) = self
            .notifier
            .notify(&message.title, NotificationOptions::with_body(message.body))
            .await
        {
            warn!(error = %e, "failed to show notification");
        }
        CycleOutcome::Notified(snapshot)
    }

    /// Loop forever: wait one interval, run a cycle, repeat.
    ///
    /// A single timer is reset after each cycle completes, so cycles never overlap.
    pub async fn run(mut self) {
        info!(interval_ms = self.interval.as_millis() as u64, "watcher started");
        let timer = sleep(self.interval);
        tokio::pin!(timer);

        loop {
            timer.as_mut().await;
            let outcome = self.poll_cycle().await;
            debug!(?outcome, "poll cycle finished");
            timer.as_mut().reset(Instant::now() + self.interval);
        }
    }
}

enum Slot {
    Idle(Box<Scheduler>),
    Active(JoinHandle<()>),
    Stopped,
}

/// Entry points the hosting platform calls.
///
/// Activation is idempotent: the first call spawns the scheduler loop and later
/// calls do nothing. Must be called from within a tokio runtime.
pub struct Watcher {
    slot: Mutex<Slot>,
}

impl Watcher {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            slot: Mutex::new(Slot::Idle(Box::new(scheduler))),
        }
    }

    /// The host worker was activated. Returns `true` if this call started the loop.
    pub fn on_activate(&self) -> bool {
        self.start("activate")
    }

    /// The host worker intercepted a request. Returns `true` if this call started the loop.
    pub fn on_incoming_request(&self) -> bool {
        self.start("request")
    }

    pub fn is_active(&self) -> bool {
        !matches!(*self.lock(), Slot::Idle(_))
    }

    /// Abort the loop. The watcher stays marked active and cannot be restarted.
    pub fn shutdown(&self) {
        let mut slot = self.lock();
        if let Slot::Active(handle) = &*slot {
            handle.abort();
            info!("watcher stopped");
        }
        *slot = Slot::Stopped;
    }

    fn start(&self, trigger: &str) -> bool {
        let mut slot = self.lock();
        match std::mem::replace(&mut *slot, Slot::Stopped) {
            Slot::Idle(scheduler) => {
                info!(trigger, "activating watcher");
                *slot = Slot::Active(tokio::spawn(scheduler.run()));
                true
            }
            other => {
                *slot = other;
                false
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
