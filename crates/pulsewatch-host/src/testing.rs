//! In-memory platform and data-source doubles for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use pulsewatch_core::{ClientMessage, NotificationOptions, RegionRecord, StatewisePayload};
use pulsewatch_sync::{FetchError, ProbeError};

use crate::clients::{ClientHost, ClientId, VisibilityState, WindowClient};
use crate::error::PlatformError;
use crate::notifier::{NotificationId, NotificationSink};
use crate::scheduler::{ChangeDetector, DataFetcher};

#[derive(Default)]
pub struct FakeClients {
    clients: Mutex<Vec<WindowClient>>,
    posted: Mutex<Vec<(ClientId, ClientMessage)>>,
    focused: Mutex<Vec<ClientId>>,
    opened: Mutex<Vec<String>>,
    queries: AtomicUsize,
}

impl FakeClients {
    pub fn with_clients(clients: Vec<WindowClient>) -> Self {
        Self {
            clients: Mutex::new(clients),
            ..Default::default()
        }
    }

    pub fn client(id: &str, url: &str, visibility: VisibilityState) -> WindowClient {
        WindowClient {
            id: ClientId(id.to_string()),
            url: url.to_string(),
            visibility,
        }
    }

    pub fn set_clients(&self, clients: Vec<WindowClient>) {
        *self.clients.lock().unwrap() = clients;
    }

    pub fn posted(&self) -> Vec<(ClientId, ClientMessage)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn focused(&self) -> Vec<ClientId> {
        self.focused.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientHost for FakeClients {
    async fn match_all(&self) -> Vec<WindowClient> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.clients.lock().unwrap().clone()
    }

    fn post_message(&self, client: &ClientId, message: &ClientMessage) {
        self.posted.lock().unwrap().push((client.clone(), *message));
    }

    async fn focus(&self, client: &ClientId) -> Result<(), PlatformError> {
        self.focused.lock().unwrap().push(client.clone());
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSink {
    shown: Mutex<Vec<(String, NotificationOptions)>>,
    closed: Mutex<Vec<NotificationId>>,
    next_id: AtomicU64,
}

impl FakeSink {
    pub fn shown(&self) -> Vec<(String, NotificationOptions)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<NotificationId> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for FakeSink {
    async fn show(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<NotificationId, PlatformError> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), options.clone()));
        Ok(NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn close(&self, id: NotificationId) {
        self.closed.lock().unwrap().push(id);
    }
}

/// Change detector answering from a script; once exhausted every probe fails.
#[derive(Default)]
pub struct ScriptedDetector {
    results: Mutex<VecDeque<Result<i64, ProbeError>>>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(results: Vec<Result<i64, ProbeError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, result: Result<i64, ProbeError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeDetector for ScriptedDetector {
    async fn probe_modification_time(&self) -> Result<i64, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProbeError::NoSignal))
    }
}

/// Data fetcher answering from a script; once exhausted every fetch fails.
#[derive(Default)]
pub struct ScriptedFetcher {
    results: Mutex<VecDeque<Result<StatewisePayload, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(results: Vec<Result<StatewisePayload, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, result: Result<StatewisePayload, FetchError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataFetcher for ScriptedFetcher {
    async fn fetch_snapshot(&self) -> Result<StatewisePayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::Status { status: 500 }))
    }
}

/// Payload with an aggregate row stamped `last_updated` and two regions.
pub fn payload(last_updated: &str) -> StatewisePayload {
    let region = |confirmed: &str, active: &str, recovered: &str, deaths: &str| RegionRecord {
        confirmed: confirmed.into(),
        active: active.into(),
        recovered: recovered.into(),
        deaths: deaths.into(),
        ..Default::default()
    };
    StatewisePayload {
        statewise: Some(vec![
            RegionRecord {
                state: "Total".into(),
                deltaconfirmed: "5".into(),
                deltadeaths: "1".into(),
                deltarecovered: "2".into(),
                lastupdatedtime: last_updated.into(),
                ..region("0", "0", "0", "0")
            },
            region("10", "4", "5", "1"),
            region("20", "8", "10", "2"),
        ]),
    }
}
