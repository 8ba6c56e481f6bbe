//! Installing the background watcher from the foreground page.
//!
//! On local development hosts the worker script is fetched first and checked,
//! so a stale worker left behind by another app on the same port gets
//! unregistered instead of reinstalled.

use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::PlatformError;

pub const WORKER_SCRIPT: &str = "sw.js";

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("worker registration failed: {0}")]
    Register(#[source] PlatformError),

    #[error("worker unregistration failed: {0}")]
    Unregister(#[source] PlatformError),
}

/// Lifecycle state of an installing worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// A registration handed back by the platform.
#[derive(Debug, Clone)]
pub struct Registration {
    pub scope: String,
    /// State feed of the instance being installed, if an install is in progress.
    pub installing: Option<watch::Receiver<WorkerState>>,
}

/// The platform's worker container.
#[async_trait]
pub trait WorkerContainer: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Whether a worker already controls the page.
    fn has_controller(&self) -> bool;

    async fn register(&self, script_url: &str) -> Result<Registration, PlatformError>;

    /// Unregister the active registration. Returns `false` if there was none.
    async fn unregister(&self) -> Result<bool, PlatformError>;

    fn reload_page(&self);
}

/// Callbacks fired once an installing instance reaches [`WorkerState::Installed`].
pub trait Lifecycle: Send + Sync {
    /// An existing install was replaced by a new version.
    fn on_update(&self, _registration: &Registration) {}

    /// First install on this page.
    fn on_success(&self, _registration: &Registration) {}

    fn on_error(&self, _error: &RegistrationError) {}
}

/// Lifecycle that ignores every callback.
pub struct NoLifecycle;

impl Lifecycle for NoLifecycle {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Updated,
    FirstInstall,
}

#[derive(Debug)]
pub enum RegisterOutcome {
    /// The platform has no worker support; nothing was done.
    Unsupported,
    /// The local script check could not reach the server.
    Offline,
    /// The local script was missing or not JavaScript; the old worker was
    /// unregistered and the page reloaded.
    ScriptInvalid,
    Registered {
        registration: Registration,
        install: Option<InstallOutcome>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptCheck {
    Valid,
    Invalid,
}

pub struct Registrar {
    container: Arc<dyn WorkerContainer>,
    client: reqwest::Client,
    origin: String,
}

impl Registrar {
    pub fn new(container: Arc<dyn WorkerContainer>, origin: impl Into<String>) -> Self {
        Self {
            container,
            client: reqwest::Client::new(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.container.is_supported()
    }

    fn script_url(&self) -> String {
        format!("{}/{WORKER_SCRIPT}", self.origin)
    }

    pub async fn register(
        &self,
        lifecycle: &dyn Lifecycle,
    ) -> Result<RegisterOutcome, RegistrationError> {
        if !self.is_supported() {
            return Ok(RegisterOutcome::Unsupported);
        }

        if is_localhost(host_of(&self.origin)) {
            match self.check_script().await {
                Ok(ScriptCheck::Valid) => {}
                Ok(ScriptCheck::Invalid) => {
                    warn!(url = %self.script_url(), "worker script is invalid, unregistering");
                    if let Err(e) = self.container.unregister().await {
                        let err = RegistrationError::Unregister(e);
                        error!(error = %err, "unregistering invalid worker failed");
                        return Err(err);
                    }
                    self.container.reload_page();
                    return Ok(RegisterOutcome::ScriptInvalid);
                }
                Err(e) => {
                    info!(error = %e, "no internet connection found, running in offline mode");
                    return Ok(RegisterOutcome::Offline);
                }
            }
        }

        self.register_valid(lifecycle).await
    }

    pub async fn unregister(&self) {
        if !self.is_supported() {
            return;
        }
        if let Err(e) = self.container.unregister().await {
            error!(error = %e, "worker unregistration failed");
        }
    }

    async fn register_valid(
        &self,
        lifecycle: &dyn Lifecycle,
    ) -> Result<RegisterOutcome, RegistrationError> {
        let mut registration = match self.container.register(&self.script_url()).await {
            Ok(registration) => registration,
            Err(e) => {
                let err = RegistrationError::Register(e);
                error!(error = %err, "error during worker registration");
                lifecycle.on_error(&err);
                return Err(err);
            }
        };
        info!(scope = %registration.scope, "worker registered");

        let install = self.await_installed(&mut registration).await;
        match install {
            Some(InstallOutcome::Updated) => lifecycle.on_update(&registration),
            Some(InstallOutcome::FirstInstall) => lifecycle.on_success(&registration),
            None => {}
        }

        Ok(RegisterOutcome::Registered {
            registration,
            install,
        })
    }

    /// Wait for the installing instance to reach `Installed`.
    ///
    /// Returns `None` if nothing was installing, or the instance went redundant
    /// or disappeared first.
    async fn await_installed(&self, registration: &mut Registration) -> Option<InstallOutcome> {
        let installing = registration.installing.as_mut()?;
        loop {
            let state = *installing.borrow_and_update();
            match state {
                WorkerState::Installed => break,
                WorkerState::Redundant => return None,
                _ => {}
            }
            installing.changed().await.ok()?;
        }

        Some(if self.container.has_controller() {
            InstallOutcome::Updated
        } else {
            InstallOutcome::FirstInstall
        })
    }

    async fn check_script(&self) -> Result<ScriptCheck, reqwest::Error> {
        let resp = self
            .client
            .get(self.script_url())
            .header("Service-Worker", "script")
            .send()
            .await?;

        let not_javascript = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| !content_type.contains("javascript"));

        if resp.status() == StatusCode::NOT_FOUND || not_javascript {
            Ok(ScriptCheck::Invalid)
        } else {
            Ok(ScriptCheck::Valid)
        }
    }
}

/// `localhost`, `[::1]`, or any `127.x.x.x` address.
pub fn is_localhost(host: &str) -> bool {
    if host == "localhost" || host == "[::1]" {
        return true;
    }
    host.parse::<Ipv4Addr>()
        .is_ok_and(|addr| addr.octets()[0] == 127)
}

/// Host part of an origin such as `http://127.0.0.1:3000`.
fn host_of(origin: &str) -> &str {
    let rest = origin.split_once("://").map_or(origin, |(_, rest)| rest);
    let authority = rest.split('/').next().unwrap_or(rest);
    if authority.starts_with('[') {
        return authority
            .find(']')
            .map_or(authority, |end| &authority[..=end]);
    }
    authority.split(':').next().unwrap_or(authority)
}
