//! Foreground page glue: startup sequence and handling of watcher messages.

use pulsewatch_core::ClientMessage;
use tracing::{debug, error};

use crate::permission::{PermissionSource, request_permission};
use crate::registration::{Lifecycle, RegisterOutcome, Registrar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Reload,
}

/// Map a message posted by the watcher to what the page should do.
///
/// Anything that is not a known [`ClientMessage`] is ignored.
pub fn handle_worker_message(data: &serde_json::Value) -> Option<PageAction> {
    match serde_json::from_value::<ClientMessage>(data.clone()) {
        Ok(ClientMessage::Refresh) => Some(PageAction::Reload),
        Err(e) => {
            debug!(error = %e, "ignoring unrecognised worker message");
            None
        }
    }
}

/// Ask for notification permission, then install the watcher.
///
/// Permission failures are logged and skip registration.
pub async fn bootstrap(
    permission: &dyn PermissionSource,
    registrar: &Registrar,
    lifecycle: &dyn Lifecycle,
) -> Option<RegisterOutcome> {
    if !registrar.is_supported() {
        return None;
    }
    if let Err(e) = request_permission(permission).await {
        error!(error = %e, "notification permission request failed");
        return None;
    }
    registrar.register(lifecycle).await.ok()
}
