//! Notification permission request, as seen from the foreground page.

use std::time::Duration;

use async_trait::async_trait;
use pulsewatch_core::{NotificationOptions, WatchConfig};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::PlatformError;
use crate::notifier::{NotificationId, NotificationSink};

/// How often the permission state is re-read while the prompt is unanswered.
pub const PERMISSION_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// The user has not answered yet.
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("notifications are not supported")]
    NotSupported,

    #[error("notification permission not granted")]
    PermissionDenied,

    #[error("permission prompt failed: {0}")]
    Prompt(#[source] PlatformError),
}

#[derive(Debug, Error)]
pub enum ShowError {
    #[error("notifications are not supported")]
    NotSupported,

    #[error("notification permission not granted")]
    NotGranted,

    #[error("notification title is empty")]
    EmptyTitle,

    #[error(transparent)]
    Display(#[from] PlatformError),
}

#[async_trait]
pub trait PermissionSource: Send + Sync {
    fn is_supported(&self) -> bool;

    fn state(&self) -> PermissionState;

    /// Show the platform's permission prompt. Resolves once the prompt is up,
    /// not necessarily once the user has answered.
    async fn prompt(&self) -> Result<(), PermissionError>;
}

pub fn is_granted(source: &dyn PermissionSource) -> bool {
    source.state() == PermissionState::Granted
}

/// Show a notification from the foreground page.
///
/// `options` are layered over the config's default icon. Nothing is displayed
/// unless notifications are supported, permission is granted and `title` is
/// non-empty.
pub async fn show(
    source: &dyn PermissionSource,
    sink: &dyn NotificationSink,
    config: &WatchConfig,
    title: &str,
    options: NotificationOptions,
) -> Result<NotificationId, ShowError> {
    let gate = if !source.is_supported() {
        Some(ShowError::NotSupported)
    } else if !is_granted(source) {
        Some(ShowError::NotGranted)
    } else if title.is_empty() {
        Some(ShowError::EmptyTitle)
    } else {
        None
    };
    if let Some(err) = gate {
        warn!(error = %err, "foreground notification not shown");
        return Err(err);
    }

    let options = options.merged_over(&config.default_notification_options());
    Ok(sink.show(title, &options).await?)
}

/// Ask for notification permission, resolving once the user has answered.
///
/// Already-granted permission resolves immediately. Otherwise the prompt is
/// shown and the state is polled every [`PERMISSION_POLL_INTERVAL`] until it
/// leaves [`PermissionState::Default`].
pub async fn request_permission(source: &dyn PermissionSource) -> Result<(), PermissionError> {
    if !source.is_supported() {
        return Err(PermissionError::NotSupported);
    }
    if is_granted(source) {
        return Ok(());
    }

    source.prompt().await?;

    loop {
        tokio::time::sleep(PERMISSION_POLL_INTERVAL).await;
        match source.state() {
            PermissionState::Default => debug!("permission prompt still unanswered"),
            PermissionState::Granted => {
                info!("notification permission granted");
                return Ok(());
            }
            PermissionState::Denied => return Err(PermissionError::PermissionDenied),
        }
    }
}
