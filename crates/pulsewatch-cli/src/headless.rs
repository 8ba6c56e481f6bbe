//! Platform implementations for running the watcher from a terminal.
//!
//! There are never any foreground clients, so every cycle proceeds to the
//! probe. Notifications are printed to stdout.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use pulsewatch_core::{ClientMessage, NotificationOptions};
use pulsewatch_host::{ClientHost, ClientId, NotificationId, NotificationSink, PlatformError, WindowClient};

use crate::display::render_notification;

pub struct HeadlessClients;

#[async_trait]
impl ClientHost for HeadlessClients {
    async fn match_all(&self) -> Vec<WindowClient> {
        Vec::new()
    }

    fn post_message(&self, client: &ClientId, message: &ClientMessage) {
        tracing::debug!(%client, ?message, "no foreground clients, dropping message");
    }

    async fn focus(&self, client: &ClientId) -> Result<(), PlatformError> {
        Err(PlatformError::ClientGone(client.clone()))
    }

    /// Opens `url` in the default browser.
    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        open::that(url).map_err(|e| PlatformError::OpenClient {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Default)]
pub struct ConsoleSink {
    next_id: AtomicU64,
}

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn show(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<NotificationId, PlatformError> {
        print!("{}", render_notification(title, options));
        Ok(NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn close(&self, _id: NotificationId) {}
}
