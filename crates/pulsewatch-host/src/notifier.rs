//! Notification display, client broadcast, and notification-click routing.

use std::sync::Arc;

use async_trait::async_trait;
use pulsewatch_core::{ClientMessage, NotificationOptions, WatchConfig};
use tracing::{debug, info};

use crate::clients::{ClientHost, ClientId};
use crate::error::PlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

/// A notification the platform has displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownNotification {
    pub id: NotificationId,
    pub title: String,
}

/// The platform's notification capability.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<NotificationId, PlatformError>;

    fn close(&self, id: NotificationId);
}

/// Which branch a notification click took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing client at the root URL was told to refresh and focused.
    FocusedExisting(ClientId),
    /// No client was at the root URL, so a new one was opened there.
    OpenedNew,
}

pub struct Notifier {
    sink: Option<Arc<dyn NotificationSink>>,
    clients: Arc<dyn ClientHost>,
    defaults: NotificationOptions,
    root_url: String,
}

impl Notifier {
    /// `sink` is `None` when the hosting context has no notification capability yet.
    pub fn new(
        config: &WatchConfig,
        sink: Option<Arc<dyn NotificationSink>>,
        clients: Arc<dyn ClientHost>,
    ) -> Self {
        Self {
            sink,
            clients,
            defaults: config.default_notification_options(),
            root_url: config.root_url(),
        }
    }

    pub fn clients(&self) -> &Arc<dyn ClientHost> {
        &self.clients
    }

    /// Show a notification with `options` layered over the default icon.
    ///
    /// Returns `Ok(None)` without doing anything if there is no sink.
    pub async fn notify(
        &self,
        title: &str,
        options: NotificationOptions,
    ) -> Result<Option<ShownNotification>, PlatformError> {
        let Some(sink) = &self.sink else {
            debug!(title, "no notification capability, skipping");
            return Ok(None);
        };

        let options = options.merged_over(&self.defaults);
        let id = sink.show(title, &options).await?;
        info!(title, id = id.0, "notification shown");
        Ok(Some(ShownNotification {
            id,
            title: title.to_string(),
        }))
    }

    /// Post `message` to every foreground client.
    pub async fn broadcast(&self, message: &ClientMessage) {
        let clients = self.clients.match_all().await;
        debug!(count = clients.len(), ?message, "broadcasting to clients");
        for client in &clients {
            self.clients.post_message(&client.id, message);
        }
    }

    /// Close the clicked notification and route the user to the dashboard root.
    pub async fn on_notification_click(
        &self,
        notification: &ShownNotification,
    ) -> Result<ClickOutcome, PlatformError> {
        if let Some(sink) = &self.sink {
            sink.close(notification.id);
        }

        let existing = self
            .clients
            .match_all()
            .await
            .into_iter()
            .find(|client| client.url == self.root_url);

        match existing {
            Some(client) => {
                self.clients.post_message(&client.id, &ClientMessage::Refresh);
                self.clients.focus(&client.id).await?;
                info!(client = %client.id, "refreshed and focused existing client");
                Ok(ClickOutcome::FocusedExisting(client.id))
            }
            None => {
                self.clients.open_window(&self.root_url).await?;
                info!(url = %self.root_url, "opened new client");
                Ok(ClickOutcome::OpenedNew)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::VisibilityState;
    use crate::testing::{FakeClients, FakeSink};

    const ROOT: &str = "http://localhost:3000/";

    fn notifier(sink: Option<Arc<FakeSink>>, clients: Arc<FakeClients>) -> Notifier {
        Notifier::new(
            &WatchConfig::default(),
            sink.map(|s| s as Arc<dyn NotificationSink>),
            clients,
        )
    }

    #[tokio::test]
    async fn notify_merges_default_icon() {
        let sink = Arc::new(FakeSink::default());
        let notifier = notifier(Some(sink.clone()), Arc::new(FakeClients::default()));

        let shown = notifier
            .notify("Title", NotificationOptions::with_body("body"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(shown.title, "Title");
        let calls = sink.shown();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Title");
        assert_eq!(
            calls[0].1.icon.as_deref(),
            Some("http://localhost:3000/favicon.ico")
        );
        assert_eq!(calls[0].1.body.as_deref(), Some("body"));
    }

    #[tokio::test]
    async fn caller_icon_wins() {
        let sink = Arc::new(FakeSink::default());
        let notifier = notifier(Some(sink.clone()), Arc::new(FakeClients::default()));

        let options = NotificationOptions {
            icon: Some("custom.png".into()),
            body: None,
        };
        notifier.notify("Title", options).await.unwrap();
        assert_eq!(sink.shown()[0].1.icon.as_deref(), Some("custom.png"));
    }

    #[tokio::test]
    async fn notify_without_sink_is_noop() {
        let notifier = notifier(None, Arc::new(FakeClients::default()));
        let shown = notifier
            .notify("Title", NotificationOptions::default())
            .await
            .unwrap();
        assert!(shown.is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_client() {
        let clients = Arc::new(FakeClients::with_clients(vec![
            FakeClients::client("a", ROOT, VisibilityState::Hidden),
            FakeClients::client("b", "http://localhost:3000/state/KL", VisibilityState::Visible),
        ]));
        let notifier = notifier(None, clients.clone());

        notifier.broadcast(&ClientMessage::Refresh).await;

        let posted = clients.posted();
        assert_eq!(posted.len(), 2);
        assert!(posted.iter().all(|(_, msg)| *msg == ClientMessage::Refresh));
    }

    #[tokio::test]
    async fn click_with_matching_client_refreshes_and_focuses() {
        let sink = Arc::new(FakeSink::default());
        let clients = Arc::new(FakeClients::with_clients(vec![
            FakeClients::client("other", "http://localhost:3000/about", VisibilityState::Hidden),
            FakeClients::client("root", ROOT, VisibilityState::Hidden),
        ]));
        let notifier = notifier(Some(sink.clone()), clients.clone());
        let notification = ShownNotification {
            id: NotificationId(7),
            title: "COVID-19 Update".into(),
        };

        let outcome = notifier.on_notification_click(&notification).await.unwrap();

        assert_eq!(outcome, ClickOutcome::FocusedExisting(ClientId("root".into())));
        assert_eq!(sink.closed(), vec![NotificationId(7)]);
        assert_eq!(
            clients.posted(),
            vec![(ClientId("root".into()), ClientMessage::Refresh)]
        );
        assert_eq!(clients.focused(), vec![ClientId("root".into())]);
        assert!(clients.opened().is_empty());
    }

    #[tokio::test]
    async fn click_without_matching_client_opens_one() {
        let sink = Arc::new(FakeSink::default());
        let clients = Arc::new(FakeClients::with_clients(vec![FakeClients::client(
            "other",
            "http://localhost:3000/about",
            VisibilityState::Visible,
        )]));
        let notifier = notifier(Some(sink.clone()), clients.clone());
        let notification = ShownNotification {
            id: NotificationId(1),
            title: "COVID-19 Update".into(),
        };

        let outcome = notifier.on_notification_click(&notification).await.unwrap();

        assert_eq!(outcome, ClickOutcome::OpenedNew);
        assert_eq!(sink.closed(), vec![NotificationId(1)]);
        assert_eq!(clients.opened(), vec![ROOT.to_string()]);
        assert!(clients.posted().is_empty());
        assert!(clients.focused().is_empty());
    }
}
