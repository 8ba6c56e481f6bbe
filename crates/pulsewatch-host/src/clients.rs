//! Foreground clients of the dashboard page and the visibility query over them.

use std::fmt;

use async_trait::async_trait;
use pulsewatch_core::ClientMessage;

use crate::error::PlatformError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Visible,
    Hidden,
}

/// A foreground window showing the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: ClientId,
    pub url: String,
    pub visibility: VisibilityState,
}

/// Platform access to the page's foreground clients.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// All window clients of the page, including ones this watcher does not control yet.
    async fn match_all(&self) -> Vec<WindowClient>;

    /// Post `message` to one client. Delivery is not acknowledged.
    fn post_message(&self, client: &ClientId, message: &ClientMessage);

    /// Bring `client` to the foreground.
    async fn focus(&self, client: &ClientId) -> Result<(), PlatformError>;

    /// Open a new client at `url`.
    async fn open_window(&self, url: &str) -> Result<(), PlatformError>;
}

/// True iff at least one client reports [`VisibilityState::Visible`].
pub async fn is_any_client_visible(host: &dyn ClientHost) -> bool {
    host.match_all()
        .await
        .iter()
        .any(|client| client.visibility == VisibilityState::Visible)
}
