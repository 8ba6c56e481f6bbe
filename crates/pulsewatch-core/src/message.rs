//! Notification content and the background → foreground message protocol.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedSnapshot;

pub const NOTIFICATION_TITLE: &str = "COVID-19 Update";

/// Title and body of an update notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
}

/// Build the notification text for a snapshot.
///
/// Each line is `Label: value` and every line, including the last, ends in `\n`.
pub fn format_message(snapshot: &AggregatedSnapshot) -> NotificationMessage {
    let lines = [
        ("Confirmed", snapshot.confirmed),
        ("Active", snapshot.active),
        ("Recoveries", snapshot.recoveries),
        ("Deaths", snapshot.deaths),
    ];

    let body: String = lines
        .iter()
        .map(|(label, value)| format!("{label}: {value}\n"))
        .collect();

    NotificationMessage {
        title: NOTIFICATION_TITLE.to_string(),
        body,
    }
}

/// Display options passed along with a notification title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl NotificationOptions {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Fill any option left unset here from `defaults`. Values set on `self` win.
    pub fn merged_over(self, defaults: &NotificationOptions) -> NotificationOptions {
        NotificationOptions {
            icon: self.icon.or_else(|| defaults.icon.clone()),
            body: self.body.or_else(|| defaults.body.clone()),
        }
    }
}

/// Messages posted from the background watcher to foreground clients.
///
/// Serialized as `{"type": "refresh"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// The page should fully reload.
    Refresh,
}
