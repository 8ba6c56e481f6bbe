use std::time::Duration;

use crate::message::NotificationOptions;

pub const DEFAULT_DATA_URL: &str = "https://api.covid19india.org/data.json";
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Settings shared by the watcher and its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Feed polled with `HEAD` and `GET`.
    pub data_url: String,
    /// Delay between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
    /// Origin of the dashboard page, e.g. `https://dashboard.example.org`.
    pub origin: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl WatchConfig {
    /// Canonical root URL of the dashboard. Clicked notifications route here.
    pub fn root_url(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }

    /// Options merged under every notification the watcher shows.
    pub fn default_notification_options(&self) -> NotificationOptions {
        NotificationOptions {
            icon: Some(format!("{}/favicon.ico", self.origin.trim_end_matches('/'))),
            body: None,
        }
    }
}
