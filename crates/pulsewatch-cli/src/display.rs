//! Plain-text rendering for `pulsewatch check` and console notifications.

use chrono::DateTime;
use pulsewatch_core::{AggregatedSnapshot, NotificationMessage, NotificationOptions};

/// Render the result of a one-off probe and fetch.
pub fn render_check(
    modified_ms: i64,
    last_updated: &str,
    snapshot: &AggregatedSnapshot,
    message: &NotificationMessage,
) -> String {
    let modified = DateTime::from_timestamp_millis(modified_ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| modified_ms.to_string());

    let mut out = String::new();
    out.push_str(&format!("Feed modified:  {modified}\n"));
    out.push_str(&format!("Last updated:   {last_updated}\n"));
    out.push_str(&format!(
        "Deltas:         +{} confirmed, +{} recovered, +{} deaths\n",
        snapshot.deltas.confirmed, snapshot.deltas.recovered, snapshot.deltas.deaths
    ));
    out.push('\n');
    out.push_str(&render_notification(
        &message.title,
        &NotificationOptions::with_body(message.body.clone()),
    ));
    out
}

/// Render a notification as a boxed block of text.
pub fn render_notification(title: &str, options: &NotificationOptions) -> String {
    let mut out = format!("── {title} ──\n");
    for line in options.body.as_deref().unwrap_or_default().lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out
}
