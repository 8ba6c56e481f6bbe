//! Background host: the polling scheduler and the platform seams it drives.
//!
//! The host does not install event listeners itself. Whatever embeds it calls
//! [`Watcher::on_activate`] / [`Watcher::on_incoming_request`] and supplies
//! [`ClientHost`] and [`NotificationSink`] implementations for its platform.

pub mod clients;
pub mod error;
pub mod notifier;
pub mod page;
pub mod permission;
pub mod registration;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use clients::{ClientHost, ClientId, VisibilityState, WindowClient, is_any_client_visible};
pub use error::PlatformError;
pub use notifier::{ClickOutcome, NotificationId, NotificationSink, Notifier, ShownNotification};
pub use permission::{
    PermissionError, PermissionSource, PermissionState, ShowError, request_permission, show,
};
pub use registration::{Lifecycle, RegisterOutcome, Registrar, RegistrationError, WorkerContainer};
pub use scheduler::{ChangeDetector, CycleOutcome, DataFetcher, Scheduler, WatcherState, Watcher};
