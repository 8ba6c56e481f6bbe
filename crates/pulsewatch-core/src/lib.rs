pub mod aggregate;
pub mod config;
pub mod message;
pub mod record;
pub mod timestamp;

pub use aggregate::{AggregatedSnapshot, Deltas, aggregate, parse_count};
pub use config::WatchConfig;
pub use message::{ClientMessage, NotificationMessage, NotificationOptions, format_message};
pub use record::{RegionRecord, StatewisePayload};
pub use timestamp::{parse_last_modified, parse_last_updated};
