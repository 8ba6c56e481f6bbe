//! Sync layer: cheap `HEAD` change probe and full `GET` fetch against the statewise feed.

pub mod http;

pub use http::{DataSourceClient, FetchError, ProbeError};
