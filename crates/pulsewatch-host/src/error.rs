use thiserror::Error;

use crate::clients::ClientId;

/// Failures reported by a platform implementation.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("client {0} is no longer available")]
    ClientGone(ClientId),

    #[error("failed to open a client at {url}: {reason}")]
    OpenClient { url: String, reason: String },

    #[error("notification could not be displayed: {0}")]
    Display(String),

    #[error("{0}")]
    Other(String),
}
