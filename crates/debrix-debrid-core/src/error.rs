//! Error types for debrid provider operations.
//!
//! # Design
//!
//! - Keep error messages constant; store operational context in fields.
//! - Preserve source errors without interpolating them into messages.

use std::error::Error;

use thiserror::Error;

/// Convenience alias for debrid operation results.
pub type DebridResult<T> = Result<T, DebridError>;

/// Primary error type for debrid provider operations.
#[derive(Debug, Error)]
pub enum DebridError {
    /// Provider credentials or endpoint configuration are unusable.
    ///
    /// Raised eagerly at client construction and never retried.
    #[error("invalid provider configuration")]
    Configuration {
        /// Configuration section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
    },
    /// A request to the provider timed out or failed to connect.
    #[error("provider transport failure")]
    Transport {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Provider-side torrent identifier when one is involved.
        torrent: Option<String>,
        /// Underlying transport error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The provider no longer knows the requested resource.
    #[error("provider resource not found")]
    NotFound {
        /// Provider-side identifier that failed to resolve.
        torrent: String,
    },
    /// The provider answered with a payload the client could not interpret.
    #[error("provider protocol failure")]
    Protocol {
        /// Operation that received the malformed payload.
        operation: &'static str,
        /// Detail describing what was malformed.
        detail: String,
    },
}

impl DebridError {
    /// Build a transport error from any underlying failure.
    pub fn transport(
        operation: &'static str,
        torrent: Option<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            operation,
            torrent,
            source: Box::new(source),
        }
    }
}
