//! Typed errors for the badge updater.

use thiserror::Error;

/// Failures surfaced to the delivery framework; none are retried internally.
#[derive(Debug, Error)]
pub enum BadgeError {
    /// The storage client could not be constructed or authenticated.
    #[error("storage client init failed: {0}")]
    ClientInit(String),

    /// The server-side copy failed (missing source object, permission denial,
    /// transport error).
    #[error("badge copy failed: {0}")]
    Copy(String),

    /// The event payload was undecodable or missing required fields.
    #[error("malformed build event: {0}")]
    MalformedEvent(String),
}
