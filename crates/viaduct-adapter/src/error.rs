//! Error types for viaduct-adapter.

use thiserror::Error;
use viaduct_partner::PartnerError;

/// Result type for viaduct-adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced to the mediation layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The mediation credentials were missing a usable distributor id.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials {
        /// What was wrong with them.
        reason: String,
    },

    /// The partner SDK failed to initialize. The partner path stays disabled
    /// for this session; nothing else is affected.
    #[error("partner initialization failed: {partner}")]
    InitializationFailure {
        /// The underlying partner error.
        partner: PartnerError,
    },

    /// A load/show lifecycle failure.
    #[error(transparent)]
    Ad(#[from] viaduct_bridge::Error),
}
