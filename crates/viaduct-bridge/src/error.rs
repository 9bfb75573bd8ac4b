//! Error types for viaduct-bridge.

use thiserror::Error;
use viaduct_partner::PartnerError;

/// Result type for viaduct-bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong loading or showing an ad.
///
/// Nothing here is retried by the bridge; retry policy, if any, belongs to
/// the calling mediation layer. A failed instance is simply discarded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The request named a format outside banner/interstitial/rewarded.
    #[error("unsupported ad format: {format}")]
    UnsupportedFormat {
        /// The format string as received.
        format: String,
    },

    /// A banner request carried no size, or none of the supported sizes fit.
    #[error("no supported banner size fits the request")]
    InvalidBannerSize,

    /// Another ad for the same placement is already loading or showing.
    #[error("load already in progress for placement {placement}")]
    LoadInProgress {
        /// The contested placement identifier.
        placement: String,
    },

    /// The partner has no inventory for this placement.
    #[error("no fill for placement {placement}")]
    NoFill {
        /// The placement identifier.
        placement: String,
    },

    /// The load failed for a reason the partner did not classify.
    #[error("load failed: {message}")]
    LoadFailureUnknown {
        /// What is known about the failure.
        message: String,
    },

    /// Show was requested before a showable ad existed.
    #[error("ad not ready to show")]
    ShowFailureNotReady,

    /// The partner reported a presentation failure.
    #[error("show failed: {partner}")]
    ShowFailureUnknown {
        /// The underlying partner error.
        partner: PartnerError,
    },

    /// The operation was invalidated (expiry, discarded instance) before a
    /// result could be produced.
    #[error("operation abandoned before completion")]
    Abandoned,
}
