//! The partner SDK facade.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::banner::BannerSize;
use crate::placement::Placement;

/// An opaque failure reported by the partner SDK.
///
/// The partner's codes are not part of any public contract; they are carried
/// verbatim for logging and wrapped into the adapter's own taxonomy before
/// reaching the mediation layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("partner error {code}: {message}")]
pub struct PartnerError {
    /// Raw partner error code.
    pub code: i32,
    /// Partner-provided description.
    pub message: String,
}

impl PartnerError {
    /// Build a partner error from a raw code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The single consent value the partner SDK accepts.
///
/// Raw values mirror the partner's C-style constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartnerConsentStatus {
    /// No usable consent information.
    #[default]
    Unknown,
    /// The user consented.
    Given,
    /// The user refused.
    Declined,
}

impl PartnerConsentStatus {
    /// The partner's raw constant for this status.
    #[must_use]
    pub const fn raw_value(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Given => 1,
            Self::Declined => 2,
        }
    }
}

impl std::fmt::Display for PartnerConsentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "CONSENT_STATUS_UNKNOWN"),
            Self::Given => write!(f, "CONSENT_GIVEN"),
            Self::Declined => write!(f, "CONSENT_DECLINED"),
        }
    }
}

/// Everything the partner SDK needs at initialization time.
///
/// Initialization always carries [`PartnerConsentStatus::Unknown`]; the
/// resolved consent is applied separately the moment init completes, since
/// the real signals may not have arrived yet when setup begins.
#[derive(Debug, Clone)]
pub struct InitConfig {
    /// Publisher account identifier from the mediation credentials.
    pub distributor_id: String,
    /// Stable per-install user identifier.
    pub user_id: String,
    /// Best-effort consent value at init time.
    pub consent: PartnerConsentStatus,
    /// Whether the user requires child-directed treatment.
    pub age_restricted: bool,
}

/// One-shot completion for the delegate-style initialization callback.
///
/// The partner signals success or failure exactly once; dropping the sender
/// without resolving is a partner defect, surfaced to the caller as a closed
/// channel rather than a hang.
pub type InitCompletion = oneshot::Sender<Result<(), PartnerError>>;

/// The partner SDK surface consumed by the adapter.
///
/// `initialize` and `set_consent_status` must only be invoked from the
/// UI-owning thread; callers funnel them through
/// [`UiDispatcher`](crate::UiDispatcher).
pub trait PartnerSdk: Send + Sync {
    /// The partner SDK's own version string.
    fn version(&self) -> String;

    /// The partner's unique identifier within the mediation ecosystem.
    fn partner_id(&self) -> &'static str;

    /// The human-friendly partner name.
    fn display_name(&self) -> &'static str;

    /// Begin SDK initialization. Completion arrives asynchronously, once.
    fn initialize(&self, config: InitConfig, completion: InitCompletion);

    /// Apply a consent value. Callable any number of times, last write wins.
    fn set_consent_status(&self, status: PartnerConsentStatus);

    /// Look up a full-screen placement by name. `None` when the partner has
    /// no such placement configured.
    fn placement(&self, name: &str) -> Option<Arc<dyn Placement>>;

    /// Construct a banner placement for the given slot and size. Banner
    /// construction itself cannot fail; fill is reported through events.
    fn banner_placement(&self, name: &str, size: BannerSize) -> Arc<dyn Placement>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_status_raw_values_match_partner_constants() {
        assert_eq!(PartnerConsentStatus::Unknown.raw_value(), 0);
        assert_eq!(PartnerConsentStatus::Given.raw_value(), 1);
        assert_eq!(PartnerConsentStatus::Declined.raw_value(), 2);
    }

    #[test]
    fn consent_status_display_names() {
        assert_eq!(
            PartnerConsentStatus::Unknown.to_string(),
            "CONSENT_STATUS_UNKNOWN"
        );
        assert_eq!(PartnerConsentStatus::Given.to_string(), "CONSENT_GIVEN");
        assert_eq!(
            PartnerConsentStatus::Declined.to_string(),
            "CONSENT_DECLINED"
        );
    }

    #[test]
    fn partner_error_formats_code_and_message() {
        let err = PartnerError::new(42, "web view crashed");
        assert_eq!(err.to_string(), "partner error 42: web view crashed");
    }
}
