//! Signal vocabulary shared by the resolver and the adapter surface.

use serde::{Deserialize, Serialize};

/// One regime's accumulated privacy signal.
///
/// Tracked as "has opted out" rather than "has opted in" because the
/// three-valued truth table reads more naturally that way: decline is the
/// pole every rule pivots on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsentSignal {
    /// The user explicitly refused.
    OptedOut,
    /// The user explicitly agreed.
    OptedIn,
    /// No usable signal has arrived for this regime.
    #[default]
    Unknown,
}

impl ConsentSignal {
    /// Fold the mediation layer's GDPR inputs into a signal.
    ///
    /// The status only carries meaning when the publisher has said GDPR
    /// applies. A `false` or absent `applies` clears the signal entirely -
    /// an inapplicable regime must not influence the decision.
    #[must_use]
    pub fn from_gdpr(applies: Option<bool>, status: GdprStatus) -> Self {
        if applies == Some(true) {
            match status {
                GdprStatus::Granted => Self::OptedIn,
                GdprStatus::Denied => Self::OptedOut,
                GdprStatus::Unknown => Self::Unknown,
            }
        } else {
            Self::Unknown
        }
    }

    /// Fold the mediation layer's US-privacy boolean into a signal.
    ///
    /// This entry point is two-valued: the mediation layer only calls it once
    /// the user has answered, so it never produces [`ConsentSignal::Unknown`].
    #[must_use]
    pub fn from_us_privacy_opt_in(has_given_consent: bool) -> Self {
        if has_given_consent {
            Self::OptedIn
        } else {
            Self::OptedOut
        }
    }

    /// Whether this signal is an explicit opt-out.
    #[must_use]
    pub const fn is_opted_out(self) -> bool {
        matches!(self, Self::OptedOut)
    }

    /// Whether this signal is an explicit opt-in.
    #[must_use]
    pub const fn is_opted_in(self) -> bool {
        matches!(self, Self::OptedIn)
    }
}

/// GDPR consent status as reported by the mediation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GdprStatus {
    /// The user granted consent.
    Granted,
    /// The user denied consent.
    Denied,
    /// The publisher has no answer from the user.
    Unknown,
}

/// The current pair of regime signals, held on the session context.
///
/// Both fields default to [`ConsentSignal::Unknown`]; they persist in adapter
/// memory until explicitly changed and are never written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsentSignals {
    /// GDPR-style consent regime.
    pub gdpr: ConsentSignal,
    /// US-privacy-style opt-out regime.
    pub us_privacy: ConsentSignal,
}

/// The single consent value the partner SDK understands.
///
/// Derived by [`resolve`](crate::resolve); never stored independently of the
/// signals it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentDecision {
    /// At least one regime explicitly refused.
    Declined,
    /// An explicit opt-in with no opposing opt-out.
    Given,
    /// Neither regime produced a usable answer.
    Unknown,
}

impl std::fmt::Display for ConsentDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declined => write!(f, "declined"),
            Self::Given => write!(f, "given"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
