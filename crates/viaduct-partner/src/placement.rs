//! Placement objects and the tagged event set their delegates collapse into.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::sdk::PartnerError;

/// Opaque partner extras travelling alongside load/show completions and
/// observer notifications.
pub type PartnerDetails = HashMap<String, String>;

/// Where a placement delivers its lifecycle events.
///
/// Unbounded on purpose: event production is partner-paced and sparse, and a
/// full channel must never stall the partner's delegate thread.
pub type EventSink = mpsc::UnboundedSender<PlacementEvent>;

/// Every delegate callback the partner SDK can make, as one closed set.
///
/// The per-format delegate protocols all funnel into this enum so a single
/// dispatch function per ad instance can drive the lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementEvent {
    /// Load finished with inventory to show.
    AdAvailable,
    /// Load finished with nothing to show.
    AdUnavailable,
    /// A previously loaded ad is no longer usable.
    AdExpired,
    /// Any presentation attempt concluded; `finished` is whether the ad
    /// played to completion.
    AdClosed {
        /// Whether the ad played to completion.
        finished: bool,
    },
    /// Presentation is about to begin.
    WillStart,
    /// Presentation failed.
    DisplayError(PartnerError),
    /// The user clicked through.
    Clicked,
    /// The user earned a reward.
    Rewarded {
        /// Partner-configured reward name, when one exists.
        name: Option<String>,
        /// Reward magnitude.
        value: i64,
    },
}

impl PlacementEvent {
    /// Short label for structured logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AdAvailable => "ad_available",
            Self::AdUnavailable => "ad_unavailable",
            Self::AdExpired => "ad_expired",
            Self::AdClosed { .. } => "ad_closed",
            Self::WillStart => "will_start",
            Self::DisplayError(_) => "display_error",
            Self::Clicked => "clicked",
            Self::Rewarded { .. } => "rewarded",
        }
    }
}

/// One partner ad object.
///
/// `load` and `show` are fire-and-forget; results and everything after them
/// arrive through the registered [`EventSink`]. The partner delivers at most
/// one terminal load event and, after a successful load, at most one terminal
/// show event per placement object.
pub trait Placement: Send + Sync {
    /// The placement name this object was created for.
    fn name(&self) -> &str;

    /// Start loading. Terminal outcome arrives as
    /// [`PlacementEvent::AdAvailable`] or [`PlacementEvent::AdUnavailable`].
    fn load(&self);

    /// Start presenting a loaded ad. Not used for banners, which present
    /// implicitly once loaded.
    fn show(&self);

    /// Whether the partner currently considers this placement showable.
    fn is_ad_available(&self) -> bool;

    /// Register the sink all subsequent events are delivered to.
    fn set_event_sink(&self, sink: EventSink);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_labels_are_stable() {
        assert_eq!(PlacementEvent::AdAvailable.label(), "ad_available");
        assert_eq!(PlacementEvent::AdClosed { finished: true }.label(), "ad_closed");
        assert_eq!(
            PlacementEvent::Rewarded {
                name: None,
                value: 1
            }
            .label(),
            "rewarded"
        );
        assert_eq!(
            PlacementEvent::DisplayError(PartnerError::new(1, "boom")).label(),
            "display_error"
        );
    }
}
