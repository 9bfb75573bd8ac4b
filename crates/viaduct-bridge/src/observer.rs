//! The outbound observer channel.

use std::sync::Weak;

use tracing::debug;

use crate::error::Error;

/// Receiver of ad life-cycle notifications.
///
/// These are side-channel events with no completion semantics: they may
/// arrive zero or more times over the lifetime of an ad and never resolve a
/// pending load or show.
pub trait AdObserver: Send + Sync {
    /// A presentation attempt concluded. `finished` is whether the ad played
    /// to completion; `error` is set when the dismissal was caused by one.
    fn did_dismiss(&self, finished: bool, error: Option<&Error>);

    /// A loaded ad stopped being usable.
    fn did_expire(&self);

    /// The user clicked through.
    fn did_click(&self);

    /// The user earned a reward.
    fn did_reward(&self, name: Option<&str>, value: i64);

    /// Presentation failed.
    fn did_show_fail(&self, error: &Error);
}

/// Deliver a notification through a weak observer handle.
///
/// The instance does not extend its observer's lifetime; once the holder
/// loses interest the upgrade fails and delivery is a logged no-op.
pub(crate) fn notify(
    observer: &Weak<dyn AdObserver>,
    placement: &str,
    deliver: impl FnOnce(&dyn AdObserver),
) {
    match observer.upgrade() {
        Some(observer) => deliver(observer.as_ref()),
        None => debug!(placement, "observer gone, dropping notification"),
    }
}
