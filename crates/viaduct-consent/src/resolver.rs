//! The priority-order resolver collapsing two regime signals into one decision.

use crate::signal::{ConsentDecision, ConsentSignal, ConsentSignals};

/// Collapse the current regime signals into the partner's tri-state value.
///
/// Priority order, first match wins:
///
/// 1. Either regime opted out → [`ConsentDecision::Declined`]. An opt-out is
///    unilateral: the other regime's state is irrelevant.
/// 2. GDPR opted in and US privacy has not opted out → `Given`.
/// 3. US privacy opted in and GDPR has not opted out → `Given`.
/// 4. Otherwise → `Unknown`.
///
/// Rule 3 only ever fires with GDPR at `Unknown` (rule 1 ate `OptedOut`,
/// rule 2 ate `OptedIn`), but keeping it symmetric with rule 2 reads clearer.
#[must_use]
pub fn resolve(signals: &ConsentSignals) -> ConsentDecision {
    if signals.gdpr.is_opted_out() || signals.us_privacy.is_opted_out() {
        ConsentDecision::Declined
    } else if signals.gdpr.is_opted_in() && !signals.us_privacy.is_opted_out() {
        ConsentDecision::Given
    } else if !signals.gdpr.is_opted_out() && signals.us_privacy.is_opted_in() {
        ConsentDecision::Given
    } else {
        ConsentDecision::Unknown
    }
}
