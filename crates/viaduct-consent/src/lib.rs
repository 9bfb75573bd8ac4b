//! Privacy-signal reconciliation for the Viaduct mediation adapter.
//!
//! The partner SDK understands exactly one tri-state consent value, while the
//! mediation layer delivers two independently-updating regional signals: a
//! GDPR-style consent regime and a US-privacy-style opt-out regime. This crate
//! collapses the pair into the partner's single value.
//!
//! # Core Rule
//!
//! Decline is sticky: an explicit opt-out from **either** regime wins over
//! everything else. A single explicit opt-in suffices to grant consent as long
//! as the other regime has not declined. Silence from both regimes stays
//! `Unknown` - the partner must receive an explicit "unknown", never an
//! assumed grant or decline.
//!
//! # Purity
//!
//! [`resolve`] is a pure function of the current [`ConsentSignals`]. The
//! decision is never stored; callers recompute on every signal change and
//! once more right after the partner SDK finishes initializing.

mod resolver;
mod signal;

pub use resolver::resolve;
pub use signal::{ConsentDecision, ConsentSignal, ConsentSignals, GdprStatus};
