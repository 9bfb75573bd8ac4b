//! Consumed partner-SDK surface for the Viaduct mediation adapter.
//!
//! The partner ad network ships its own SDK; this crate is the boundary the
//! rest of Viaduct programs against. It defines:
//!
//! - [`PartnerSdk`] - the SDK facade: versioning, delegate-style
//!   initialization, the single consent setter, and placement construction.
//! - [`Placement`] - one partner ad object, with a fire-and-forget
//!   `load`/`show` surface and an event sink replacing the SDK's
//!   per-format delegate protocols.
//! - [`PlacementEvent`] - the closed tagged-event set every delegate callback
//!   collapses into. One dispatch function per ad instance matches on it
//!   instead of conforming to a delegate protocol per format.
//! - [`BannerSize`] - the static banner size table and best-fit lookup.
//! - [`UiDispatcher`] - a single task serializing the SDK calls that must
//!   run on the UI-owning thread (the partner's web view is not thread-safe).
//!
//! The [`testing`] module provides scripted fakes for the rest of the
//! workspace's tests; no real partner binary is ever linked here.

pub mod banner;
pub mod dispatch;
pub mod placement;
pub mod sdk;
pub mod testing;

pub use banner::BannerSize;
pub use dispatch::UiDispatcher;
pub use placement::{EventSink, PartnerDetails, Placement, PlacementEvent};
pub use sdk::{InitCompletion, InitConfig, PartnerConsentStatus, PartnerError, PartnerSdk};
