//! Per-ad lifecycle bridging for the Viaduct mediation adapter.
//!
//! The mediation layer speaks in one-shot asynchronous operations - load an
//! ad, show an ad, each promised exactly one completion. The partner SDK
//! speaks in delegate callbacks - a stream of named events delivered for as
//! long as an ad object lives. This crate owns the translation.
//!
//! # Shape
//!
//! One [`AdInstance`] per load request, never reused, walking
//! `Created → Loading → Loaded → Showing → Finished` with an absorbing
//! `Failed` state and an orthogonal expired flag. Terminal partner events
//! resolve the matching pending completion exactly once (resolution consumes
//! the stored sender, so duplicates are detectable no-ops); side-channel
//! events - click, reward, dismissal, expiry - flow to a weakly-held
//! [`AdObserver`] with no completion semantics.
//!
//! The three ad formats share this single state machine, differentiated only
//! by [`FormatPolicy`]: banners present implicitly once loaded and tolerate
//! concurrent loads per placement; full-screen formats require an explicit
//! show and forbid them.

pub mod error;
pub mod instance;
pub mod observer;
pub mod request;
pub mod testing;

pub use error::{Error, Result};
pub use instance::{AdInstance, AdState, Completion};
pub use observer::AdObserver;
pub use request::{AdFormat, AdRequest, FormatPolicy};
