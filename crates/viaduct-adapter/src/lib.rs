//! Mediation-facing adapter surface for the Viaduct partner integration.
//!
//! This crate is what the mediation layer actually holds: a session-scoped
//! [`MediationAdapter`] that initializes the partner SDK, keeps the privacy
//! signals reconciled onto it, and mints one [`AdHandle`] per load request.
//!
//! # Control flow
//!
//! - `setup` validates credentials, settles the persisted user identity, and
//!   initializes the partner (always with consent `Unknown`, reapplying the
//!   resolved value the moment init completes).
//! - `set_gdpr` / `set_us_privacy` record a signal and re-run the resolver;
//!   `set_consent_override` bypasses the resolver entirely.
//! - `make_ad` enforces the concurrent-load guard against the host's
//!   active-ad registry and wires a fresh lifecycle instance to its event
//!   pump.
//!
//! Storage (persisted identifier, active-ad set) belongs to the host; this
//! crate only defines the ports and ships in-memory impls for tests.

pub mod adapter;
pub mod config;
pub mod error;
pub mod handle;
pub mod storage;

pub use adapter::MediationAdapter;
pub use config::{Credentials, PartnerInfo, ADAPTER_VERSION, DISTRIBUTOR_ID_KEY};
pub use error::{Error, Result};
pub use handle::AdHandle;
pub use storage::{
    AdStorage, KeyValueStore, MemoryAdStorage, MemoryStore, AGE_RESTRICTED_KEY, USER_ID_KEY,
};
