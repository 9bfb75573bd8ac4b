//! Credentials, versioning, and partner identity reporting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mediation-provided setup credentials.
pub type Credentials = HashMap<String, String>;

/// Credentials key carrying the publisher's partner account identifier.
pub const DISTRIBUTOR_ID_KEY: &str = "distributor_id";

/// The adapter's own version.
///
/// Format: `<mediation major>.<partner major>.<partner minor>.<partner
/// patch>.<adapter build>`, so mediation tooling can read the supported
/// partner SDK line straight off the string.
pub const ADAPTER_VERSION: &str = "5.1.2.3.0";

/// Identity and version strings reported back to the mediation layer after
/// a successful setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerInfo {
    /// The partner's unique identifier within the mediation ecosystem.
    pub partner_id: String,
    /// The human-friendly partner name.
    pub display_name: String,
    /// The partner SDK's version string.
    pub sdk_version: String,
    /// This adapter's version string.
    pub adapter_version: String,
}
