//! The mediation-facing adapter.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use viaduct_bridge::{AdInstance, AdObserver, AdRequest, Error as AdError};
use viaduct_consent::{resolve, ConsentDecision, ConsentSignal, ConsentSignals, GdprStatus};
use viaduct_partner::{InitConfig, PartnerConsentStatus, PartnerError, PartnerSdk, UiDispatcher};

use crate::config::{Credentials, PartnerInfo, ADAPTER_VERSION, DISTRIBUTOR_ID_KEY};
use crate::error::{Error, Result};
use crate::handle::AdHandle;
use crate::storage::{self, AdStorage, KeyValueStore};

/// Session-scoped consent state: the accumulated regime signals plus the
/// integrating application's optional override.
#[derive(Debug, Clone, Copy, Default)]
struct ConsentContext {
    signals: ConsentSignals,
    override_value: Option<ConsentDecision>,
}

impl ConsentContext {
    /// The value the partner should currently hold. When the override is
    /// set it is applied as-is; computed and overridden values never merge.
    fn effective(&self) -> ConsentDecision {
        self.override_value.unwrap_or_else(|| resolve(&self.signals))
    }
}

fn to_partner_status(decision: ConsentDecision) -> PartnerConsentStatus {
    match decision {
        ConsentDecision::Declined => PartnerConsentStatus::Declined,
        ConsentDecision::Given => PartnerConsentStatus::Given,
        ConsentDecision::Unknown => PartnerConsentStatus::Unknown,
    }
}

/// The partner adapter as the mediation layer sees it.
///
/// One instance per session, constructed before setup. All mutable state -
/// the consent signals and the override - lives on this context object;
/// nothing is ambient or global. Interactions with the partner's
/// initialization and consent APIs are funneled through the
/// [`UiDispatcher`], since the partner's web rendering component only
/// tolerates its UI-owning thread.
pub struct MediationAdapter {
    sdk: Arc<dyn PartnerSdk>,
    store: Arc<dyn KeyValueStore>,
    dispatcher: UiDispatcher,
    consent: Mutex<ConsentContext>,
}

impl MediationAdapter {
    /// Create an adapter over a partner SDK and the host's persistence.
    ///
    /// Spawns the UI dispatcher task, so a tokio runtime must be current.
    #[must_use]
    pub fn new(sdk: Arc<dyn PartnerSdk>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            sdk,
            store,
            dispatcher: UiDispatcher::spawn(),
            consent: Mutex::new(ConsentContext::default()),
        }
    }

    /// Initialize the partner SDK.
    ///
    /// Initialization always carries consent `Unknown` - the real signals may
    /// not have arrived yet - and the resolved value is applied the moment
    /// init completes. A failure here disables the partner path for the
    /// session; it is never fatal to the process.
    pub async fn setup(&self, credentials: &Credentials) -> Result<PartnerInfo> {
        info!(partner = self.sdk.partner_id(), "setup started");

        let distributor_id = credentials
            .get(DISTRIBUTOR_ID_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidCredentials {
                reason: format!("missing {DISTRIBUTOR_ID_KEY}"),
            })?
            .to_string();

        let config = InitConfig {
            distributor_id,
            user_id: storage::stable_user_id(self.store.as_ref()),
            consent: PartnerConsentStatus::Unknown,
            age_restricted: storage::read_age_restricted(self.store.as_ref()),
        };

        let (tx, rx) = oneshot::channel();
        let sdk = self.sdk.clone();
        self.dispatcher.dispatch(move || sdk.initialize(config, tx));

        match rx.await {
            Ok(Ok(())) => {}
            Ok(Err(partner)) => {
                warn!(%partner, "setup failed");
                return Err(Error::InitializationFailure { partner });
            }
            Err(_) => {
                let partner = PartnerError::new(0, "initialization completion dropped");
                warn!(%partner, "setup failed");
                return Err(Error::InitializationFailure { partner });
            }
        }

        // Signals may have arrived while init was in flight; hand the
        // partner the current value right away.
        self.apply(self.consent.lock().unwrap().effective());

        info!(partner = self.sdk.partner_id(), "setup succeeded");
        Ok(self.partner_info())
    }

    /// Record the GDPR signal and reapply the resolved consent.
    pub fn set_gdpr(&self, applies: Option<bool>, status: GdprStatus) {
        let mut consent = self.consent.lock().unwrap();
        consent.signals.gdpr = ConsentSignal::from_gdpr(applies, status);
        self.recompute(&consent);
    }

    /// Record the US-privacy signal and reapply the resolved consent.
    pub fn set_us_privacy(&self, has_given_consent: bool) {
        let mut consent = self.consent.lock().unwrap();
        consent.signals.us_privacy = ConsentSignal::from_us_privacy_opt_in(has_given_consent);
        self.recompute(&consent);
    }

    /// Integrating-application escape hatch.
    ///
    /// `Some(value)` applies `value` as-is immediately and disables automatic
    /// recomputation; signal updates are still recorded but never reach the
    /// partner. `None` restores automatic behavior and reapplies the
    /// resolved value.
    pub fn set_consent_override(&self, value: Option<ConsentDecision>) {
        let mut consent = self.consent.lock().unwrap();
        consent.override_value = value;
        match value {
            Some(decision) => {
                debug!(%decision, "consent override set");
                self.apply(decision);
            }
            None => {
                debug!("consent override cleared");
                self.apply(resolve(&consent.signals));
            }
        }
    }

    /// Persist the age-restricted flag, last write wins. Forwarded to the
    /// partner at setup time only.
    pub fn set_age_restricted(&self, restricted: bool) {
        storage::write_age_restricted(self.store.as_ref(), restricted);
        debug!(setting = "age_restricted", value = restricted, "privacy updated");
    }

    /// The consent value the partner currently holds (or would, once setup
    /// completes).
    #[must_use]
    pub fn consent_decision(&self) -> ConsentDecision {
        self.consent.lock().unwrap().effective()
    }

    /// Bidding tokens for auction participation. This partner does not use
    /// one.
    #[must_use]
    pub fn bidder_info(&self) -> Option<std::collections::HashMap<String, String>> {
        None
    }

    /// Identity and version strings for mediation reporting.
    #[must_use]
    pub fn partner_info(&self) -> PartnerInfo {
        PartnerInfo {
            partner_id: self.sdk.partner_id().to_string(),
            display_name: self.sdk.display_name().to_string(),
            sdk_version: self.sdk.version(),
            adapter_version: ADAPTER_VERSION.to_string(),
        }
    }

    /// Create one ad instance for one load request.
    ///
    /// Full-screen formats reject a second concurrent load for the same
    /// placement - the partner SDK cannot handle them. Banner loads are
    /// never guarded so a prefetch can overlap auto-refresh. The observer
    /// is held weakly; the host's `storage` stays the owner of the active
    /// set and this call only queries membership.
    pub fn make_ad<O>(
        &self,
        request: AdRequest,
        observer: &Arc<O>,
        storage: &dyn AdStorage,
    ) -> Result<AdHandle>
    where
        O: AdObserver + 'static,
    {
        if !request.format.policy().allow_concurrent_loads && storage.has_active(&request.placement)
        {
            warn!(
                placement = %request.placement,
                "rejecting load for already active placement"
            );
            return Err(Error::Ad(AdError::LoadInProgress {
                placement: request.placement,
            }));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let observer: Arc<dyn AdObserver> = observer.clone();
        let weak: Weak<dyn AdObserver> = Arc::downgrade(&observer);
        let instance = AdInstance::new(request, self.sdk.clone(), weak, events_tx);
        Ok(AdHandle::spawn(instance, events_rx))
    }

    /// Recompute and apply, unless the override is pinned.
    fn recompute(&self, consent: &ConsentContext) {
        if consent.override_value.is_some() {
            debug!("consent override active, skipping recompute");
            return;
        }
        self.apply(resolve(&consent.signals));
    }

    /// Hand a decision to the partner on the UI dispatcher.
    fn apply(&self, decision: ConsentDecision) {
        let status = to_partner_status(decision);
        let sdk = self.sdk.clone();
        self.dispatcher.dispatch(move || {
            sdk.set_consent_status(status);
            debug!(setting = "consent_status", value = %status, "privacy updated");
        });
    }
}

impl std::fmt::Debug for MediationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediationAdapter")
            .field("partner", &self.sdk.partner_id())
            .field("consent", &*self.consent.lock().unwrap())
            .finish()
    }
}
