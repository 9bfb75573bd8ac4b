//! Scripted fakes for exercising the adapter without a partner binary.
//!
//! [`FakePartnerSdk`] records every call the adapter makes and hands control
//! of all asynchronous outcomes to the test: init completes when the test
//! says so, placements emit exactly the events the test scripts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::banner::BannerSize;
use crate::placement::{EventSink, Placement, PlacementEvent};
use crate::sdk::{InitCompletion, InitConfig, PartnerConsentStatus, PartnerError, PartnerSdk};

/// An in-memory partner SDK double.
#[derive(Default)]
pub struct FakePartnerSdk {
    init_configs: Mutex<Vec<InitConfig>>,
    pending_init: Mutex<Option<InitCompletion>>,
    consent_history: Mutex<Vec<PartnerConsentStatus>>,
    fullscreen: Mutex<HashMap<String, Arc<FakePlacement>>>,
    banners: Mutex<Vec<Arc<FakePlacement>>>,
}

impl FakePartnerSdk {
    /// Create a fake with no placements configured.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Configure a full-screen placement the adapter can look up by name.
    pub fn register_placement(&self, name: &str) -> Arc<FakePlacement> {
        let placement = FakePlacement::new(name, None);
        self.fullscreen
            .lock()
            .unwrap()
            .insert(name.to_string(), placement.clone());
        placement
    }

    /// Resolve the pending init completion. Panics if setup never started.
    pub fn complete_init(&self, result: Result<(), PartnerError>) {
        let completion = self
            .pending_init
            .lock()
            .unwrap()
            .take()
            .expect("no initialization in flight");
        // The receiver may have been dropped by an abandoned setup; that is
        // not the fake's problem.
        let _ = completion.send(result);
    }

    /// Whether an initialize call is waiting on its completion.
    pub fn init_in_flight(&self) -> bool {
        self.pending_init.lock().unwrap().is_some()
    }

    /// Every init config received so far.
    pub fn init_configs(&self) -> Vec<InitConfig> {
        self.init_configs.lock().unwrap().clone()
    }

    /// Every consent value applied so far, in order.
    pub fn consent_history(&self) -> Vec<PartnerConsentStatus> {
        self.consent_history.lock().unwrap().clone()
    }

    /// Banner placements created so far, in creation order.
    pub fn banners(&self) -> Vec<Arc<FakePlacement>> {
        self.banners.lock().unwrap().clone()
    }
}

impl PartnerSdk for FakePartnerSdk {
    fn version(&self) -> String {
        "1.2.3".to_string()
    }

    fn partner_id(&self) -> &'static str {
        "fakepartner"
    }

    fn display_name(&self) -> &'static str {
        "Fake Partner"
    }

    fn initialize(&self, config: InitConfig, completion: InitCompletion) {
        debug!(distributor_id = %config.distributor_id, "fake initialize");
        self.init_configs.lock().unwrap().push(config);
        *self.pending_init.lock().unwrap() = Some(completion);
    }

    fn set_consent_status(&self, status: PartnerConsentStatus) {
        self.consent_history.lock().unwrap().push(status);
    }

    fn placement(&self, name: &str) -> Option<Arc<dyn Placement>> {
        self.fullscreen
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .map(|p| p as Arc<dyn Placement>)
    }

    fn banner_placement(&self, name: &str, size: BannerSize) -> Arc<dyn Placement> {
        let placement = FakePlacement::new(name, Some(size));
        self.banners.lock().unwrap().push(placement.clone());
        placement
    }
}

#[derive(Debug, Default)]
struct PlacementState {
    sink: Option<EventSink>,
    load_calls: u32,
    show_calls: u32,
    available: bool,
}

/// An in-memory placement double driven entirely by the test.
#[derive(Debug)]
pub struct FakePlacement {
    name: String,
    banner_size: Option<BannerSize>,
    state: Mutex<PlacementState>,
}

impl FakePlacement {
    /// Create a standalone fake placement.
    pub fn new(name: &str, banner_size: Option<BannerSize>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            banner_size,
            state: Mutex::new(PlacementState::default()),
        })
    }

    /// Deliver an event through the registered sink.
    ///
    /// Returns `false` when no sink is registered or the receiver is gone,
    /// mirroring a partner event landing on a discarded ad.
    pub fn emit(&self, event: PlacementEvent) -> bool {
        let state = self.state.lock().unwrap();
        match &state.sink {
            Some(sink) => sink.send(event).is_ok(),
            None => false,
        }
    }

    /// Script whether the partner reports this placement showable.
    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().available = available;
    }

    /// How many times `load` was called.
    pub fn load_calls(&self) -> u32 {
        self.state.lock().unwrap().load_calls
    }

    /// How many times `show` was called.
    pub fn show_calls(&self) -> u32 {
        self.state.lock().unwrap().show_calls
    }

    /// The size this banner placement was created with, if it is one.
    pub fn banner_size(&self) -> Option<BannerSize> {
        self.banner_size
    }
}

impl Placement for FakePlacement {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) {
        self.state.lock().unwrap().load_calls += 1;
    }

    fn show(&self) {
        self.state.lock().unwrap().show_calls += 1;
    }

    fn is_ad_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn set_event_sink(&self, sink: EventSink) {
        self.state.lock().unwrap().sink = Some(sink);
    }
}
