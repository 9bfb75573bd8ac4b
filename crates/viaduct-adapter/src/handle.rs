//! The caller-facing ad handle.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use viaduct_bridge::{AdInstance, AdRequest, AdState, Error as AdError};
use viaduct_partner::{PartnerDetails, PlacementEvent};

use crate::error::{Error, Result};

/// One ad, as the mediation layer holds it.
///
/// Wraps the lifecycle state machine together with the event-pump task that
/// feeds partner events into it. `load` and `show` initiate on the state
/// machine and await its one-shot completions.
///
/// Dropping the handle aborts the pump: any partner event arriving for a
/// discarded ad finds no one listening and is inert.
pub struct AdHandle {
    instance: Arc<Mutex<AdInstance>>,
    pump: JoinHandle<()>,
}

impl AdHandle {
    /// Wrap an instance and start pumping its event channel.
    pub(crate) fn spawn(
        instance: AdInstance,
        mut events: mpsc::UnboundedReceiver<PlacementEvent>,
    ) -> Self {
        let instance = Arc::new(Mutex::new(instance));
        let pump_instance = instance.clone();
        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                pump_instance.lock().unwrap().on_event(event);
            }
            trace!("ad event pump stopped");
        });
        Self { instance, pump }
    }

    /// Load the ad. Resolves when the partner delivers its terminal load
    /// event; guard violations reject synchronously.
    pub async fn load(&self) -> Result<PartnerDetails> {
        let completion = self.instance.lock().unwrap().begin_load()?;
        match completion.await {
            Ok(result) => result.map_err(Error::from),
            // Sender dropped without a value: the operation was abandoned,
            // not failed.
            Err(_) => Err(Error::Ad(AdError::Abandoned)),
        }
    }

    /// Show the loaded ad. No-op success for banners, which present
    /// implicitly once loaded.
    pub async fn show(&self) -> Result<PartnerDetails> {
        let completion = self.instance.lock().unwrap().begin_show()?;
        match completion.await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::Ad(AdError::Abandoned)),
        }
    }

    /// The request this ad was created for.
    #[must_use]
    pub fn request(&self) -> AdRequest {
        self.instance.lock().unwrap().request().clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AdState {
        self.instance.lock().unwrap().state()
    }

    /// Whether the partner expired this ad.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.instance.lock().unwrap().is_expired()
    }
}

impl Drop for AdHandle {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl std::fmt::Debug for AdHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdHandle")
            .field("instance", &*self.instance.lock().unwrap())
            .finish()
    }
}
