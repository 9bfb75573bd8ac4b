//! Test doubles for the observer channel.

use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::observer::AdObserver;

/// What a [`RecordingObserver`] saw, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    /// `did_dismiss` with the finished flag and a rendered error, if any.
    Dismissed {
        /// Whether the ad played to completion.
        finished: bool,
        /// Rendered error message, when the dismissal carried one.
        error: Option<String>,
    },
    /// `did_expire`.
    Expired,
    /// `did_click`.
    Clicked,
    /// `did_reward`.
    Rewarded {
        /// Reward name, when configured.
        name: Option<String>,
        /// Reward magnitude.
        value: i64,
    },
    /// `did_show_fail` with the rendered error.
    ShowFailed(String),
}

/// An observer that records every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    /// Create a fresh recorder behind an `Arc`, ready to be held weakly.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: ObserverEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl AdObserver for RecordingObserver {
    fn did_dismiss(&self, finished: bool, error: Option<&Error>) {
        self.push(ObserverEvent::Dismissed {
            finished,
            error: error.map(ToString::to_string),
        });
    }

    fn did_expire(&self) {
        self.push(ObserverEvent::Expired);
    }

    fn did_click(&self) {
        self.push(ObserverEvent::Clicked);
    }

    fn did_reward(&self, name: Option<&str>, value: i64) {
        self.push(ObserverEvent::Rewarded {
            name: name.map(ToString::to_string),
            value,
        });
    }

    fn did_show_fail(&self, error: &Error) {
        self.push(ObserverEvent::ShowFailed(error.to_string()));
    }
}
