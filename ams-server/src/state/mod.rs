//! Application State
//!
//! Holds the AMS service handle and the sender side of the event channel.

use std::sync::Arc;

use ams_core::{AmsEvent, AmsService, EventSender};
use ams_types::AmsConfig;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub service: AmsService,
    pub events: EventSender,
}

impl AppState {
    pub fn new(service: AmsService, events: EventSender) -> Self {
        Self { inner: Arc::new(AppStateInner { service, events }) }
    }

    pub fn service(&self) -> &AmsService {
        &self.inner.service
    }

    pub fn config(&self) -> &AmsConfig {
        self.inner.service.config()
    }

    /// Hands an event to the event loop without waiting for it to be applied.
    pub fn publish(&self, event: AmsEvent) -> Result<(), PublishError> {
        let name = event.name();
        self.inner.events.try_send(event).map_err(|e| {
            warn!(event = name, "Event rejected: {}", e);
            match e {
                TrySendError::Full(_) => PublishError::Busy,
                TrySendError::Closed(_) => PublishError::Stopped,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("event queue is full")]
    Busy,
    #[error("event loop is not running")]
    Stopped,
}
