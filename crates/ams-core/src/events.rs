//! Topology and application lifecycle events.

use ams_types::{ApplicationInstance, Scenario};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::service::AmsService;

/// Change notifications from the platform, as received on the internal ingress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum AmsEvent {
    ScenarioActivated { scenario: Scenario },
    ScenarioUpdated { scenario: Scenario },
    ScenarioTerminated,
    ApplicationAdded { application: ApplicationInstance },
    ApplicationUpdated { application: ApplicationInstance },
    ApplicationRemoved {
        #[serde(rename = "appInstanceId")]
        app_instance_id: String,
    },
}

impl AmsEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ScenarioActivated { .. } => "ScenarioActivated",
            Self::ScenarioUpdated { .. } => "ScenarioUpdated",
            Self::ScenarioTerminated => "ScenarioTerminated",
            Self::ApplicationAdded { .. } => "ApplicationAdded",
            Self::ApplicationUpdated { .. } => "ApplicationUpdated",
            Self::ApplicationRemoved { .. } => "ApplicationRemoved",
        }
    }
}

pub type EventSender = mpsc::Sender<AmsEvent>;
pub type EventReceiver = mpsc::Receiver<AmsEvent>;

pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Applies events in arrival order until every sender is dropped.
pub async fn run_event_loop(service: AmsService, mut rx: EventReceiver) {
    info!("Event loop started");
    while let Some(event) = rx.recv().await {
        debug!(event = event.name(), "Event received");
        service.handle_event(event).await;
    }
    info!("Event loop stopped");
}
