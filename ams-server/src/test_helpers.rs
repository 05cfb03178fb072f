//! Test helpers for ams-server unit tests.

use std::sync::Arc;

use ams_core::{event_channel, AmsService, EventReceiver, MemoryStore, NotificationQueue};
use ams_types::models::NotificationConfig;
use ams_types::AmsConfig;
use axum_test::TestServer;

use crate::router::build_router;
use crate::state::AppState;

pub const BASE: &str = "/sbx/amsi/v1";

/// Create a minimal `AppState` for testing.
///
/// Returns `(AppState, EventReceiver)`; events posted to the ingress stay in the receiver.
pub fn test_app_state() -> (AppState, EventReceiver) {
    let config = AmsConfig {
        sandbox_name: "sbx".to_string(),
        host_url: "http://ams.test".to_string(),
        ..AmsConfig::default()
    };
    let queue = NotificationQueue::start(&NotificationConfig::default())
        .expect("failed to start notification queue");
    let service = AmsService::new(config, Arc::new(MemoryStore::new()), queue);
    let (tx, rx) = event_channel(8);
    (AppState::new(service, tx), rx)
}

/// Full router over a fresh state, served in-process.
pub fn test_server() -> (TestServer, AppState, EventReceiver) {
    let (state, rx) = test_app_state();
    let server = TestServer::new(build_router(state.clone())).expect("failed to build test server");
    (server, state, rx)
}
