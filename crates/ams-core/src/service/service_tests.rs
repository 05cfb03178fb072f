#![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

use std::sync::Arc;
use std::time::Duration;

use ams_types::models::{NotificationConfig, SubscriptionKind, TriggerNotification};
use ams_types::{
    AmsConfig, AmsError, AppMobilityServiceLevel, ApplicationInstance, AssociateId,
    ContextTransferState, DeviceInformation, RegistrationError, RegistrationInfo, Scenario,
    ServiceConsumerId, SubscriptionError, TimeStamp,
};
use serde_json::json;

use super::*;
use crate::events::AmsEvent;
use crate::store::{MemoryStore, SqliteStore, StoreResult};

fn config() -> AmsConfig {
    AmsConfig {
        sandbox_name: "sbx".to_string(),
        host_url: "http://localhost".to_string(),
        ..AmsConfig::default()
    }
}

fn service_with(config: AmsConfig, store: Arc<dyn KvStore>) -> AmsService {
    let queue = NotificationQueue::start(&NotificationConfig {
        timeout_secs: 1,
        queue_capacity: 64,
        max_in_flight: 4,
    })
    .unwrap();
    AmsService::new(config, store, queue)
}

fn service() -> (AmsService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (service_with(config(), store.clone()), store)
}

/// Delays every put, so a later write overtakes it unless writes are applied in order.
#[derive(Default)]
struct SlowPutStore {
    inner: MemoryStore,
}

#[async_trait::async_trait]
impl KvStore for SlowPutStore {
    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.inner.put(key, value).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, serde_json::Value)>> {
        self.inner.scan_prefix(prefix).await
    }

    async fn flush_prefix(&self, prefix: &str) -> StoreResult<()> {
        self.inner.flush_prefix(prefix).await
    }
}

fn registration(consumer: &str, addresses: &[&str]) -> RegistrationInfo {
    RegistrationInfo {
        app_mobility_service_id: String::new(),
        device_information: addresses
            .iter()
            .map(|address| DeviceInformation {
                associate_id: Some(AssociateId::ipv4(*address)),
                app_mobility_service_level: AppMobilityServiceLevel::AppMobilityWithConfirmation,
                context_transfer_state: ContextTransferState::NotTransferred,
            })
            .collect(),
        expiry_time: None,
        service_consumer_id: Some(ServiceConsumerId::app_instance(consumer)),
    }
}

fn mp_subscription(app: &str) -> serde_json::Value {
    json!({
        "subscriptionType": "MobilityProcedureSubscription",
        "callbackReference": "http://127.0.0.1:9/callback",
        "filterCriteria": {"appInstanceId": app}
    })
}

/// Two zones, each with one attachment point and one edge node. `ue1` sits on `poa`.
fn scenario(poa: &str) -> Scenario {
    scenario_with_devices(&[("10.0.0.1", poa)])
}

/// Same layout as [`scenario`] with one UE per `(address, attachment point)`.
fn scenario_with_devices(placements: &[(&str, &str)]) -> Scenario {
    let devices_at = |name: &str| {
        let devices: Vec<serde_json::Value> = placements
            .iter()
            .filter(|(_, poa)| *poa == name)
            .map(|(address, _)| json!({"name": format!("ue-{address}"), "type": "UE", "address": address}))
            .collect();
        json!(devices)
    };
    let (poa1_devices, poa2_devices) = (devices_at("poa1"), devices_at("poa2"));
    serde_json::from_value(json!({
        "name": "demo",
        "deployment": {"domains": [{
            "name": "op1",
            "zones": [
                {"name": "z1", "type": "ZONE", "networkLocations": [
                    {"name": "z1-DEFAULT", "type": "DEFAULT", "physicalLocations": [
                        {"name": "edge1", "type": "EDGE"}
                    ]},
                    {"name": "poa1", "type": "POA", "physicalLocations": poa1_devices}
                ]},
                {"name": "z2", "type": "ZONE", "networkLocations": [
                    {"name": "z2-DEFAULT", "type": "DEFAULT", "physicalLocations": [
                        {"name": "edge2", "type": "EDGE"}
                    ]},
                    {"name": "poa2", "type": "POA", "physicalLocations": poa2_devices}
                ]}
            ]
        }]}
    }))
    .unwrap()
}

async fn add_demo_apps(service: &AmsService) {
    for (id, node) in [("app-1", "edge1"), ("app-2", "edge2")] {
        service
            .handle_event(AmsEvent::ApplicationAdded {
                application: ApplicationInstance::new(id, "demo", node),
            })
            .await;
    }
}

async fn owner_of(service: &AmsService, address: &str) -> String {
    service
        .tracked_devices()
        .await
        .into_iter()
        .find(|d| d.address() == address)
        .map(|d| d.owner_app_instance_id)
        .unwrap_or_default()
}

#[tokio::test]
async fn test_registration_ids_are_incremental() {
    let (service, store) = service();
    let first = service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    let second = service.create_registration(registration("app-1", &["10.0.0.2"])).await.unwrap();

    assert_eq!(first.app_mobility_service_id, "1");
    assert_eq!(second.app_mobility_service_id, "2");
    assert!(store.get("data:sbox:sbx:ams:mep:global:services:1").await.unwrap().is_some());
    assert!(store.get("data:sbox:sbx:ams:mep:global:tracked:2:10.0.0.2").await.unwrap().is_some());
}

#[tokio::test]
async fn test_registration_validation() {
    let (service, _) = service();
    let mut invalid = registration("app-1", &["10.0.0.1"]);
    invalid.service_consumer_id = Some(ServiceConsumerId::default());

    let err = service.create_registration(invalid).await.unwrap_err();
    assert_eq!(err, AmsError::Registration(RegistrationError::InvalidConsumer));
    assert_eq!(err.status_code(), 400);
    assert!(service.tracked_devices().await.is_empty());
}

#[tokio::test]
async fn test_replace_registration_rules() {
    let (service, _) = service();
    let created = service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();

    let mut mismatched = created.clone();
    mismatched.app_mobility_service_id = "9".to_string();
    let err = service.replace_registration("1", mismatched).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let mut unknown = created.clone();
    unknown.app_mobility_service_id = "7".to_string();
    let err = service.replace_registration("7", unknown).await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let mut replaced = registration("app-1", &["10.0.0.5"]);
    replaced.app_mobility_service_id = "1".to_string();
    service.replace_registration("1", replaced).await.unwrap();
    let tracked = service.tracked_devices().await;
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].address(), "10.0.0.5");
}

#[tokio::test]
async fn test_replace_keeps_owner_of_redeclared_device() {
    let (service, _) = service();
    add_demo_apps(&service).await;
    let created = service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    service.handle_event(AmsEvent::ScenarioActivated { scenario: scenario("poa1") }).await;
    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-1");

    service.replace_registration("1", created).await.unwrap();
    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-1");
}

#[tokio::test]
async fn test_delete_and_list_registrations() {
    let (service, store) = service();
    assert_eq!(
        service.list_registrations().await.unwrap_err(),
        AmsError::Registration(RegistrationError::NoneRegistered)
    );

    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    assert_eq!(service.list_registrations().await.unwrap().len(), 1);

    service.delete_registration("1").await.unwrap();
    assert!(service.tracked_devices().await.is_empty());
    assert!(store.get("data:sbox:sbx:ams:mep:global:services:1").await.unwrap().is_none());
    assert_eq!(service.delete_registration("1").await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn test_subscription_lifecycle() {
    let (service, _) = service();
    let created = service.create_subscription(mp_subscription("app-1")).await.unwrap();
    assert_eq!(created.self_id(), Some("1"));
    assert_eq!(
        created.links().unwrap().self_link.href,
        "http://localhost/sbx/amsi/v1/subscriptions/1"
    );

    let mut body = serde_json::to_value(&created).unwrap();
    body["filterCriteria"]["appInstanceId"] = json!("app-2");
    let err = service.replace_subscription("1", body).await.unwrap_err();
    assert!(matches!(err, AmsError::Subscription(SubscriptionError::FilterChanged { .. })));

    let body = serde_json::to_value(&created).unwrap();
    let err = service.replace_subscription("2", body.clone()).await.unwrap_err();
    assert!(matches!(err, AmsError::Subscription(SubscriptionError::IdMismatch { .. })));

    let mut body = body;
    body["callbackReference"] = json!("http://127.0.0.1:9/other");
    let replaced = service.replace_subscription("1", body).await.unwrap();
    assert_eq!(replaced.callback_reference(), "http://127.0.0.1:9/other");

    let list = service.list_subscriptions(Some(SubscriptionKind::AdjacentAppInfo)).await;
    assert!(list.subscription.is_empty());
    assert_eq!(service.list_subscriptions(None).await.subscription.len(), 1);

    service.delete_subscription("1").await.unwrap();
    assert_eq!(service.get_subscription("1").await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn test_replace_subscription_requires_link() {
    let (service, _) = service();
    service.create_subscription(mp_subscription("app-1")).await.unwrap();
    let err = service.replace_subscription("1", mp_subscription("app-1")).await.unwrap_err();
    assert_eq!(err, AmsError::Subscription(SubscriptionError::MissingLink));
}

#[tokio::test]
async fn test_device_move_transfers_ownership_and_notifies() {
    let (service, _) = service();
    add_demo_apps(&service).await;
    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    service.create_subscription(mp_subscription("app-1")).await.unwrap();

    service.handle_event(AmsEvent::ScenarioActivated { scenario: scenario("poa1") }).await;
    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-1");
    assert_eq!(service.delivery_stats().queued, 0);

    service.handle_event(AmsEvent::ScenarioUpdated { scenario: scenario("poa2") }).await;
    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-2");
    assert_eq!(service.delivery_stats().queued, 1);

    let rankings = service.rankings().await;
    assert_eq!(rankings["poa2"].tiers()[0], vec!["edge2".to_string()]);
}

#[tokio::test]
async fn test_locality_excludes_devices() {
    let store = Arc::new(MemoryStore::new());
    let service = service_with(AmsConfig { locality: vec!["z2".to_string()], ..config() }, store);
    add_demo_apps(&service).await;
    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();

    service.handle_event(AmsEvent::ScenarioActivated { scenario: scenario("poa1") }).await;
    assert!(service.device_locations().await.is_empty());
    assert_eq!(owner_of(&service, "10.0.0.1").await, "");

    service.handle_event(AmsEvent::ScenarioUpdated { scenario: scenario("poa2") }).await;
    assert!(service.device_locations().await.contains_key("10.0.0.1"));
    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-2");
}

#[tokio::test]
async fn test_application_removal_destroys_registrations() {
    let (service, _) = service();
    add_demo_apps(&service).await;
    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    service.create_registration(registration("app-2", &["10.0.0.2"])).await.unwrap();

    service.handle_event(AmsEvent::ApplicationRemoved { app_instance_id: "app-1".into() }).await;

    let remaining = service.list_registrations().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].consumer_app_instance_id(), "app-2");
}

#[tokio::test]
async fn test_adjacent_notification_on_new_instance() {
    let (service, _) = service();
    add_demo_apps(&service).await;
    service
        .create_subscription(json!({
            "subscriptionType": "AdjacentAppInfoSubscription",
            "callbackReference": "http://127.0.0.1:9/adj",
            "filterCriteria": {"appInstanceId": "app-1"}
        }))
        .await
        .unwrap();

    service
        .handle_event(AmsEvent::ApplicationAdded {
            application: ApplicationInstance::new("app-3", "demo", "edge2"),
        })
        .await;
    assert_eq!(service.delivery_stats().queued, 1);
}

#[tokio::test]
async fn test_expired_subscriptions_removed() {
    let (service, _) = service();
    let mut body = mp_subscription("app-1");
    body["expiryDeadline"] = json!({"seconds": 100, "nanoSeconds": 0});
    service.create_subscription(body).await.unwrap();
    service.create_subscription(mp_subscription("app-1")).await.unwrap();

    assert_eq!(service.expire_subscriptions(TimeStamp::from_seconds(99)).await, 0);
    assert_eq!(service.expire_subscriptions(TimeStamp::from_seconds(100)).await, 1);
    assert!(service.get_subscription("1").await.is_err());
    assert!(service.get_subscription("2").await.is_ok());
    assert_eq!(service.delivery_stats().queued, 1);
}

#[tokio::test]
async fn test_manual_trigger_requires_tracked_device() {
    let (service, _) = service();
    service.create_subscription(mp_subscription("app-1")).await.unwrap();
    let trigger = TriggerNotification {
        notification_type: "TriggerNotification".to_string(),
        app_instance_id: "app-1".to_string(),
        associate_id: AssociateId::ipv4("10.0.0.1"),
        destination_mep: None,
    };

    assert_eq!(service.handle_trigger(&trigger).await, 0);

    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    assert_eq!(service.handle_trigger(&trigger).await, 1);

    let mut not_allowed = registration("app-1", &["10.0.0.1"]);
    not_allowed.device_information[0].app_mobility_service_level =
        AppMobilityServiceLevel::AppMobilityNotAllowed;
    not_allowed.app_mobility_service_id = "1".to_string();
    service.replace_registration("1", not_allowed).await.unwrap();
    assert_eq!(service.handle_trigger(&trigger).await, 0);
}

#[tokio::test]
async fn test_restore_from_store() {
    let store = Arc::new(MemoryStore::new());
    let original = service_with(config(), store.clone());
    original.create_registration(registration("app-1", &["10.0.0.1", "10.0.0.2"])).await.unwrap();
    original.create_subscription(mp_subscription("app-1")).await.unwrap();

    let restored = service_with(config(), store.clone());
    let summary = restored.restore().await.unwrap();
    assert_eq!(
        summary,
        RestoreSummary { registrations: 1, tracked_devices: 2, subscriptions: 1 }
    );

    let next = restored.create_registration(registration("app-1", &["10.0.0.3"])).await.unwrap();
    assert_eq!(next.app_mobility_service_id, "2");
    let sub = restored.create_subscription(mp_subscription("app-1")).await.unwrap();
    assert_eq!(sub.self_id(), Some("2"));
}

#[tokio::test]
async fn test_terminate_clears_everything() {
    let (service, store) = service();
    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    service.create_subscription(mp_subscription("app-1")).await.unwrap();

    service.handle_event(AmsEvent::ScenarioTerminated).await;

    assert!(service.tracked_devices().await.is_empty());
    assert!(service.list_registrations().await.is_err());
    assert!(store.is_empty());
    let created = service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    assert_eq!(created.app_mobility_service_id, "1");
}

#[tokio::test]
async fn test_restore_from_sqlite_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("ams.db");

    let original = service_with(config(), Arc::new(SqliteStore::open(&path).unwrap()));
    original.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    original.create_subscription(mp_subscription("app-1")).await.unwrap();
    original.create_subscription(mp_subscription("app-2")).await.unwrap();
    original.delete_subscription("1").await.unwrap();
    drop(original);

    let restored = service_with(config(), Arc::new(SqliteStore::open(&path).unwrap()));
    let summary = restored.restore().await.unwrap();
    assert_eq!(
        summary,
        RestoreSummary { registrations: 1, tracked_devices: 1, subscriptions: 1 }
    );
    assert!(restored.get_subscription("1").await.is_err());
    assert_eq!(restored.get_subscription("2").await.unwrap().filter_app_instance_id(), Some("app-2"));
    assert_eq!(restored.tracked_devices().await[0].address(), "10.0.0.1");
}

#[tokio::test]
async fn test_concurrent_create_and_delete_persist_in_lock_order() {
    let store = Arc::new(SlowPutStore::default());
    let service = service_with(config(), store.clone());

    let creator = tokio::spawn({
        let service = service.clone();
        async move { service.create_subscription(mp_subscription("app-1")).await }
    });

    let mut deleted = false;
    for _ in 0..100 {
        if service.delete_subscription("1").await.is_ok() {
            deleted = true;
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(deleted, "subscription never became visible");
    creator.await.unwrap().unwrap();

    service.sync_store().await;
    assert!(service.get_subscription("1").await.is_err());
    assert_eq!(store.inner.get("data:sbox:sbx:ams:mep:global:subscriptions:1").await.unwrap(), None);
}

#[tokio::test]
async fn test_terminate_flush_follows_pending_writes() {
    let store = Arc::new(SlowPutStore::default());
    let service = service_with(config(), store.clone());

    let creator = tokio::spawn({
        let service = service.clone();
        async move { service.create_registration(registration("app-1", &["10.0.0.1"])).await }
    });
    for _ in 0..100 {
        if service.list_registrations().await.is_ok() {
            break;
        }
        tokio::task::yield_now().await;
    }

    service.handle_event(AmsEvent::ScenarioTerminated).await;
    creator.await.unwrap().unwrap();

    service.sync_store().await;
    assert!(service.list_registrations().await.is_err());
    assert!(store.inner.is_empty());
}

#[tokio::test]
async fn test_simultaneous_moves_transfer_each_device_once() {
    let (service, _) = service();
    add_demo_apps(&service).await;
    service.create_subscription(mp_subscription("app-1")).await.unwrap();
    service.create_subscription(mp_subscription("app-2")).await.unwrap();
    service.create_registration(registration("app-1", &["10.0.0.1"])).await.unwrap();
    service.create_registration(registration("app-2", &["10.0.0.2"])).await.unwrap();

    let before = scenario_with_devices(&[("10.0.0.1", "poa1"), ("10.0.0.2", "poa2")]);
    service.handle_event(AmsEvent::ScenarioActivated { scenario: before }).await;
    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-1");
    assert_eq!(owner_of(&service, "10.0.0.2").await, "app-2");
    assert_eq!(service.delivery_stats().queued, 0);

    let swapped = scenario_with_devices(&[("10.0.0.1", "poa2"), ("10.0.0.2", "poa1")]);
    service.handle_event(AmsEvent::ScenarioUpdated { scenario: swapped }).await;

    assert_eq!(owner_of(&service, "10.0.0.1").await, "app-2");
    assert_eq!(owner_of(&service, "10.0.0.2").await, "app-1");
    assert_eq!(service.delivery_stats().queued, 2);

    let locations = service.device_locations().await;
    assert_eq!(locations["10.0.0.1"].tiers()[0], vec!["edge2".to_string()]);
    assert_eq!(locations["10.0.0.2"].tiers()[0], vec!["edge1".to_string()]);
}
