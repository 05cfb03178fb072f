use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::test_helpers::{test_server, BASE};

fn mobility_body() -> Value {
    json!({
        "subscriptionType": "MobilityProcedureSubscription",
        "callbackReference": "http://127.0.0.1:9/mp",
        "filterCriteria": {"appInstanceId": "app-1"}
    })
}

#[tokio::test]
async fn test_create_defaults_mobility_status_and_sets_link() {
    let (server, _state, _rx) = test_server();
    let response = server.post(&format!("{BASE}/subscriptions")).json(&mobility_body()).await;
    response.assert_status(StatusCode::CREATED);

    let created: Value = response.json();
    assert_eq!(created["_links"]["self"]["href"], "http://ams.test/sbx/amsi/v1/subscriptions/1");
    assert_eq!(created["filterCriteria"]["mobilityStatus"], json!(["INTERHOST_MOVEOUT_TRIGGERED"]));
}

#[tokio::test]
async fn test_create_requires_callback_and_filter() {
    let (server, _state, _rx) = test_server();

    let mut body = mobility_body();
    body["callbackReference"] = json!("");
    server.post(&format!("{BASE}/subscriptions")).json(&body).await.assert_status_bad_request();

    let body = json!({
        "subscriptionType": "AdjacentAppInfoSubscription",
        "callbackReference": "http://127.0.0.1:9/adj"
    });
    server.post(&format!("{BASE}/subscriptions")).json(&body).await.assert_status_bad_request();

    let body = json!({"subscriptionType": "Bogus", "callbackReference": "http://cb"});
    server.post(&format!("{BASE}/subscriptions")).json(&body).await.assert_status_bad_request();
}

#[tokio::test]
async fn test_list_filters_by_type() {
    let (server, _state, _rx) = test_server();
    server.post(&format!("{BASE}/subscriptions")).json(&mobility_body()).await;
    server
        .post(&format!("{BASE}/subscriptions"))
        .json(&json!({
            "subscriptionType": "AdjacentAppInfoSubscription",
            "callbackReference": "http://127.0.0.1:9/adj",
            "filterCriteria": {"appInstanceId": "app-1"}
        }))
        .await;

    let all: Value = server.get(&format!("{BASE}/subscriptions")).await.json();
    assert_eq!(all["subscription"].as_array().map(Vec::len), Some(2));
    assert_eq!(all["_links"]["self"]["href"], "http://ams.test/sbx/amsi/v1/subscriptions");

    let response = server
        .get(&format!("{BASE}/subscriptions"))
        .add_query_param("subscriptionType", "adj_app_info")
        .await;
    response.assert_status_ok();
    let filtered: Value = response.json();
    assert_eq!(filtered["subscription"].as_array().map(Vec::len), Some(1));
    assert_eq!(filtered["subscription"][0]["subscriptionType"], "AdjacentAppInfoSubscription");

    server
        .get(&format!("{BASE}/subscriptions"))
        .add_query_param("subscriptionType", "other")
        .await
        .assert_status_bad_request();
    server
        .get(&format!("{BASE}/subscriptions"))
        .add_query_param("filter", "x")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_replace_and_delete() {
    let (server, _state, _rx) = test_server();
    let created: Value = server.post(&format!("{BASE}/subscriptions")).json(&mobility_body()).await.json();

    let mut changed = created.clone();
    changed["filterCriteria"]["appInstanceId"] = json!("app-9");
    server
        .put(&format!("{BASE}/subscriptions/1"))
        .json(&changed)
        .await
        .assert_status_bad_request();

    let mut updated = created;
    updated["callbackReference"] = json!("http://127.0.0.1:9/new");
    let response = server.put(&format!("{BASE}/subscriptions/1")).json(&updated).await;
    response.assert_status_ok();
    let replaced: Value = response.json();
    assert_eq!(replaced["callbackReference"], "http://127.0.0.1:9/new");

    server.delete(&format!("{BASE}/subscriptions/1")).await.assert_status(StatusCode::NO_CONTENT);
    server.get(&format!("{BASE}/subscriptions/1")).await.assert_status_not_found();
    server.delete(&format!("{BASE}/subscriptions/1")).await.assert_status_not_found();
}
