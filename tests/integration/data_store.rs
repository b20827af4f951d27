//! Resolution order, persistence and error surfacing through the data store.

use crate::common::{ScriptedServer, account_json, builder, client, store, url};
use idm_client::http::HttpMethod;
use idm_client::resource::{Account, Directory, RequestContext, Resource, ResourceStatus};
use idm_client::{SdkError, field};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_created_resource_resolves_without_network() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Post, "/directories/7/accounts", 201, account_json("42"));
    let store = builder(server.clone())
        .with_identity_map_expiration(Duration::from_millis(20))
        .build()
        .unwrap();
    let context = RequestContext::new();

    let account: Account = store.instantiate();
    account.set_username("user42");
    account.set_email("user42@example.com");
    account.set_password("Changeme1!");
    store
        .create("/directories/7/accounts", &account, &context)
        .await
        .unwrap();

    // Identity map hit.
    let same: Account = store.get_resource("/accounts/42", &context).await.unwrap();
    assert!(same.data().ptr_eq(account.data()));

    // Cache hit once the identity map entry has expired.
    tokio::time::sleep(Duration::from_millis(40)).await;
    let cached: Account = store.get_resource("/accounts/42", &context).await.unwrap();
    assert_eq!(cached.email().as_deref(), Some("user42@example.com"));

    assert_eq!(server.request_count(), 1);
    assert_eq!(server.requests_to(HttpMethod::Get, "/accounts/42"), 0);
}

#[tokio::test]
async fn test_success_status_is_never_an_error() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, account_json("1"));
    let store = store(server);

    let account: Account = store
        .get_resource("/accounts/1", &RequestContext::new())
        .await
        .unwrap();
    assert_eq!(account.status(), Some(ResourceStatus::Enabled));
    assert_eq!(account.directory_href(), Some(url("/directories/7")));
}

#[tokio::test]
async fn test_client_error_surfaces_structured_body() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Post,
        "/directories/7/accounts",
        400,
        json!({
            "status": 400,
            "code": 2001,
            "message": "Account email is already in use.",
            "developerMessage": "An account with that email already exists in this directory.",
            "moreInfo": "https://docs.example.com/errors/2001",
            "requestId": "req-123"
        }),
    );
    let store = store(server);
    let account: Account = store.instantiate();
    account.set_email("taken@example.com");

    let error = store
        .create("/directories/7/accounts", &account, &RequestContext::new())
        .await
        .unwrap_err();

    let SdkError::Resource(resource_error) = &error else {
        panic!("Expected a resource error, got {:?}", error);
    };
    assert_eq!(resource_error.status, 400);
    assert_eq!(resource_error.code, 2001);
    assert_eq!(resource_error.request_id.as_deref(), Some("req-123"));
    assert!(error.to_string().contains("already in use"));
    assert!(account.data().is_dirty());
}

#[tokio::test]
async fn test_missing_resource_is_not_found_error() {
    let store = store(ScriptedServer::new());

    let error = store
        .get_resource::<Directory>("/directories/404", &RequestContext::new())
        .await
        .unwrap_err();
    assert_eq!(error.as_resource_error().map(|e| e.status), Some(404));
}

#[tokio::test]
async fn test_cancelled_before_response_writes_nothing() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, account_json("1"));
    server.set_delay(Duration::from_millis(200));
    let store = store(server.clone());

    let context = RequestContext::new();
    let token = context.cancellation.clone();
    let pending = {
        let store = store.clone();
        tokio::spawn(async move { store.get_resource::<Account>("/accounts/1", &context).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(SdkError::Cancelled)));
    assert_eq!(store.identity_map_items_added(), 0);

    // Nothing was cached, so the next read goes to the network again.
    server.set_delay(Duration::ZERO);
    let _: Account = store
        .get_resource("/accounts/1", &RequestContext::new())
        .await
        .unwrap();
    assert_eq!(server.requests_to(HttpMethod::Get, "/accounts/1"), 2);
}

#[tokio::test]
async fn test_client_facade_resolves_tenant_and_queries() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/tenants/current",
        200,
        json!({"href": url("/tenants/t1"), "name": "Acme", "key": "acme"}),
    );
    server.respond(
        HttpMethod::Get,
        "/directories",
        200,
        json!({"href": url("/directories"), "size": 3, "items": []}),
    );
    let client = client(server.clone());
    let context = RequestContext::new();

    let tenant = client.current_tenant(&context).await.unwrap();
    assert_eq!(tenant.name().as_deref(), Some("Acme"));
    client.current_tenant(&context).await.unwrap();

    let count = client
        .query::<Directory>("/directories")
        .filter(field("name").starts_with("Emp"))
        .count(&context)
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(server.request_count(), 2);

    client.dispose();
    let error = client.current_tenant(&context).await.unwrap_err();
    assert!(matches!(error, SdkError::Disposed { .. }));
}
