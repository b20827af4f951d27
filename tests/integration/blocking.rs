//! The synchronous façade end to end.

use crate::common::{BASE_URL, ScriptedServer, account_json, account_page};
use idm_client::auth::ApiKey;
use idm_client::http::HttpMethod;
use idm_client::resource::{Account, Resource, ResourceStatus};
use idm_client::{CacheMode, Client, SdkError};

fn blocking_store(server: std::sync::Arc<ScriptedServer>) -> idm_client::blocking::DataStore {
    Client::builder()
        .with_base_url(BASE_URL)
        .with_api_key(ApiKey::new("id", "secret"))
        .with_http_client(server)
        .build_blocking()
        .expect("Failed to build blocking store")
}

#[test]
fn test_blocking_save_and_get() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, account_json("1"));
    let mut disabled = account_json("1");
    disabled["status"] = serde_json::json!("DISABLED");
    server.respond(HttpMethod::Post, "/accounts/1", 200, disabled);
    let store = blocking_store(server.clone());
    assert_eq!(store.as_async().cache_mode(), CacheMode::Sync);

    let account: Account = store.get_resource("/accounts/1").unwrap();
    account.set_status(ResourceStatus::Disabled);
    store.save(&account).unwrap();

    let again: Account = store.get_resource("/accounts/1").unwrap();
    assert!(again.data().ptr_eq(account.data()));
    assert_eq!(again.status(), Some(ResourceStatus::Disabled));
    assert_eq!(server.request_count(), 2);
}

#[test]
fn test_blocking_queries() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 3, 0, 25, 1, 3),
    );
    let store = blocking_store(server);

    let query = store.query::<Account>("/directories/7/accounts").take(3);
    assert_eq!(store.count(&query).unwrap(), 3);
    assert_eq!(store.to_list(&query).unwrap().len(), 3);
    assert_eq!(
        store.first(&query).unwrap().username().as_deref(),
        Some("user1")
    );
    assert!(matches!(store.single(&query), Err(SdkError::MoreThanOneElement)));
}

#[test]
fn test_blocking_dispose() {
    let store = blocking_store(ScriptedServer::new());
    store.dispose();
    assert!(matches!(
        store.get_resource::<Account>("/accounts/1"),
        Err(SdkError::Disposed { .. })
    ));
}
