//! Write-through caching observed from outside the crate.

use crate::common::{ScriptedServer, account_json, account_page, store, store_with_cache, url};
use idm_client::cache::{DisabledCacheProvider, InMemoryCacheProvider};
use idm_client::http::HttpMethod;
use idm_client::resource::{Account, Directory, RequestContext, Resource, ResponseOptions};
use serde_json::{Value, json};
use std::sync::Arc;

fn expanded_account(id: &str) -> Value {
    let mut account = account_json(id);
    account["directory"] = json!({
        "href": url("/directories/7"),
        "name": "Employees",
        "status": "ENABLED",
        "accounts": {"href": url("/directories/7/accounts")}
    });
    account
}

#[tokio::test]
async fn test_expanded_resources_land_in_their_own_region() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, expanded_account("1"));
    let provider = Arc::new(InMemoryCacheProvider::new());
    let store = store_with_cache(server.clone(), provider.clone());
    let context = RequestContext::new();

    let account: Account = store
        .get_resource_with_options("/accounts/1", &ResponseOptions::new().expand("directory"), &context)
        .await
        .unwrap();

    let cached_account = provider.region("accounts").get(&url("/accounts/1")).unwrap();
    assert_eq!(cached_account["directory"], json!({"href": url("/directories/7")}));
    let cached_directory = provider.region("directories").get(&url("/directories/7")).unwrap();
    assert_eq!(cached_directory["name"], json!("Employees"));

    let directory: Directory = store
        .get_linked(&account, "directory", &context)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(directory.name().as_deref(), Some("Employees"));
    assert_eq!(server.requests_to(HttpMethod::Get, "/directories/7"), 0);
}

#[tokio::test]
async fn test_collection_pages_are_not_cached_but_items_are() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 2, 0, 25, 1, 2),
    );
    let provider = Arc::new(InMemoryCacheProvider::new());
    let store = store_with_cache(server.clone(), provider.clone());
    let context = RequestContext::new();

    for _ in 0..2 {
        store
            .get_collection::<Account>("/directories/7/accounts", Vec::new(), &context)
            .await
            .unwrap();
    }

    assert_eq!(server.requests_to(HttpMethod::Get, "/directories/7/accounts"), 2);
    assert_eq!(provider.region("accounts").len(), 2);
    assert!(provider.region("accounts").get(&url("/directories/7/accounts")).is_none());
}

#[tokio::test]
async fn test_error_responses_are_not_cached() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/accounts/1",
        403,
        json!({"status": 403, "code": 403, "message": "Forbidden"}),
    );
    let provider = Arc::new(InMemoryCacheProvider::new());
    let store = store_with_cache(server, provider.clone());

    assert!(
        store
            .get_resource::<Account>("/accounts/1", &RequestContext::new())
            .await
            .is_err()
    );
    assert!(provider.region("accounts").is_empty());
}

#[tokio::test]
async fn test_delete_evicts_cache_entry() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, account_json("1"));
    server.respond(HttpMethod::Delete, "/accounts/1", 204, Value::Null);
    let provider = Arc::new(InMemoryCacheProvider::new());
    let store = store_with_cache(server, provider.clone());
    let context = RequestContext::new();

    let account: Account = store.get_resource("/accounts/1", &context).await.unwrap();
    assert_eq!(provider.region("accounts").len(), 1);

    assert!(store.delete(&account, &context).await.unwrap());
    assert!(provider.region("accounts").is_empty());
}

#[tokio::test]
async fn test_disabled_cache_always_reaches_network() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, account_json("1"));
    let store = store_with_cache(server.clone(), Arc::new(DisabledCacheProvider::new()));
    let context = RequestContext::new();

    let first: Account = store.get_resource("/accounts/1", &context).await.unwrap();
    let second: Account = store.get_resource("/accounts/1", &context).await.unwrap();

    // The identity map still dedupes live instances.
    assert!(first.data().ptr_eq(second.data()));
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_dirty_instance_survives_refetch() {
    let server = ScriptedServer::new();
    server.respond(HttpMethod::Get, "/accounts/1", 200, account_json("1"));
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 1, 0, 25, 1, 1),
    );
    let store = store(server);
    let context = RequestContext::new();

    let account: Account = store.get_resource("/accounts/1", &context).await.unwrap();
    account.set_given_name("Changed");

    let page = store
        .get_collection::<Account>("/directories/7/accounts", Vec::new(), &context)
        .await
        .unwrap();
    assert!(page.items[0].data().ptr_eq(account.data()));
    assert_eq!(page.items[0].given_name().as_deref(), Some("Changed"));
}
