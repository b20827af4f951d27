//! Collection queries executed against a scripted server.

use crate::common::{ScriptedServer, account_page, store, url};
use chrono::{DateTime, Utc};
use idm_client::error::QueryError;
use idm_client::http::{HttpMethod, HttpRequest};
use idm_client::resource::{Account, Directory, RequestContext, ResourceStatus};
use idm_client::{SdkError, field};
use serde_json::json;

fn params(request: &HttpRequest) -> Vec<(String, String)> {
    let query = request.url.split_once('?').map(|(_, q)| q).unwrap_or_default();
    ::url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[tokio::test]
async fn test_count_reports_server_size() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 1000, 0, 25, 1, 25),
    );
    let store = store(server.clone());

    let count = store
        .query::<Account>("/directories/7/accounts")
        .where_eq("status", ResourceStatus::Enabled)
        .count(&RequestContext::new())
        .await
        .unwrap();

    assert_eq!(count, 1000);
    assert_eq!(server.request_count(), 1);
    let sent = params(&server.requests()[0]);
    assert!(sent.contains(&("status".to_string(), "ENABLED".to_string())));
}

#[tokio::test]
async fn test_first_on_empty_collection() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories",
        200,
        json!({"href": url("/directories"), "offset": 0, "limit": 25, "size": 0, "items": []}),
    );
    let store = store(server);
    let context = RequestContext::new();
    let query = store.query::<Directory>("/directories").where_eq("name", "Nobody");

    assert!(matches!(query.first(&context).await, Err(SdkError::EmptySequence)));
    assert!(query.first_or_default(&context).await.unwrap().is_none());
    assert!(!query.any(&context).await.unwrap());
    assert!(query.single_or_default(&context).await.unwrap().is_none());
}

#[tokio::test]
async fn test_single_with_several_matches_fails() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 2, 0, 25, 1, 2),
    );
    let store = store(server);

    let result = store
        .query::<Account>("/directories/7/accounts")
        .where_starts_with("email", "user")
        .single(&RequestContext::new())
        .await;
    assert!(matches!(result, Err(SdkError::MoreThanOneElement)));
}

#[tokio::test]
async fn test_to_list_pages_until_take_is_reached() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 500, 0, 20, 1, 20),
    );
    let store = store(server.clone());

    let accounts = store
        .query::<Account>("/directories/7/accounts")
        .order_by("surname")
        .then_by_descending("givenName")
        .skip(10)
        .page_size(20)
        .take(50)
        .to_list(&RequestContext::new())
        .await
        .unwrap();

    assert_eq!(accounts.len(), 50);
    let offsets: Vec<String> = server
        .requests()
        .iter()
        .map(|request| {
            params(request)
                .into_iter()
                .find(|(name, _)| name == "offset")
                .map(|(_, value)| value)
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(offsets, vec!["10", "30", "50"]);

    let first = params(&server.requests()[0]);
    assert!(first.contains(&("limit".to_string(), "20".to_string())));
    assert!(first.contains(&("orderBy".to_string(), "surname,givenName desc".to_string())));
}

#[tokio::test]
async fn test_query_parameters_on_the_wire() {
    let server = ScriptedServer::new();
    server.respond(
        HttpMethod::Get,
        "/directories/7/accounts",
        200,
        account_page("/directories/7/accounts", 1, 0, 25, 1, 1),
    );
    let store = store(server.clone());
    let since: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();

    store
        .query::<Account>("/directories/7/accounts")
        .search("jane")
        .filter(field("email").ends_with("@example.com") & field("surname").eq("Doe"))
        .filter(field("createdAt").gte(since))
        .expand("directory")
        .first(&RequestContext::new())
        .await
        .unwrap();

    assert_eq!(
        params(&server.requests()[0]),
        vec![
            ("q".to_string(), "jane".to_string()),
            ("limit".to_string(), "25".to_string()),
            ("email".to_string(), "*@example.com".to_string()),
            ("surname".to_string(), "Doe".to_string()),
            ("createdAt".to_string(), "[2024-01-01T00:00:00Z,]".to_string()),
            ("expand".to_string(), "directory".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unsupported_query_sends_nothing() {
    let server = ScriptedServer::new();
    let store = store(server.clone());
    let context = RequestContext::new();

    let disjunction = store
        .query::<Account>("/directories/7/accounts")
        .filter(field("email").eq("a@example.com") | field("email").eq("b@example.com"));
    let error = disjunction.to_list(&context).await.unwrap_err();
    assert!(matches!(error, SdkError::Query(QueryError::NotSupported { .. })));

    let oversized = store.query::<Account>("/directories/7/accounts").page_size(500);
    let error = oversized.count(&context).await.unwrap_err();
    assert!(matches!(error, SdkError::Query(QueryError::InvalidPagination { .. })));

    assert_eq!(server.request_count(), 0);
}

proptest::proptest! {
    #[test]
    fn prop_count_is_server_size_not_page_length(size in 0u64..1_000_000, returned in 0usize..25) {
        let server = ScriptedServer::new();
        server.respond(
            HttpMethod::Get,
            "/accounts",
            200,
            account_page("/accounts", size, 0, 25, 1, returned),
        );
        let store = store(server.clone());

        let count = tokio_test::block_on(async {
            store
                .query::<Account>("/accounts")
                .long_count(&RequestContext::new())
                .await
        })
        .unwrap();

        proptest::prop_assert_eq!(count, size);
        proptest::prop_assert_eq!(server.request_count(), 1);
    }
}
