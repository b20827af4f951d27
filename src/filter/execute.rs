//! Terminal filter that talks to the network.

use super::{FilterChain, RequestFilter, ResourceRequest, ResourceResponse};
use crate::auth::{ApiKey, RequestAuthenticator};
use crate::error::{SdkError, SdkResult};
use crate::http::{HttpClient, HttpRequest};
use crate::serializer::{PropertyMap, Serializer};
use async_trait::async_trait;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Serializes, signs and sends the request, then decodes the response body.
///
/// Cancellation races the in-flight request; a cancelled call drops the
/// client future and returns [`SdkError::Cancelled`].
pub struct ExecuteRequestFilter {
    client: Arc<dyn HttpClient>,
    authenticator: Arc<dyn RequestAuthenticator>,
    credentials: ApiKey,
    serializer: Arc<dyn Serializer>,
}

impl ExecuteRequestFilter {
    pub fn new(
        client: Arc<dyn HttpClient>,
        authenticator: Arc<dyn RequestAuthenticator>,
        credentials: ApiKey,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self {
            client,
            authenticator,
            credentials,
            serializer,
        }
    }

    fn build_request(&self, request: &ResourceRequest) -> SdkResult<HttpRequest> {
        let mut http_request = HttpRequest::new(request.action.method(), request.url());
        http_request.headers.insert("Accept", "application/json");
        if let Some(body) = &request.body {
            http_request = http_request.with_json_body(self.serializer.serialize(body)?);
        }
        self.authenticator
            .authenticate(&mut http_request, &self.credentials)?;
        Ok(http_request)
    }
}

#[async_trait]
impl RequestFilter for ExecuteRequestFilter {
    fn name(&self) -> &'static str {
        "execute"
    }

    async fn filter(
        &self,
        request: ResourceRequest,
        _chain: Option<&FilterChain>,
    ) -> SdkResult<ResourceResponse> {
        request.context.check_cancelled()?;
        let http_request = self.build_request(&request)?;
        let method = http_request.method;
        let started = Instant::now();

        let response = tokio::select! {
            biased;
            _ = request.context.cancellation.cancelled() => {
                debug!("[{}] {} {} cancelled", request.context.request_id, method, request.href);
                return Err(SdkError::Cancelled);
            }
            response = self.client.execute(http_request) => response?,
        };

        debug!(
            "[{}] {} {} -> {} in {:?}",
            request.context.request_id,
            method,
            request.url(),
            response.status,
            started.elapsed()
        );

        let body = match response.body.as_deref() {
            Some(text) if response.has_body() => match self.serializer.deserialize(text) {
                Ok(body) => body,
                Err(error) if !response.is_success() => {
                    warn!(
                        "[{}] Undecodable error body from {}: {}",
                        request.context.request_id, request.href, error
                    );
                    PropertyMap::new()
                }
                Err(error) => return Err(error),
            },
            _ => PropertyMap::new(),
        };

        Ok(ResourceResponse {
            status: response.status,
            reason_phrase: response.reason_phrase,
            headers: response.headers,
            body,
            from_cache: false,
        })
    }
}

impl fmt::Debug for ExecuteRequestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteRequestFilter")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BasicRequestAuthenticator, DATE_HEADER};
    use crate::filter::ResourceAction;
    use crate::http::HttpResponse;
    use crate::resource::RequestContext;
    use crate::serializer::JsonSerializer;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Default)]
    struct Capture {
        requests: Mutex<Vec<HttpRequest>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl HttpClient for Capture {
        async fn execute(&self, request: HttpRequest) -> SdkResult<HttpResponse> {
            self.requests.lock().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(HttpResponse::new(201, "Created")
                .with_body(r#"{"href":"https://api.example.com/v1/accounts/1","email":"a@example.com"}"#))
        }
    }

    fn filter(client: Arc<Capture>) -> ExecuteRequestFilter {
        ExecuteRequestFilter::new(
            client,
            Arc::new(BasicRequestAuthenticator::new()),
            ApiKey::new("id", "secret"),
            Arc::new(JsonSerializer::new()),
        )
    }

    #[tokio::test]
    async fn test_request_is_signed_and_body_decoded() {
        let client = Arc::new(Capture::default());
        let request = ResourceRequest::new(
            ResourceAction::Create,
            "Account",
            "https://api.example.com/v1/directories/7/accounts",
            &RequestContext::new(),
        )
        .with_body(json!({"email": "a@example.com"}).as_object().unwrap().clone());

        let response = filter(client.clone()).filter(request, None).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body["email"], json!("a@example.com"));

        let sent = client.requests.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method.as_str(), "POST");
        assert!(sent[0].headers.get("authorization").unwrap().starts_with("Basic "));
        assert!(sent[0].headers.contains(DATE_HEADER));
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"email":"a@example.com"}"#));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_request() {
        let client = Arc::new(Capture {
            requests: Mutex::new(Vec::new()),
            delay: Some(Duration::from_secs(30)),
        });
        let context = RequestContext::new();
        let request = ResourceRequest::new(
            ResourceAction::Get,
            "Account",
            "https://api.example.com/v1/accounts/1",
            &context,
        );

        let token = context.cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = filter(client).filter(request, None).await;
        assert!(matches!(result, Err(SdkError::Cancelled)));
    }
}
