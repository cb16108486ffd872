// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat REST API.
//!
//! Provides [`HttpTransport`], which attaches the bearer credential from
//! the [`AuthProvider`] to every request and maps HTTP failures onto
//! [`ParleyError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::ServerConfig;
use parley_core::types::{ConversationId, ConversationSummary, Message, PostMessageRequest};
use parley_core::{AuthProvider, ChatTransport, ParleyError};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;

/// REST transport for the chat server.
///
/// Endpoints are resolved relative to `base_url`:
/// `GET /chats`, `GET /chats/{id}/messages`, `POST /chats/{id}/messages`
/// and `POST /chats/{id}/read`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Creates a transport from the `[server]` config section.
    pub fn new(config: &ServerConfig, auth: Arc<dyn AuthProvider>) -> Result<Self, ParleyError> {
        Self::with_timeout(&config.base_url, config.request_timeout(), auth)
    }

    /// Creates a transport for an explicit base URL and request timeout.
    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, ParleyError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Returns the normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Adds `Authorization: Bearer <token>` when a credential is available.
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ParleyError> {
        match self.auth.bearer_token() {
            Some(token) => {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).map_err(
                        |e| ParleyError::Authentication(format!("invalid bearer token: {e}")),
                    )?;
                value.set_sensitive(true);
                Ok(request.header(AUTHORIZATION, value))
            }
            None => Ok(request),
        }
    }

    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<Response, ParleyError> {
        let response = self
            .authorize(request)?
            .send()
            .await
            .map_err(|e| ParleyError::Transport {
                message: format!("{what}: HTTP request failed: {e}"),
                status: e.status().map(|s| s.as_u16()),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, what, "response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, what, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ParleyError> {
        let body = response.text().await.map_err(|e| ParleyError::Transport {
            message: format!("{what}: failed to read response body: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| ParleyError::Transport {
            message: format!("{what}: failed to parse response: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })
    }
}

/// Maps a non-2xx status to the error taxonomy.
fn error_for_status(status: StatusCode, what: &str, body: &str) -> ParleyError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ParleyError::Authentication(format!("{what}: server returned {status}"))
        }
        _ => ParleyError::Transport {
            message: if body.is_empty() {
                format!("{what}: server returned {status}")
            } else {
                format!("{what}: server returned {status}: {body}")
            },
            status: Some(status.as_u16()),
            source: None,
        },
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ParleyError> {
        let what = "list conversations";
        let response = self.execute(self.client.get(self.url("/chats")), what).await?;
        Self::read_json(response, what).await
    }

    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ParleyError> {
        let what = "fetch messages";
        let url = self.url(&format!("/chats/{conversation_id}/messages"));
        let response = self.execute(self.client.get(url), what).await?;
        Self::read_json(response, what).await
    }

    async fn post_message(&self, request: &PostMessageRequest) -> Result<Message, ParleyError> {
        let what = "post message";
        let url = self.url(&format!("/chats/{}/messages", request.conversation_id));
        let response = self
            .execute(self.client.post(url).json(request), what)
            .await?;
        Self::read_json(response, what).await
    }

    async fn mark_read(&self, conversation_id: ConversationId) -> Result<(), ParleyError> {
        let url = self.url(&format!("/chats/{conversation_id}/read"));
        self.execute(self.client.post(url), "mark read").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuth;
    use parley_core::types::UserId;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_in() -> Arc<dyn AuthProvider> {
        Arc::new(StaticAuth::new(Some("test-token".into()), Some(UserId(3))))
    }

    fn test_transport(base_url: &str) -> HttpTransport {
        HttpTransport::with_timeout(base_url, Duration::from_secs(5), signed_in()).unwrap()
    }

    fn message_json(id: i64, read: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "messageId": id,
            "chatId": 7,
            "senderId": 3,
            "senderName": "Ada",
            "content": format!("message {id}"),
            "timestamp": "2026-03-01T10:00:00Z",
            "readTimestamp": read,
        })
    }

    #[tokio::test]
    async fn fetch_messages_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/chats/7/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                message_json(1, None),
                message_json(2, Some("2026-03-01T10:05:00Z")),
            ])))
            .mount(&server)
            .await;

        let transport = test_transport(&format!("{}/api", server.uri()));
        let messages = transport.fetch_messages(ConversationId(7)).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert!(!messages[0].is_read());
        assert!(messages[1].is_read());
    }

    #[tokio::test]
    async fn requests_carry_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chats"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let conversations = transport.list_conversations().await.unwrap();
        assert!(conversations.is_empty());
    }

    #[tokio::test]
    async fn signed_out_requests_omit_authorization() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chats"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuth::new(None, None));
        let transport =
            HttpTransport::with_timeout(&server.uri(), Duration::from_secs(5), auth).unwrap();
        let err = transport.list_conversations().await.unwrap_err();

        assert!(matches!(err, ParleyError::Authentication(_)), "got: {err:?}");
        assert!(err.is_transport());
        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn post_message_sends_wire_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chats/7/messages"))
            .and(body_json(serde_json::json!({
                "chatId": 7,
                "senderId": 3,
                "content": "hello",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json(11, None)))
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let confirmed = transport
            .post_message(&PostMessageRequest {
                conversation_id: ConversationId(7),
                sender_id: UserId(3),
                content: "hello".into(),
            })
            .await
            .unwrap();

        assert_eq!(confirmed.id, Some(parley_core::MessageId(11)));
    }

    #[tokio::test]
    async fn mark_read_accepts_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chats/7/read"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        transport.mark_read(ConversationId(7)).await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_transport_error_with_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chats/7/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport.fetch_messages(ConversationId(7)).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("maintenance"), "got: {err}");
    }

    #[tokio::test]
    async fn forbidden_is_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chats/8/messages"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport.fetch_messages(ConversationId(8)).await.unwrap_err();
        assert!(matches!(err, ParleyError::Authentication(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chats/7/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport.fetch_messages(ConversationId(7)).await.unwrap_err();
        assert!(matches!(err, ParleyError::Transport { status: None, .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let transport = test_transport("http://127.0.0.1:9");
        let err = transport.fetch_messages(ConversationId(7)).await.unwrap_err();
        assert!(matches!(err, ParleyError::Transport { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn trailing_slash_is_trimmed() {
        let transport = test_transport("http://localhost:8080/api/");
        assert_eq!(transport.base_url(), "http://localhost:8080/api");
    }
}
