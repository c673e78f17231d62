//! Authenticated REST boundary.
//!
//! [`RestClient`] issues JSON requests against the workspace API. Token
//! acquisition is delegated to a pluggable [`TokenSource`]; refresh and
//! retry policy belong to the token source, not to callers.
//!
//! # Usage
//!
//! ```ignore
//! use shopdesk_client::{RestClient, StaticToken};
//!
//! let client = RestClient::new("http://localhost:8080", Arc::new(StaticToken::new(jwt)));
//! let page: Page = client.get("/notifications", &[("limit", "10".into())]).await?;
//! ```

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

// ── Error ───────────────────────────────────────────────────────────

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the server in a failed response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// HTTP status of a failed response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Build a `Server` error, preferring a JSON `{"message": ...}` body.
fn server_error(status: u16, body: String) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    ApiError::Server { status, message }
}

// ── TokenSource ─────────────────────────────────────────────────────

/// Pluggable token provider. Called before every API request.
///
/// Returns `Ok(None)` to skip the Authorization header (anonymous).
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// No authentication. Requests go out anonymous.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// Bearer token obtained by the sign-in flow.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

// ── RestClient ──────────────────────────────────────────────────────

/// JSON client for the workspace REST API.
///
/// Paths are joined onto `base_url`; a leading `/` is optional.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request with auth header.
    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Map a non-2xx response to `ApiError::Server`.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status.as_u16(), body));
        }
        Ok(resp)
    }

    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let resp = Self::check(resp).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    /// `GET {path}?{query}` and decode the JSON body.
    pub async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<R, ApiError> {
        debug!(path, "GET");
        let req = self.http.get(self.url(path)).query(query);
        let req = self.authed(req).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    /// `PATCH {path}` with a JSON body and decode the JSON response.
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(path, "PATCH");
        let req = self.http.patch(self.url(path)).json(body);
        let req = self.authed(req).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    /// `PATCH {path}?{query}` without a body; the response body is ignored.
    pub async fn patch_empty(&self, path: &str, query: &[(&str, String)]) -> Result<(), ApiError> {
        debug!(path, "PATCH");
        let req = self.http.patch(self.url(path)).query(query);
        let req = self.authed(req).await?;
        let resp = req.send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, patch};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    // =====================================================================
    // Test server
    // =====================================================================

    async fn start_test_server() -> String {
        let app = Router::new()
            .route(
                "/echo",
                get(|headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    Json(json!({ "query": q, "auth": auth }))
                }),
            )
            .route(
                "/items/:id/read",
                patch(|Path(id): Path<String>| async move {
                    if id == "missing" {
                        (StatusCode::NOT_FOUND, Json(json!({"message": "Notification not found"})))
                    } else {
                        (StatusCode::OK, Json(json!({"ok": true})))
                    }
                }),
            )
            .route(
                "/items/:id/status",
                patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({ "id": id, "status": body["status"] }))
                }),
            )
            .route("/plain-error", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }))
            .route("/not-json", get(|| async { "hello" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    // =====================================================================
    // Token sources
    // =====================================================================

    #[tokio::test]
    async fn no_auth_returns_none() {
        assert!(NoAuth.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let ts = StaticToken::new("my-jwt-token");
        assert_eq!(ts.token().await.unwrap(), Some("my-jwt-token".to_string()));
    }

    // =====================================================================
    // Requests
    // =====================================================================

    #[tokio::test]
    async fn get_sends_query_and_bearer() {
        let base = start_test_server().await;
        let client = RestClient::new(format!("{}/", base), Arc::new(StaticToken::new("t0k")));

        let body: Value = client
            .get("echo", &[("limit", "10".to_string()), ("isRead", "false".to_string())])
            .await
            .unwrap();

        assert_eq!(body["query"]["limit"], "10");
        assert_eq!(body["query"]["isRead"], "false");
        assert_eq!(body["auth"], "Bearer t0k");
    }

    #[tokio::test]
    async fn anonymous_request_has_no_auth_header() {
        let base = start_test_server().await;
        let client = RestClient::new(base, Arc::new(NoAuth));

        let body: Value = client.get("/echo", &[]).await.unwrap();
        assert_eq!(body["auth"], "");
    }

    #[tokio::test]
    async fn patch_with_body_decodes_response() {
        let base = start_test_server().await;
        let client = RestClient::new(base, Arc::new(NoAuth));

        let body: Value = client
            .patch("/items/o1/status", &json!({"status": "DELIVERED"}))
            .await
            .unwrap();
        assert_eq!(body["id"], "o1");
        assert_eq!(body["status"], "DELIVERED");
    }

    #[tokio::test]
    async fn patch_empty_ok_and_server_message() {
        let base = start_test_server().await;
        let client = RestClient::new(base, Arc::new(NoAuth));

        client.patch_empty("/items/n1/read", &[]).await.unwrap();

        let err = client.patch_empty("/items/missing/read", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.server_message(), Some("Notification not found"));
    }

    #[tokio::test]
    async fn plain_text_error_body_is_the_message() {
        let base = start_test_server().await;
        let client = RestClient::new(base, Arc::new(NoAuth));

        let err = client.get::<Value>("/plain-error", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.server_message(), Some("upstream down"));
    }

    #[tokio::test]
    async fn non_json_success_is_decode_error() {
        let base = start_test_server().await;
        let client = RestClient::new(base, Arc::new(NoAuth));

        let err = client.get::<Value>("/not-json", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.server_message().is_none());
    }
}
