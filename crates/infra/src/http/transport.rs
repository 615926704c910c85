//! GET/POST transport seam
//!
//! The API layer only ever needs "send this JSON, give me JSON back or a
//! status". Keeping that behind a trait lets the executor be tested with
//! scripted transports as well as against a live server.

use async_trait::async_trait;
use relaychat_domain::RelayChatError;
use reqwest::header::HeaderMap;
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::client::HttpClient;

/// Failure of a single HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No response arrived (connect failure, timeout, reset)
    #[error("network failure: {0}")]
    Network(String),

    /// A success response whose body is not valid JSON
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status, when a response arrived
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the server rejected the bearer credential
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

/// Performs authenticated or anonymous JSON requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET and decode the JSON body
    ///
    /// Empty and `204`/`205` bodies decode to `Value::Null`.
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, TransportError>;

    /// Issue a POST with a JSON body and decode the JSON response
    async fn post(
        &self,
        url: &str,
        body: &Value,
        headers: &HeaderMap,
    ) -> Result<Value, TransportError>;
}

/// [`HttpTransport`] over [`HttpClient`]
#[derive(Clone)]
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    async fn exchange(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<Value, TransportError> {
        let mut request = self.client.request(method, url).headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.client.send(request).await.map_err(map_send_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, TransportError> {
        self.exchange(Method::GET, url, None, headers).await
    }

    async fn post(
        &self,
        url: &str,
        body: &Value,
        headers: &HeaderMap,
    ) -> Result<Value, TransportError> {
        self.exchange(Method::POST, url, Some(body), headers).await
    }
}

fn map_send_error(err: RelayChatError) -> TransportError {
    match err {
        RelayChatError::Network(message) => TransportError::Network(message),
        other => TransportError::Network(other.to_string()),
    }
}

async fn decode_response(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransportError::Network(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).into_owned();
        debug!(%status, "Request rejected");
        return Err(TransportError::Status { status: status.as_u16(), body });
    }

    // 204/205 never carry a body
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT || bytes.is_empty()
    {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(HttpClient::new().unwrap())
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn get_forwards_headers_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/find-all"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport()
            .get(&format!("{}/users/find-all", server.uri()), &bearer("t1"))
            .await
            .unwrap();
        assert_eq!(body, json!({"count": 0}));
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let body = transport()
            .post(&format!("{}/auth/refresh", server.uri()), &json!({}), &HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let err = transport().get(&server.uri(), &HeaderMap::new()).await.unwrap_err();
        assert!(err.is_unauthorized());
        match err {
            TransportError::Status { body, .. } => assert!(body.contains("Unauthorized")),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_bodies_decode_to_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let body = transport().post(&server.uri(), &json!({}), &HeaderMap::new()).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = transport().get(&server.uri(), &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
        assert_eq!(err.status(), None);
    }
}
