//! HTTP transport shared by every source client

use crate::{Error, Result};
use appstore_core::Config;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("appstore/", env!("CARGO_PKG_VERSION"));

/// Supplies a bearer token for catalog requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` to send the request unauthenticated
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed token
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// JSON-over-HTTP client with timeouts and optional bearer auth
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    token: Option<Arc<dyn TokenProvider>>,
}

impl HttpTransport {
    /// Build a client with the given whole-request and connect timeouts
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token: None,
        })
    }

    /// Build a client from the configured timeouts
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.request_timeout(), config.connect_timeout())
    }

    /// Attach a bearer-token provider
    #[must_use]
    pub fn with_token_provider(mut self, token: Arc<dyn TokenProvider>) -> Self {
        self.token = Some(token);
        self
    }

    /// `GET url?params` decoded as JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        tracing::debug!(%url, ?params, "GET");
        let request = self.client.get(url).query(params);
        self.send(url, request).await
    }

    /// `POST url` with a JSON body, decoded as JSON
    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(%url, "POST");
        let request = self.client.post(url).json(body);
        self.send(url, request).await
    }

    /// `POST url` with extra headers and no bearer token
    pub async fn post_json_with_headers<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        tracing::debug!(%url, "POST");
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Self::decode(url, request).await
    }

    async fn send<T: DeserializeOwned>(&self, url: &str, mut request: RequestBuilder) -> Result<T> {
        if let Some(provider) = &self.token {
            if let Some(token) = provider.bearer_token().await {
                request = request.bearer_auth(token);
            }
        }
        Self::decode(url, request).await
    }

    async fn decode<T: DeserializeOwned>(url: &str, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(url, status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::decode(url, e.to_string()))
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn get_sends_query_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("platform", "android"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let http = transport().with_token_provider(Arc::new(StaticToken("secret".into())));
        let pong: Pong = http
            .get_json(
                &format!("{}/ping", server.uri()),
                &[("platform".into(), "android".into())],
            )
            .await
            .unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn non_success_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = transport()
            .get_json::<Pong>(&format!("{}/missing", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn bad_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = transport()
            .get_json::<Pong>(&format!("{}/html", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_is_transport_error() {
        let err = transport()
            .get_json::<Pong>("http://127.0.0.1:9/nothing", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
