// Controller client
//
// Typed facade over `RequestExecutor`. Endpoint groups live in sibling
// modules (`topology`, `settings`, `system`) as inherent methods; this file
// only owns construction and the JSON plumbing they share.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::trace;
use url::Url;

use crate::auth::{AuthSession, Credentials};
use crate::error::Error;
use crate::executor::RequestExecutor;
use crate::retry::{RetryObserver, RetryPolicy};
use crate::transport::TransportConfig;

/// Default HTTPS port of the controller API.
pub const DEFAULT_PORT: u16 = 3443;

/// Client for one cnWave controller.
///
/// Every call is a fresh read or write against the controller; nothing is
/// cached between calls except the bearer token held by the session.
pub struct ControllerClient {
    executor: RequestExecutor,
}

impl ControllerClient {
    /// Build a client without logging in.
    ///
    /// The first request will draw a 401 and authenticate on demand; use
    /// [`connect`](Self::connect) to log in up front.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let session = AuthSession::new(http, base_url, credentials);
        Ok(Self::from_executor(RequestExecutor::new(session, retry)))
    }

    /// Build a client and authenticate immediately.
    pub async fn connect(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let client = Self::new(base_url, credentials, transport, retry)?;
        client.authenticate().await?;
        Ok(client)
    }

    pub fn from_executor(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Route retry events to `observer` instead of `tracing`.
    #[must_use]
    pub fn with_observer(self, observer: Arc<dyn RetryObserver>) -> Self {
        Self {
            executor: self.executor.with_observer(observer),
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn base_url(&self) -> &Url {
        self.executor.session().base_url()
    }

    /// Log in again, replacing the current token.
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.executor.session().authenticate().await
    }

    // ── Request helpers ─────────────────────────────────────────────

    /// POST `body` to `path` and return the validated JSON reply.
    pub(crate) async fn post(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.executor.execute(Method::POST, path, Some(body)).await
    }

    /// POST an empty object to a read-style endpoint.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<Value, Error> {
        self.post(path, &json!({})).await
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Value, Error> {
        self.executor.execute(Method::GET, path, None).await
    }
}

/// Deserialize a controller reply into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T, Error> {
    T::deserialize(value).map_err(|e| {
        trace!(path, body = %value, "reply did not match expected shape");
        Error::Deserialization {
            message: format!("{path}: {e}"),
            body: value.to_string(),
        }
    })
}
