// Request executor
//
// Every controller call goes through `execute`: bearer token, one-shot
// re-authentication on 401, response validation, and the retry policy
// wrapped around all of it. Nothing else in the crate touches the wire
// for API calls.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::AuthSession;
use crate::error::Error;
use crate::retry::{RetryObserver, RetryPolicy, TracingObserver};

const BODY_PREVIEW: usize = 200;

/// Issues one logical controller call with resilience applied.
pub struct RequestExecutor {
    session: AuthSession,
    retry: RetryPolicy,
    observer: Arc<dyn RetryObserver>,
}

impl RequestExecutor {
    pub fn new(session: AuthSession, retry: RetryPolicy) -> Self {
        Self {
            session,
            retry,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default `tracing` retry observer.
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Execute `method path` with an optional JSON body.
    ///
    /// Empty bodies come back as `{}`. The error from the last attempt is
    /// returned unchanged once the retry budget is spent.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.session.base_url().join(path)?;
        let (method, url) = (&method, &url);
        self.retry
            .run(path, self.observer.as_ref(), move || {
                self.execute_once(method, url, path, body)
            })
            .await
    }

    async fn execute_once(
        &self,
        method: &Method,
        url: &Url,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let mut resp = self.send(method, url, path, body).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!(path, "token rejected, re-authenticating");
            self.session.authenticate().await?;
            resp = self.send(method, url, path, body).await?;
        }

        parse_response(path, resp).await
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        debug!("{method} {url}");

        let mut builder = self.session.http().request(method.clone(), url.clone());
        if let Some(token) = self.session.bearer().await {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder
            .send()
            .await
            .map_err(|e| Error::from_transport(&e, path))
    }
}

/// Validate status, body, and the application-level `success` flag.
async fn parse_response(path: &str, resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| Error::from_transport(&e, path))?;

    if !status.is_success() {
        let preview = &text[..floor_char_boundary(&text, BODY_PREVIEW)];
        return Err(Error::ApiRequest {
            message: format!("{path} returned HTTP {status}: {preview}"),
            status: Some(status.as_u16()),
            details: serde_json::from_str(&text).ok(),
        });
    }

    if text.trim().is_empty() {
        warn!(path, "empty response from controller");
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let data: Value = serde_json::from_str(&text).map_err(|e| {
        trace!(path, body = %text, "non-JSON response");
        Error::ApiRequest {
            message: format!("{path}: controller returned non-JSON response ({e})"),
            status: Some(status.as_u16()),
            details: Some(Value::String(text.clone())),
        }
    })?;

    if data.get("success") == Some(&Value::Bool(false)) {
        return Err(Error::ApiRequest {
            message: format!("{path}: controller reported failure"),
            status: Some(status.as_u16()),
            details: Some(data),
        });
    }

    Ok(data)
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
