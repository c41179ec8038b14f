// Bearer-token session
//
// The controller issues an opaque token from `/local/userLogin` and gives
// no expiry hint. Expiry is discovered when a request comes back 401, at
// which point the executor calls `authenticate()` again.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::Error;

const LOGIN_PATH: &str = "/local/userLogin";

/// Username/password pair used for `/local/userLogin`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    /// The token, despite the field name.
    message: Option<String>,
}

/// Holds the controller's bearer token for the lifetime of a client.
///
/// The token is only ever replaced by [`authenticate`](Self::authenticate).
pub struct AuthSession {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    token: RwLock<Option<SecretString>>,
}

impl AuthSession {
    pub fn new(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client, shared with the executor.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The controller base URL (`https://<host>:<port>`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a token has been issued yet.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// The current bearer token, if any.
    pub(crate) async fn bearer(&self) -> Option<SecretString> {
        self.token.read().await.clone()
    }

    /// Log in and store the returned token, replacing any previous one.
    pub async fn authenticate(&self) -> Result<(), Error> {
        let url = self.base_url.join(LOGIN_PATH)?;
        info!(username = %self.credentials.username, "authenticating with controller");

        let body = json!({
            "username": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| match Error::from_transport(&e, "login") {
                Error::ApiRequest { message, .. } => Error::Authentication {
                    message,
                    details: None,
                },
                other => other,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
                details: Some(serde_json::Value::String(body)),
            });
        }

        let text = resp.text().await.map_err(|e| Error::Authentication {
            message: format!("failed to read login response: {e}"),
            details: None,
        })?;
        let login: LoginResponse =
            serde_json::from_str(&text).map_err(|e| Error::Authentication {
                message: format!("unexpected login response: {e}"),
                details: Some(serde_json::Value::String(text.clone())),
            })?;

        if !login.success {
            return Err(Error::Authentication {
                message: "login rejected by controller".into(),
                details: serde_json::from_str(&text).ok(),
            });
        }

        let token = login.message.ok_or_else(|| Error::Authentication {
            message: "login response carried no token".into(),
            details: None,
        })?;

        *self.token.write().await = Some(SecretString::from(token));
        debug!("authentication successful");
        Ok(())
    }
}
