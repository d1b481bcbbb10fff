use super::classify::{classify, classify_transport};
use super::credentials::{credential_headers, CredentialMode, ServiceAccount};
use crate::error::ApiError;
use crate::session::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const LOGIN_PATH: &str = "/auth/login";

const SIGNAL_CAPACITY: usize = 16;

/// Authentication-related outcome observed on a response.
///
/// Published for whoever decides UI policy; the client itself never logs
/// the user out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSignal {
    /// `token` is the session token the rejected request was sent under.
    AuthenticationFailed { path: String, token: Option<String> },
    AuthorizationDenied { path: String },
}

impl AuthSignal {
    pub fn path(&self) -> &str {
        match self {
            AuthSignal::AuthenticationFailed { path, .. }
            | AuthSignal::AuthorizationDenied { path } => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub credential_mode: CredentialMode,
    pub service_account: ServiceAccount,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_credential_mode(mut self, mode: CredentialMode) -> Self {
        self.credential_mode = mode;
        self
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            credential_mode: CredentialMode::default(),
            service_account: ServiceAccount::default(),
        }
    }
}

/// The single egress point for REST calls.
///
/// Credentials are computed from the shared `SessionStore` when each request
/// is built, never cached at construction.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential_mode: CredentialMode,
    service_account: ServiceAccount,
    session: Arc<SessionStore>,
    signals: broadcast::Sender<AuthSignal>,
}

impl ApiClient {
    pub fn new(settings: ClientSettings, session: Arc<SessionStore>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);

        Ok(Self {
            http: builder.build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credential_mode: settings.credential_mode,
            service_account: settings.service_account,
            session,
            signals,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.credential_mode
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Receive 401/403 signals from every subsequent response.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthSignal> {
        self.signals.subscribe()
    }

    /// Credential headers a request built right now would carry.
    pub fn credential_headers(&self) -> Result<HeaderMap, ApiError> {
        credential_headers(
            self.credential_mode,
            &self.service_account,
            self.session.current().as_ref(),
        )
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send_json::<()>(Method::GET, path, None, &[]).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send_json(Method::POST, path, Some(body), &[]).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, path, Some(body), &[]).await
    }

    pub async fn patch_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.send_json::<()>(Method::PATCH, path, None, query).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send_json::<()>(Method::DELETE, path, None, &[]).await
    }

    /// POST and decode the response into a typed value.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.post(path, body).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let (mut request, token) = self.request(method.clone(), path)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "sending request");
        let response = request.send().await.map_err(|e| {
            error!(%method, path, error = %e, "no response received");
            classify_transport(&e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| classify_transport(&e))?;

        if !status.is_success() {
            return Err(self.on_error_response(path, token, status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Outgoing interceptor: attach the credentials current at send time.
    ///
    /// Also returns the token of the session the request is made under.
    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(RequestBuilder, Option<String>), ApiError> {
        let session = self.session.current();
        let headers =
            credential_headers(self.credential_mode, &self.service_account, session.as_ref())?;
        let request = self.http.request(method, self.url(path)).headers(headers);
        Ok((request, session.map(|s| s.token)))
    }

    /// Incoming interceptor: classify, log and publish auth failures.
    fn on_error_response(
        &self,
        path: &str,
        token: Option<String>,
        status: StatusCode,
        body: &str,
    ) -> ApiError {
        let err = classify(status, body);

        match &err {
            ApiError::AuthenticationRejected { .. } => {
                warn!(path, "authentication failed");
                let _ = self.signals.send(AuthSignal::AuthenticationFailed {
                    path: path.to_string(),
                    token,
                });
            }
            ApiError::AuthorizationDenied { .. } => {
                warn!(path, "forbidden access");
                let _ = self.signals.send(AuthSignal::AuthorizationDenied {
                    path: path.to_string(),
                });
            }
            ApiError::NotFound { .. } => debug!(path, "resource not found"),
            other => debug!(path, status = status.as_u16(), error = %other, "request failed"),
        }

        err
    }
}
