//! HTTP gateway to the station backend.
//!
//! Every backend call goes through [`GatewayClient`]. It attaches the stored
//! bearer token and maps non-2xx responses to [`ApiError::Rejected`]. It is
//! also the only place that reacts to an expired session: a 401 on a call
//! that carried a token clears the [`SessionStore`] and broadcasts
//! [`SessionEvent::Invalidated`].

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

/// Capacity of the session event channel
const EVENT_CAPACITY: usize = 16;

/// Session lifecycle notifications published by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the stored token; the session has been cleared
    Invalidated,
}

/// Client for the station REST API
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    http: Client,
    session: SessionStore,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a gateway for `config.base_url` backed by `session`.
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Receive session events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ==================== Verbs ====================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, |req| req).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, |req| req.query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, |req| req.json(body)).await
    }

    pub async fn patch_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::PATCH, path, |req| req.query(query)).await
    }

    // ==================== Internals ====================

    async fn send<T, F>(&self, method: Method, path: &str, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let token = self.session.token();

        let mut request = self.http.request(method.clone(), &url);
        if let Some(ref token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = build(request);

        tracing::debug!(%method, path, authenticated = token.is_some(), "Sending request");
        let response = request.send().await?;
        self.handle_response(response, token.is_some()).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && authenticated {
            self.invalidate_session();
            return Err(ApiError::Unauthenticated);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            };
            tracing::debug!(status = status.as_u16(), "Request rejected");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn invalidate_session(&self) {
        tracing::warn!("Stored session rejected by the server, signing out");
        if let Err(e) = self.session.clear() {
            tracing::warn!("Failed to clear rejected session: {}", e);
        }
        // No receivers just means no router is listening
        let _ = self.events.send(SessionEvent::Invalidated);
    }
}
